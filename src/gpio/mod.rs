//! Register-level GPIO support for the Allwinner H3 on the NanoPi M1.
//!
//! - `topology`: header pin → (port, shift) lookup
//! - `layout`: byte layout of a port control block
//! - `port`: masked read-modify-write on one port's registers
//! - `facade`: [`Gpio`], the pin-indexed API with setup/cleanup lifecycle

pub mod facade;
pub mod layout;
pub mod port;
pub mod topology;

pub use facade::Gpio;
pub use layout::M1_GPIO_BASE;
pub use port::Port;
pub use topology::{mapped_pins, resolve, PinLocation};
