//! # m1-car
//!
//! GPIO register access for the NanoPi M1 (Allwinner H3) and a small
//! web-controlled two-wheel-drive car built on top of it.
//!
//! ## Features
//!
//! - **Register-level GPIO**: pin mode, pull resistor and data bit access
//!   through a `/dev/mem` mapping of the PIO bank
//! - **Header pin numbering**: physical header pins resolved to port/shift
//! - **Lifecycle safety**: calls before setup, after cleanup, or on unwired
//!   pins return errors instead of touching memory
//! - **Car control**: named actions mapped to four motor driver inputs
//! - **HTTP API** (`web` feature): `/action?<name>` plus the static web UI
//!
//! ## Architecture
//!
//! - `traits` - Register bank, memory mapper and pin driver abstractions
//! - `gpio` - Pin topology, port register layout, port accessor, facade
//! - `hal` - Concrete implementations (`/dev/mem`, mocks for testing)
//! - `car` - Action table and car controller
//! - `services` - HTTP layer (feature-gated)
//!
//! ## Threading
//!
//! [`Gpio`] serialises every register read-modify-write behind an internal
//! mutex, so a facade can be shared between request handlers. Other
//! processes mapping the same registers are not coordinated with.
//!
//! ## Example
//!
//! ```rust
//! use m1_car::{Gpio, Level, PinMode, Pull};
//! use m1_car::hal::MockMapper;
//!
//! // On the board: Gpio::m1()
//! let gpio = Gpio::new(MockMapper::new());
//! gpio.setup().unwrap();
//!
//! gpio.configure(11, PinMode::Output).unwrap();
//! gpio.set_pull(11, Pull::Down).unwrap();
//! gpio.write(11, Level::High).unwrap();
//! assert_eq!(gpio.read(11).unwrap(), Level::High);
//!
//! // Unwired pins are reported, not ignored
//! assert!(gpio.write(1, Level::High).is_err());
//!
//! gpio.cleanup().unwrap();
//! ```

#![warn(missing_docs)]

/// Car controller: action table and request dispatch.
pub mod car;
/// Shared configuration for the server and demos.
pub mod config;
/// Error type for GPIO operations.
pub mod error;
/// Register-level GPIO: topology, layout, port accessor and facade.
pub mod gpio;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Core traits for register access and pin control.
pub mod traits;

/// HTTP services (feature-gated).
#[cfg(feature = "web")]
pub mod services;

// Re-exports for convenience
pub use car::{Action, Car, CarRequest, LEFT_IN1, LEFT_IN2, RIGHT_IN1, RIGHT_IN2};
pub use error::{GpioError, GpioResult};
pub use gpio::{resolve, Gpio, PinLocation, Port, M1_GPIO_BASE};
pub use traits::{Level, MemoryMapper, PinDriver, PinMode, Pull, RegisterBank};

// Config re-exports
pub use config::{CarConfig, Config, GpioConfig, WebConfig};
