//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: In-memory registers and pin recorders for desktop development
//! - `devmem`: `/dev/mem` page mapping for the board (unix only)
//! - `embedded`: `embedded-hal` digital pin adapter (requires `embedded-hal` feature)

pub mod mock;

#[cfg(unix)]
pub mod devmem;

#[cfg(feature = "embedded-hal")]
pub mod embedded;

pub use mock::*;

#[cfg(unix)]
pub use devmem::*;

#[cfg(feature = "embedded-hal")]
pub use embedded::*;
