//! Trait definitions for hardware abstraction.
//!
//! This module defines the core abstractions that allow m1-car to:
//! - Run on the NanoPi M1 through `/dev/mem`
//! - Run on a desktop against in-memory registers
//! - Drive the car from anything that implements [`PinDriver`]
//!
//! # Submodules
//!
//! - `hardware`: Register access, memory mapping, pin control and the
//!   pin mode/pull/level value types

pub mod hardware;

pub use hardware::*;
