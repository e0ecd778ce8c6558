//! Error type shared by the register layer, the facade and the mappers.

use std::io;

use thiserror::Error;

/// Errors reported by GPIO operations.
///
/// Register access never panics: an unmapped pin, a missing mapping or an
/// out-of-range offset all surface here instead of touching memory.
#[derive(Debug, Error)]
pub enum GpioError {
    /// The logical pin has no port/shift entry in the topology table.
    #[error("pin {0} is not wired to a GPIO port")]
    UnmappedPin(i32),

    /// A register operation was attempted before `setup()` or after `cleanup()`.
    #[error("GPIO registers are not mapped (call setup first)")]
    NotInitialized,

    /// `setup()` was called while a mapping is already live.
    #[error("GPIO registers are already mapped")]
    AlreadyInitialized,

    /// The physical memory device could not be opened.
    #[error("failed to open {path}")]
    Open {
        /// Device path that was opened.
        path: String,
        /// Underlying OS error (usually permission denied).
        #[source]
        source: io::Error,
    },

    /// The mapping call failed.
    #[error("failed to map GPIO registers at {address:#010x}")]
    Map {
        /// Physical base address of the GPIO bank.
        address: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Unmapping the page or closing the device failed.
    #[error("failed to release the GPIO mapping")]
    Unmap(#[source] io::Error),

    /// A register word offset fell outside the mapped region or was misaligned.
    #[error("register offset {offset:#x} is outside the {len:#x}-byte mapping")]
    OutOfBounds {
        /// Byte offset into the mapping.
        offset: usize,
        /// Length of the mapping in bytes.
        len: usize,
    },

    /// The GPIO bank does not fit in the single page that gets mapped.
    #[error("GPIO bank at page offset {offset:#x} does not fit in a {page_size}-byte page")]
    BankOutsidePage {
        /// In-page offset of the bank.
        offset: usize,
        /// Platform page size.
        page_size: usize,
    },
}

/// Result alias for GPIO operations.
pub type GpioResult<T> = Result<T, GpioError>;
