//! Pin-indexed GPIO facade over a memory mapper.
//!
//! [`Gpio`] owns the mapper and, while set up, the mapped region. Every
//! operation takes the internal lock, resolves the pin through the topology
//! table and delegates to a [`Port`] borrowed from the live region, so
//! concurrent callers never interleave a read-modify-write.
//!
//! # Lifecycle
//!
//! ```text
//! new() --setup()--> mapped --cleanup()--> unmapped --setup()--> ...
//! ```
//!
//! Register calls while unmapped return [`GpioError::NotInitialized`];
//! a second `cleanup()` returns the same error instead of unmapping twice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::port::Port;
use super::topology::{self, PinLocation};
use crate::error::{GpioError, GpioResult};
use crate::traits::{Level, MemoryMapper, PinDriver, PinMode, Pull, RegisterBank};

/// GPIO facade. Safe to share between threads when the region is `Send`.
pub struct Gpio<M: MemoryMapper> {
    mapper: M,
    region: Mutex<Option<M::Region>>,
}

impl<M> Gpio<M>
where
    M: MemoryMapper<Error = GpioError>,
    M::Region: RegisterBank<Error = GpioError>,
{
    /// Create an unmapped facade. Call [`setup`](Self::setup) before use.
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            region: Mutex::new(None),
        }
    }

    /// The mapper this facade was built with.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    fn lock(&self) -> MutexGuard<'_, Option<M::Region>> {
        // Register contents stay valid if a holder panicked.
        self.region.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Map the register page.
    ///
    /// # Errors
    ///
    /// [`GpioError::AlreadyInitialized`] if a mapping is live, otherwise
    /// whatever the mapper reports. Failures are not retried.
    pub fn setup(&self) -> GpioResult<()> {
        let mut region = self.lock();
        if region.is_some() {
            return Err(GpioError::AlreadyInitialized);
        }
        *region = Some(self.mapper.map()?);
        log::debug!("GPIO registers mapped");
        Ok(())
    }

    /// Unmap the register page.
    ///
    /// The region is taken out of the facade before it is released, so even
    /// when releasing fails the facade ends up unmapped.
    pub fn cleanup(&self) -> GpioResult<()> {
        let region = self.lock().take().ok_or(GpioError::NotInitialized)?;
        self.mapper.unmap(region)?;
        log::debug!("GPIO registers unmapped");
        Ok(())
    }

    /// Returns true between a successful `setup` and the next `cleanup`.
    pub fn is_mapped(&self) -> bool {
        self.lock().is_some()
    }

    /// Resolve `pin`, or report it as unmapped.
    pub fn locate(pin: i32) -> GpioResult<PinLocation> {
        topology::resolve(pin).ok_or(GpioError::UnmappedPin(pin))
    }

    fn with_port<R>(
        &self,
        pin: i32,
        f: impl FnOnce(&mut Port<'_, M::Region>, u8) -> GpioResult<R>,
    ) -> GpioResult<R> {
        let mut guard = self.lock();
        let region = guard.as_mut().ok_or(GpioError::NotInitialized)?;
        let loc = Self::locate(pin)?;
        f(&mut Port::new(region, loc.port), loc.shift)
    }

    /// Set the pin's direction.
    pub fn configure(&self, pin: i32, mode: PinMode) -> GpioResult<()> {
        self.with_port(pin, |port, shift| port.set_mode(shift, mode))
    }

    /// Select the pin's pull resistor.
    pub fn set_pull(&self, pin: i32, pull: Pull) -> GpioResult<()> {
        self.with_port(pin, |port, shift| port.set_pull(shift, pull))
    }

    /// Drive the pin's data bit.
    pub fn write(&self, pin: i32, level: Level) -> GpioResult<()> {
        self.with_port(pin, |port, shift| port.write(shift, level))
    }

    /// Read the pin's data bit.
    pub fn read(&self, pin: i32) -> GpioResult<Level> {
        self.with_port(pin, |port, shift| port.read(shift))
    }

    /// Read the pin's configured mode. Encodings other than input/output
    /// (alternate functions) are returned as `None`.
    pub fn mode(&self, pin: i32) -> GpioResult<Option<PinMode>> {
        self.with_port(pin, |port, shift| {
            Ok(match port.mode_bits(shift)? {
                0 => Some(PinMode::Input),
                1 => Some(PinMode::Output),
                _ => None,
            })
        })
    }
}

#[cfg(unix)]
impl Gpio<crate::hal::DevMemMapper> {
    /// Facade for the NanoPi M1 through `/dev/mem`.
    pub fn m1() -> Self {
        Self::new(crate::hal::DevMemMapper::default())
    }
}

impl<M> PinDriver for Gpio<M>
where
    M: MemoryMapper<Error = GpioError>,
    M::Region: RegisterBank<Error = GpioError>,
{
    type Error = GpioError;

    fn setup(&mut self) -> GpioResult<()> {
        Gpio::setup(self)
    }

    fn cleanup(&mut self) -> GpioResult<()> {
        Gpio::cleanup(self)
    }

    fn configure(&mut self, pin: i32, mode: PinMode) -> GpioResult<()> {
        Gpio::configure(self, pin, mode)
    }

    fn set_pull(&mut self, pin: i32, pull: Pull) -> GpioResult<()> {
        Gpio::set_pull(self, pin, pull)
    }

    fn write(&mut self, pin: i32, level: Level) -> GpioResult<()> {
        Gpio::write(self, pin, level)
    }

    fn read(&mut self, pin: i32) -> GpioResult<Level> {
        Gpio::read(self, pin)
    }
}
