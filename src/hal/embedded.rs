//! `embedded-hal` 1.0 digital pin adapter.
//!
//! Wraps one header pin of a [`Gpio`] facade so drivers written against
//! `embedded_hal::digital` can use it directly.
//!
//! ```rust
//! use embedded_hal::digital::{OutputPin, StatefulOutputPin};
//! use m1_car::gpio::Gpio;
//! use m1_car::hal::MockMapper;
//!
//! let gpio = Gpio::new(MockMapper::new());
//! gpio.setup().unwrap();
//!
//! let mut led = gpio.output_pin(12).unwrap();
//! led.set_high().unwrap();
//! assert!(led.is_set_high().unwrap());
//! ```

use embedded_hal::digital::{Error, ErrorKind, ErrorType, InputPin, OutputPin, StatefulOutputPin};

use crate::error::{GpioError, GpioResult};
use crate::gpio::{Gpio, PinLocation};
use crate::traits::{Level, MemoryMapper, PinMode, RegisterBank};

impl Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A single header pin borrowed from a facade.
pub struct GpioPin<'a, M: MemoryMapper> {
    gpio: &'a Gpio<M>,
    pin: i32,
    location: PinLocation,
}

impl<M> Gpio<M>
where
    M: MemoryMapper<Error = GpioError>,
    M::Region: RegisterBank<Error = GpioError>,
{
    /// Borrow `pin` without changing its configuration.
    pub fn pin(&self, pin: i32) -> GpioResult<GpioPin<'_, M>> {
        let location = Self::locate(pin)?;
        Ok(GpioPin {
            gpio: self,
            pin,
            location,
        })
    }

    /// Borrow `pin` and configure it as an output.
    pub fn output_pin(&self, pin: i32) -> GpioResult<GpioPin<'_, M>> {
        let handle = self.pin(pin)?;
        self.configure(pin, PinMode::Output)?;
        Ok(handle)
    }

    /// Borrow `pin` and configure it as an input.
    pub fn input_pin(&self, pin: i32) -> GpioResult<GpioPin<'_, M>> {
        let handle = self.pin(pin)?;
        self.configure(pin, PinMode::Input)?;
        Ok(handle)
    }
}

impl<M: MemoryMapper> GpioPin<'_, M> {
    /// Header pin number.
    pub fn number(&self) -> i32 {
        self.pin
    }

    /// Port and shift of this pin.
    pub fn location(&self) -> PinLocation {
        self.location
    }
}

impl<M: MemoryMapper> ErrorType for GpioPin<'_, M> {
    type Error = GpioError;
}

impl<M> OutputPin for GpioPin<'_, M>
where
    M: MemoryMapper<Error = GpioError>,
    M::Region: RegisterBank<Error = GpioError>,
{
    fn set_low(&mut self) -> GpioResult<()> {
        self.gpio.write(self.pin, Level::Low)
    }

    fn set_high(&mut self) -> GpioResult<()> {
        self.gpio.write(self.pin, Level::High)
    }
}

impl<M> StatefulOutputPin for GpioPin<'_, M>
where
    M: MemoryMapper<Error = GpioError>,
    M::Region: RegisterBank<Error = GpioError>,
{
    fn is_set_high(&mut self) -> GpioResult<bool> {
        Ok(self.gpio.read(self.pin)? == Level::High)
    }

    fn is_set_low(&mut self) -> GpioResult<bool> {
        Ok(self.gpio.read(self.pin)? == Level::Low)
    }
}

impl<M> InputPin for GpioPin<'_, M>
where
    M: MemoryMapper<Error = GpioError>,
    M::Region: RegisterBank<Error = GpioError>,
{
    fn is_high(&mut self) -> GpioResult<bool> {
        Ok(self.gpio.read(self.pin)? == Level::High)
    }

    fn is_low(&mut self) -> GpioResult<bool> {
        Ok(self.gpio.read(self.pin)? == Level::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockMapper;

    fn mapped() -> Gpio<MockMapper> {
        let gpio = Gpio::new(MockMapper::new());
        gpio.setup().unwrap();
        gpio
    }

    #[test]
    fn unmapped_pin_is_rejected_up_front() {
        let gpio = mapped();
        assert!(matches!(gpio.pin(4), Err(GpioError::UnmappedPin(4))));
    }

    #[test]
    fn output_pin_configures_and_toggles() {
        let gpio = mapped();
        let mut pin = gpio.output_pin(16).unwrap();
        assert_eq!(pin.location(), PinLocation { port: 6, shift: 8 });

        pin.set_high().unwrap();
        assert!(pin.is_set_high().unwrap());
        pin.toggle().unwrap();
        assert!(pin.is_set_low().unwrap());
        assert_eq!(gpio.mode(16).unwrap(), Some(PinMode::Output));
    }

    #[test]
    fn input_pin_reads_data_register() {
        let gpio = mapped();
        gpio.mapper().registers().set_port_word(0, 0x10, 1 << 6);
        let mut pin = gpio.input_pin(12).unwrap(); // PA6
        assert!(pin.is_high().unwrap());
    }

    #[test]
    fn pin_after_cleanup_reports_not_initialized() {
        let gpio = mapped();
        let mut pin = gpio.pin(11).unwrap();
        gpio.cleanup().unwrap();
        assert!(matches!(pin.set_high(), Err(GpioError::NotInitialized)));
    }
}
