//! Hardware abstraction traits for register access and pin control.
//!
//! This module defines the interfaces that let the GPIO facade run against
//! real memory-mapped registers on the board or against in-memory mocks on
//! a desktop.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`RegisterBank`] | 32-bit word access into a mapped register page |
//! | [`MemoryMapper`] | Creates and releases a [`RegisterBank`] |
//! | [`PinDriver`] | Pin-indexed configure/pull/write/read surface |
//!
//! # Example
//!
//! ```rust
//! use m1_car::traits::{Level, PinDriver, PinMode, Pull};
//! use m1_car::hal::MockPins;
//!
//! let mut pins = MockPins::new();
//! pins.setup().unwrap();
//! pins.configure_output(11, Pull::Down).unwrap();
//! pins.write(11, Level::High).unwrap();
//!
//! assert_eq!(pins.mode(11), Some(PinMode::Output));
//! assert_eq!(pins.read(11).unwrap(), Level::High);
//! ```

/// Direction of a pin, stored as a 4-bit field in a configuration word.
///
/// # Default
///
/// Defaults to [`Input`](Self::Input), the reset state of the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PinMode {
    /// High-impedance input.
    #[default]
    Input,
    /// Push-pull output.
    Output,
}

impl PinMode {
    /// Returns the 4-bit register encoding.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            PinMode::Input => 0b0000,
            PinMode::Output => 0b0001,
        }
    }

    /// Returns the mode as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PinMode::Input => "input",
            PinMode::Output => "output",
        }
    }

    /// Parse a mode from text (`"input"`/`"in"`, `"output"`/`"out"`).
    ///
    /// ```
    /// use m1_car::traits::PinMode;
    ///
    /// assert_eq!(PinMode::from_text(" OUT "), Some(PinMode::Output));
    /// assert_eq!(PinMode::from_text("in"), Some(PinMode::Input));
    /// assert_eq!(PinMode::from_text("pwm"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" => Some(PinMode::Input),
            "output" | "out" => Some(PinMode::Output),
            _ => None,
        }
    }
}

/// Internal pull resistor selection, stored as a 2-bit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Pull {
    /// No pull resistor.
    #[default]
    Off,
    /// Pull towards the supply rail.
    Up,
    /// Pull towards ground.
    Down,
}

impl Pull {
    /// Returns the 2-bit register encoding.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Pull::Off => 0b00,
            Pull::Up => 0b01,
            Pull::Down => 0b10,
        }
    }

    /// Returns the pull state as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Pull::Off => "off",
            Pull::Up => "up",
            Pull::Down => "down",
        }
    }

    /// Parse a pull state from text.
    ///
    /// Accepts `"off"`/`"none"`, `"up"`/`"pullup"` and `"down"`/`"pulldown"`,
    /// trimmed and case-insensitive.
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Some(Pull::Off),
            "up" | "pullup" => Some(Pull::Up),
            "down" | "pulldown" => Some(Pull::Down),
            _ => None,
        }
    }
}

/// Logical level of a pin, one bit in the data word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Logic 0.
    #[default]
    Low,
    /// Logic 1.
    High,
}

impl Level {
    /// Returns the level as `0` or `1`.
    #[inline]
    pub const fn bit(&self) -> u32 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    /// Returns the level as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::High => "high",
        }
    }

    /// Parse a level from text (`"high"`/`"1"`/`"on"`, `"low"`/`"0"`/`"off"`).
    ///
    /// ```
    /// use m1_car::traits::Level;
    ///
    /// assert_eq!(Level::from_text("1"), Some(Level::High));
    /// assert_eq!(Level::from_text("Low"), Some(Level::Low));
    /// assert_eq!(Level::from_text("2"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "1" | "on" => Some(Level::High),
            "low" | "0" | "off" => Some(Level::Low),
            _ => None,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

/// Word-addressed view of a mapped register page.
///
/// Offsets are byte offsets from the start of the mapping. Implementations
/// must reject offsets that are misaligned or would read past the end of the
/// mapping rather than touching memory.
pub trait RegisterBank {
    /// Error type for register access.
    type Error;

    /// Length of the mapping in bytes.
    fn len(&self) -> usize;

    /// Returns true if nothing is mapped.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-page offset of the GPIO bank (physical base minus page base).
    fn bank_offset(&self) -> usize;

    /// Read the 32-bit word at `offset`.
    fn read_word(&self, offset: usize) -> Result<u32, Self::Error>;

    /// Write the 32-bit word at `offset`.
    fn write_word(&mut self, offset: usize, value: u32) -> Result<(), Self::Error>;
}

/// Creates and releases the register mapping.
///
/// `unmap` consumes the region, so a mapping can only be released once.
pub trait MemoryMapper {
    /// The mapped region handed to the port accessor.
    type Region: RegisterBank;
    /// Error type for map/unmap.
    type Error;

    /// Map the page containing the GPIO bank.
    fn map(&self) -> Result<Self::Region, Self::Error>;

    /// Release a region obtained from [`map`](Self::map).
    fn unmap(&self, region: Self::Region) -> Result<(), Self::Error>;
}

/// Pin-indexed GPIO control.
///
/// This is the surface the car controller drives. Pins use the header
/// numbering, not the SoC's native numbering.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use m1_car::traits::{Level, PinDriver, PinMode, Pull};
///
/// struct LedBoard { /* handles */ }
///
/// impl PinDriver for LedBoard {
///     type Error = ();
///
///     fn setup(&mut self) -> Result<(), ()> { Ok(()) }
///     fn cleanup(&mut self) -> Result<(), ()> { Ok(()) }
///     fn configure(&mut self, pin: i32, mode: PinMode) -> Result<(), ()> { Ok(()) }
///     fn set_pull(&mut self, pin: i32, pull: Pull) -> Result<(), ()> { Ok(()) }
///     fn write(&mut self, pin: i32, level: Level) -> Result<(), ()> { Ok(()) }
///     fn read(&mut self, pin: i32) -> Result<Level, ()> { Ok(Level::Low) }
/// }
/// ```
pub trait PinDriver {
    /// Error type for pin operations.
    type Error;

    /// Acquire the hardware. Must succeed before any other call.
    fn setup(&mut self) -> Result<(), Self::Error>;

    /// Release the hardware. Calls after this fail until the next `setup`.
    fn cleanup(&mut self) -> Result<(), Self::Error>;

    /// Set the pin direction.
    fn configure(&mut self, pin: i32, mode: PinMode) -> Result<(), Self::Error>;

    /// Select the pin's pull resistor.
    fn set_pull(&mut self, pin: i32, pull: Pull) -> Result<(), Self::Error>;

    /// Drive an output level.
    fn write(&mut self, pin: i32, level: Level) -> Result<(), Self::Error>;

    /// Read the pin's current level from the data register.
    fn read(&mut self, pin: i32) -> Result<Level, Self::Error>;

    /// Convenience method to make a pin an output with the given pull.
    fn configure_output(&mut self, pin: i32, pull: Pull) -> Result<(), Self::Error> {
        self.configure(pin, PinMode::Output)?;
        self.set_pull(pin, pull)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_input() {
        assert_eq!(PinMode::default(), PinMode::Input);
    }

    #[test]
    fn mode_encoding() {
        assert_eq!(PinMode::Input.bits(), 0);
        assert_eq!(PinMode::Output.bits(), 1);
    }

    #[test]
    fn pull_encoding() {
        assert_eq!(Pull::Off.bits(), 0);
        assert_eq!(Pull::Up.bits(), 1);
        assert_eq!(Pull::Down.bits(), 2);
    }

    #[test]
    fn pull_from_text() {
        assert_eq!(Pull::from_text("UP"), Some(Pull::Up));
        assert_eq!(Pull::from_text(" pulldown "), Some(Pull::Down));
        assert_eq!(Pull::from_text("none"), Some(Pull::Off));
        assert_eq!(Pull::from_text("sideways"), None);
    }

    #[test]
    fn level_bool_conversions() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(bool::from(Level::High));
        assert!(!bool::from(Level::Low));
    }

    #[test]
    fn level_bits() {
        assert_eq!(Level::Low.bit(), 0);
        assert_eq!(Level::High.bit(), 1);
    }

    #[test]
    fn as_str_round_trips_through_from_text() {
        for mode in [PinMode::Input, PinMode::Output] {
            assert_eq!(PinMode::from_text(mode.as_str()), Some(mode));
        }
        for pull in [Pull::Off, Pull::Up, Pull::Down] {
            assert_eq!(Pull::from_text(pull.as_str()), Some(pull));
        }
        for level in [Level::Low, Level::High] {
            assert_eq!(Level::from_text(level.as_str()), Some(level));
        }
    }

    // =========================================================================
    // PinDriver default methods
    // =========================================================================

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl PinDriver for Recorder {
        type Error = ();

        fn setup(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn cleanup(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn configure(&mut self, _pin: i32, mode: PinMode) -> Result<(), ()> {
            self.calls.push(mode.as_str());
            Ok(())
        }

        fn set_pull(&mut self, _pin: i32, pull: Pull) -> Result<(), ()> {
            self.calls.push(pull.as_str());
            Ok(())
        }

        fn write(&mut self, _pin: i32, _level: Level) -> Result<(), ()> {
            Ok(())
        }

        fn read(&mut self, _pin: i32) -> Result<Level, ()> {
            Ok(Level::Low)
        }
    }

    #[test]
    fn configure_output_sets_mode_then_pull() {
        let mut driver = Recorder::default();
        driver.configure_output(11, Pull::Down).unwrap();
        assert_eq!(driver.calls, vec!["output", "down"]);
    }
}
