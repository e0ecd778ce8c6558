//! Two-wheel-drive car driven through four motor driver inputs.
//!
//! Each wheel is driven by a pair of H-bridge inputs. An [`Action`] is just
//! the four levels to put on those inputs, written in order:
//!
//! | Action | LeftIn1 | LeftIn2 | RightIn1 | RightIn2 |
//! |--------|---------|---------|----------|----------|
//! | forward  | 1 | 0 | 1 | 0 |
//! | backward | 0 | 1 | 0 | 1 |
//! | left     | 0 | 0 | 1 | 0 |
//! | right    | 1 | 0 | 0 | 0 |
//! | stop     | 0 | 0 | 0 | 0 |
//!
//! # Example
//!
//! ```rust
//! use m1_car::car::{Action, Car};
//! use m1_car::hal::MockPins;
//! use m1_car::traits::Level;
//!
//! let mut car = Car::new(MockPins::new()).with_step_delay_ms(0);
//! car.on().unwrap();
//! car.do_action(Action::Forward).unwrap();
//!
//! assert_eq!(car.driver().level(11), Level::High);
//! assert_eq!(car.driver().level(13), Level::Low);
//! ```

use core::fmt;
use std::time::Duration;

use crate::config::CarConfig;
use crate::traits::{Level, PinDriver, Pull};

/// Left motor, input 1.
pub const LEFT_IN1: i32 = 11;
/// Left motor, input 2.
pub const LEFT_IN2: i32 = 13;
/// Right motor, input 1.
pub const RIGHT_IN1: i32 = 15;
/// Right motor, input 2.
pub const RIGHT_IN2: i32 = 16;

/// A named driving action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    /// Both wheels forward.
    Forward,
    /// Both wheels backward.
    Backward,
    /// Right wheel forward only.
    Left,
    /// Left wheel forward only.
    Right,
    /// All inputs low.
    #[default]
    Stop,
}

impl Action {
    /// Every action, in table order.
    pub const ALL: [Action; 5] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Stop,
    ];

    /// Returns the action name used on the HTTP API.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Backward => "backward",
            Action::Left => "left",
            Action::Right => "right",
            Action::Stop => "stop",
        }
    }

    /// Parse an action name. Input is trimmed and case-insensitive.
    ///
    /// ```
    /// use m1_car::car::Action;
    ///
    /// assert_eq!(Action::from_text("forward"), Some(Action::Forward));
    /// assert_eq!(Action::from_text(" STOP "), Some(Action::Stop));
    /// assert_eq!(Action::from_text("jump"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Some(Action::Forward),
            "backward" => Some(Action::Backward),
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "stop" => Some(Action::Stop),
            _ => None,
        }
    }

    /// Levels for LeftIn1, LeftIn2, RightIn1, RightIn2.
    pub const fn signals(&self) -> [Level; 4] {
        use crate::traits::Level::{High as H, Low as L};
        match self {
            Action::Forward => [H, L, H, L],
            Action::Backward => [L, H, L, H],
            Action::Left => [L, L, H, L],
            Action::Right => [H, L, L, L],
            Action::Stop => [L, L, L, L],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request accepted by [`Car::dispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarRequest {
    /// Map the registers and configure the motor pins.
    On,
    /// Stop, then release the registers.
    Off,
    /// Stop, then perform the action (or just stop).
    Drive(Action),
}

impl CarRequest {
    /// Parse a request name (`on`, `off`, or an action name).
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Some(CarRequest::On),
            "off" => Some(CarRequest::Off),
            other => Action::from_text(other).map(CarRequest::Drive),
        }
    }
}

/// Car controller over any [`PinDriver`].
pub struct Car<D: PinDriver> {
    driver: D,
    pins: [i32; 4],
    step_delay: Duration,
    powered: bool,
}

impl<D: PinDriver> Car<D> {
    /// Car on the default header pins with a 10 ms step delay.
    pub fn new(driver: D) -> Self {
        Self::from_config(driver, &CarConfig::default())
    }

    /// Car using the pins and timing from `config`.
    pub fn from_config(driver: D, config: &CarConfig) -> Self {
        Self {
            driver,
            pins: config.pins,
            step_delay: Duration::from_millis(u64::from(config.step_delay_ms)),
            powered: false,
        }
    }

    /// Override the motor input pins.
    pub fn with_pins(mut self, pins: [i32; 4]) -> Self {
        self.pins = pins;
        self
    }

    /// Override the pause after each pin write.
    pub fn with_step_delay_ms(mut self, ms: u32) -> Self {
        self.step_delay = Duration::from_millis(u64::from(ms));
        self
    }

    /// Motor input pins in signal order.
    pub fn pins(&self) -> [i32; 4] {
        self.pins
    }

    /// Returns true after a successful `on()` until `off()`.
    pub fn is_on(&self) -> bool {
        self.powered
    }

    /// The underlying pin driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the underlying pin driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Consume the car, returning the driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Acquire the GPIO and make every motor pin a pulled-down output.
    ///
    /// Calling `on()` again while powered only reconfigures the pins. If the
    /// first power-on cannot configure every pin, the GPIO is released again
    /// and the car stays off.
    pub fn on(&mut self) -> Result<(), D::Error>
    where
        D::Error: fmt::Display,
    {
        let first_power = !self.powered;
        if first_power {
            self.driver.setup()?;
            self.powered = true;
        }
        log::info!("car on");
        if let Err(err) = self.configure_pins() {
            if first_power {
                self.powered = false;
                if let Err(cleanup_err) = self.driver.cleanup() {
                    log::warn!("releasing GPIO after failed power-on: {cleanup_err}");
                }
            }
            return Err(err);
        }
        Ok(())
    }

    fn configure_pins(&mut self) -> Result<(), D::Error> {
        for pin in self.pins {
            self.driver.configure_output(pin, Pull::Down)?;
        }
        Ok(())
    }

    /// Release the GPIO. Pin levels are left as they are.
    pub fn off(&mut self) -> Result<(), D::Error> {
        log::info!("car off");
        self.powered = false;
        self.driver.cleanup()
    }

    /// Write the action's four levels in order, pausing after each write.
    pub fn do_action(&mut self, action: Action) -> Result<(), D::Error> {
        log::debug!("action {action}");
        for (pin, level) in self.pins.into_iter().zip(action.signals()) {
            log::debug!("pin[{pin}] = {}", level.bit());
            self.driver.write(pin, level)?;
            if !self.step_delay.is_zero() {
                std::thread::sleep(self.step_delay);
            }
        }
        Ok(())
    }

    /// Handle a named request the way the HTTP `/action` endpoint does.
    ///
    /// - `on` powers the car on
    /// - `off` stops, then powers off
    /// - `stop` stops
    /// - any other name stops first, then runs the named action
    ///
    /// Returns `false` for unknown names and for driver failures, which are
    /// logged rather than propagated.
    pub fn dispatch(&mut self, name: &str) -> bool
    where
        D::Error: fmt::Display,
    {
        let request = CarRequest::from_text(name);
        let result = match request {
            Some(CarRequest::On) => self.on(),
            Some(CarRequest::Off) => {
                // Release the GPIO even when the stop writes fail.
                let stopped = self.do_action(Action::Stop);
                if let Err(err) = &stopped {
                    log::warn!("stop before off failed: {err}");
                }
                let released = self.off();
                stopped.and(released)
            }
            Some(CarRequest::Drive(Action::Stop)) => self.do_action(Action::Stop),
            Some(CarRequest::Drive(action)) => self
                .do_action(Action::Stop)
                .and_then(|()| self.do_action(action)),
            None => {
                // Unknown names still stop the car.
                if let Err(err) = self.do_action(Action::Stop) {
                    log::warn!("stop before unknown action {name:?} failed: {err}");
                }
                log::warn!("unknown action {name:?}");
                return false;
            }
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                log::error!("action {name:?} failed: {err}");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
