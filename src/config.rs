//! Shared configuration for the board server and desktop demos.
//!
//! Uses `heapless::String` for fixed-capacity strings, matching the
//! register layer's allocation-free style.
//!
//! # Example
//!
//! ```rust
//! use m1_car::config::{CarConfig, Config, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.web.port, 8000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_web(WebConfig::default().with_port(3000))
//!     .with_car(CarConfig::default().with_step_delay_ms(0));
//! assert_eq!(config.car.step_delay_ms, 0);
//! ```

use heapless::String as HString;

use crate::car::{LEFT_IN1, LEFT_IN2, RIGHT_IN1, RIGHT_IN2};
use crate::gpio::M1_GPIO_BASE;

/// Maximum length for short config strings (hostnames)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (paths)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    // Longest prefix that fits without splitting a character
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Register mapping configuration
    pub gpio: GpioConfig,
    /// Car wiring and timing
    pub car: CarConfig,
    /// Web server configuration
    pub web: WebConfig,
}

impl Config {
    /// Set GPIO configuration
    pub fn with_gpio(mut self, gpio: GpioConfig) -> Self {
        self.gpio = gpio;
        self
    }

    /// Set car configuration
    pub fn with_car(mut self, car: CarConfig) -> Self {
        self.car = car;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }
}

// ============================================================================
// GPIO Config
// ============================================================================

/// Register mapping configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpioConfig {
    /// Physical memory device
    pub device: LongString,
    /// Physical base address of the GPIO bank
    pub base_address: usize,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            device: long_string("/dev/mem"),
            base_address: M1_GPIO_BASE,
        }
    }
}

impl GpioConfig {
    /// Set the physical memory device path
    pub fn with_device(mut self, device: &str) -> Self {
        self.device = long_string(device);
        self
    }

    /// Set the GPIO bank's physical base address
    pub fn with_base_address(mut self, address: usize) -> Self {
        self.base_address = address;
        self
    }
}

// ============================================================================
// Car Config
// ============================================================================

/// Motor driver wiring and timing
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarConfig {
    /// Header pins in signal order: LeftIn1, LeftIn2, RightIn1, RightIn2
    pub pins: [i32; 4],
    /// Pause after each pin write in milliseconds
    pub step_delay_ms: u32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            pins: [LEFT_IN1, LEFT_IN2, RIGHT_IN1, RIGHT_IN2],
            step_delay_ms: 10,
        }
    }
}

impl CarConfig {
    /// Set the four motor driver input pins
    pub fn with_pins(mut self, pins: [i32; 4]) -> Self {
        self.pins = pins;
        self
    }

    /// Set the pause after each pin write
    pub fn with_step_delay_ms(mut self, ms: u32) -> Self {
        self.step_delay_ms = ms;
        self
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Address to bind
    pub host: ShortString,
    /// HTTP server port
    pub port: u16,
    /// Directory holding `html/index.html` and the `css`, `js`, `fonts` assets
    pub template_dir: LongString,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: short_string("0.0.0.0"),
            port: 8000,
            template_dir: long_string("template"),
            cors_permissive: false,
        }
    }
}

impl WebConfig {
    /// Set bind address
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set HTTP port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set template directory
    pub fn with_template_dir(mut self, dir: &str) -> Self {
        self.template_dir = long_string(dir);
        self
    }

    /// Enable or disable permissive CORS
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.gpio.device.as_str(), "/dev/mem");
        assert_eq!(config.gpio.base_address, 0x01C2_0800);
        assert_eq!(config.car.pins, [11, 13, 15, 16]);
        assert_eq!(config.car.step_delay_ms, 10);
        assert_eq!(config.web.port, 8000);
        assert_eq!(config.web.template_dir.as_str(), "template");
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_gpio(GpioConfig::default().with_device("/dev/gpiomem"))
            .with_car(CarConfig::default().with_pins([7, 8, 10, 12]))
            .with_web(
                WebConfig::default()
                    .with_host("127.0.0.1")
                    .with_port(3000)
                    .with_cors(true),
            );

        assert_eq!(config.gpio.device.as_str(), "/dev/gpiomem");
        assert_eq!(config.car.pins, [7, 8, 10, 12]);
        assert_eq!(config.web.host.as_str(), "127.0.0.1");
        assert_eq!(config.web.port, 3000);
        assert!(config.web.cors_permissive);
    }

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn long_string_truncation() {
        let long_input = "b".repeat(200);
        let s = long_string(&long_input);
        assert_eq!(s.len(), MAX_LONG_STRING);
    }

    #[test]
    fn string_helpers_utf8_boundary() {
        // 4-byte characters: 64 is a multiple of 4, 63 bytes of room is not
        let input = "\u{1F697}".repeat(20);
        let s = short_string(&input);
        assert_eq!(s.len(), 64);

        let input = format!("x{}", "\u{1F697}".repeat(20));
        let s = short_string(&input);
        assert_eq!(s.len(), 61);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }
}
