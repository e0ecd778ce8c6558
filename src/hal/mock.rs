//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the hardware traits, enabling
//! development and testing on desktop without a board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockRegisters`] | [`RegisterBank`] | In-memory register page, shared between clones |
//! | [`MockMapper`] | [`MemoryMapper`] | Hands out [`MockRegisters`], counts map/unmap, can fail |
//! | [`MockPins`] | [`PinDriver`] | Records pin modes, pulls and writes |
//!
//! # Example
//!
//! ```rust
//! use m1_car::gpio::Gpio;
//! use m1_car::hal::MockMapper;
//! use m1_car::traits::{Level, PinMode};
//!
//! let gpio = Gpio::new(MockMapper::new());
//! gpio.setup().unwrap();
//! gpio.configure(11, PinMode::Output).unwrap();
//! gpio.write(11, Level::High).unwrap();
//!
//! // PA0: mode nibble 0 of CFG0, bit 0 of DAT
//! let regs = gpio.mapper().registers();
//! assert_eq!(regs.port_word(0, 0x00), 0x1);
//! assert_eq!(regs.port_word(0, 0x10), 0x1);
//! ```
//!
//! [`RegisterBank`]: crate::traits::RegisterBank
//! [`MemoryMapper`]: crate::traits::MemoryMapper
//! [`PinDriver`]: crate::traits::PinDriver

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{GpioError, GpioResult};
use crate::gpio::layout::{self, M1_GPIO_BASE, WORD_SIZE};
use crate::gpio::topology;
use crate::traits::{Level, MemoryMapper, PinDriver, PinMode, Pull, RegisterBank};

// ============================================================================
// Register Mocks
// ============================================================================

/// Size of the mock register page.
pub const MOCK_PAGE_SIZE: usize = 0x1000;

/// In-memory register page.
///
/// Clones share the same storage, so a test can keep one handle while the
/// facade owns another.
#[derive(Clone, Debug)]
pub struct MockRegisters {
    words: Arc<Mutex<Vec<u32>>>,
    bank_offset: usize,
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegisters {
    /// A zeroed 4 KiB page with the bank at the M1's in-page offset.
    pub fn new() -> Self {
        Self::with_bank_offset(M1_GPIO_BASE % MOCK_PAGE_SIZE)
    }

    /// A zeroed page with the bank at `bank_offset`.
    pub fn with_bank_offset(bank_offset: usize) -> Self {
        Self {
            words: Arc::new(Mutex::new(vec![0; MOCK_PAGE_SIZE / WORD_SIZE])),
            bank_offset,
        }
    }

    fn words(&self) -> std::sync::MutexGuard<'_, Vec<u32>> {
        self.words.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Word at an absolute page offset. Out-of-range offsets read as 0.
    pub fn word(&self, offset: usize) -> u32 {
        self.words()
            .get(offset / WORD_SIZE)
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite the word at an absolute page offset.
    pub fn set_word(&self, offset: usize, value: u32) {
        if let Some(word) = self.words().get_mut(offset / WORD_SIZE) {
            *word = value;
        }
    }

    fn port_address(&self, port: usize, register: usize) -> usize {
        self.bank_offset + layout::port_offset(port) + register
    }

    /// Word at `register` within port `port`'s block.
    pub fn port_word(&self, port: usize, register: usize) -> u32 {
        self.word(self.port_address(port, register))
    }

    /// Overwrite `register` within port `port`'s block.
    pub fn set_port_word(&self, port: usize, register: usize, value: u32) {
        self.set_word(self.port_address(port, register), value);
    }

    /// Copy of the whole page.
    pub fn snapshot(&self) -> Vec<u32> {
        self.words().clone()
    }
}

impl RegisterBank for MockRegisters {
    type Error = GpioError;

    fn len(&self) -> usize {
        MOCK_PAGE_SIZE
    }

    fn bank_offset(&self) -> usize {
        self.bank_offset
    }

    fn read_word(&self, offset: usize) -> GpioResult<u32> {
        layout::check_word(offset, MOCK_PAGE_SIZE)?;
        Ok(self.word(offset))
    }

    fn write_word(&mut self, offset: usize, value: u32) -> GpioResult<()> {
        layout::check_word(offset, MOCK_PAGE_SIZE)?;
        self.set_word(offset, value);
        Ok(())
    }
}

/// Mock memory mapper.
///
/// Every `map()` returns a handle to the same [`MockRegisters`], so register
/// state survives a cleanup/setup cycle the way hardware does.
#[derive(Debug, Default)]
pub struct MockMapper {
    registers: MockRegisters,
    fail_map: bool,
    maps: AtomicUsize,
    unmaps: AtomicUsize,
}

impl MockMapper {
    /// Creates a mapper over a fresh zeroed page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper over existing registers.
    pub fn with_registers(registers: MockRegisters) -> Self {
        Self {
            registers,
            ..Self::default()
        }
    }

    /// Creates a mapper whose `map()` fails like an unprivileged `/dev/mem` open.
    pub fn failing() -> Self {
        Self {
            fail_map: true,
            ..Self::default()
        }
    }

    /// The shared register page.
    pub fn registers(&self) -> &MockRegisters {
        &self.registers
    }

    /// Number of successful `map()` calls.
    pub fn map_count(&self) -> usize {
        self.maps.load(Ordering::SeqCst)
    }

    /// Number of `unmap()` calls.
    pub fn unmap_count(&self) -> usize {
        self.unmaps.load(Ordering::SeqCst)
    }
}

impl MemoryMapper for MockMapper {
    type Region = MockRegisters;
    type Error = GpioError;

    fn map(&self) -> GpioResult<MockRegisters> {
        if self.fail_map {
            return Err(GpioError::Map {
                address: M1_GPIO_BASE,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.maps.fetch_add(1, Ordering::SeqCst);
        Ok(self.registers.clone())
    }

    fn unmap(&self, _region: MockRegisters) -> GpioResult<()> {
        self.unmaps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Pin Mock
// ============================================================================

/// Mock pin driver.
///
/// Records every configuration and write for verification. Follows the
/// facade's rules: calls before `setup` fail with
/// [`GpioError::NotInitialized`] and pins outside the header topology fail
/// with [`GpioError::UnmappedPin`].
///
/// # Example
///
/// ```rust
/// use m1_car::hal::MockPins;
/// use m1_car::traits::{Level, PinDriver};
///
/// let mut pins = MockPins::new();
/// assert!(pins.write(11, Level::High).is_err()); // not set up
///
/// pins.setup().unwrap();
/// pins.write(11, Level::High).unwrap();
/// pins.write(13, Level::Low).unwrap();
///
/// assert_eq!(pins.writes, vec![(11, Level::High), (13, Level::Low)]);
/// assert_eq!(pins.level(11), Level::High);
/// ```
#[derive(Debug, Default)]
pub struct MockPins {
    /// Whether `setup` has been called without a matching `cleanup`.
    pub mapped: bool,
    /// Every write in call order.
    pub writes: Vec<(i32, Level)>,
    /// Number of `setup` calls that succeeded.
    pub setup_count: usize,
    /// Number of `cleanup` calls that succeeded.
    pub cleanup_count: usize,
    /// Make the next `setup` fail.
    pub fail_setup: bool,
    modes: BTreeMap<i32, PinMode>,
    pulls: BTreeMap<i32, Pull>,
    levels: BTreeMap<i32, Level>,
}

impl MockPins {
    /// Creates an unmapped mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose `setup` fails.
    pub fn failing() -> Self {
        Self {
            fail_setup: true,
            ..Self::default()
        }
    }

    /// Last configured mode for `pin`.
    pub fn mode(&self, pin: i32) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }

    /// Last configured pull for `pin`.
    pub fn pull(&self, pin: i32) -> Option<Pull> {
        self.pulls.get(&pin).copied()
    }

    /// Current output level of `pin` (low if never written).
    pub fn level(&self, pin: i32) -> Level {
        self.levels.get(&pin).copied().unwrap_or_default()
    }

    /// Forget recorded writes, keeping levels and configuration.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn check(&self, pin: i32) -> GpioResult<()> {
        if !self.mapped {
            return Err(GpioError::NotInitialized);
        }
        topology::resolve(pin)
            .map(|_| ())
            .ok_or(GpioError::UnmappedPin(pin))
    }
}

impl PinDriver for MockPins {
    type Error = GpioError;

    fn setup(&mut self) -> GpioResult<()> {
        if self.fail_setup {
            return Err(GpioError::Open {
                path: "/dev/mem".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        if self.mapped {
            return Err(GpioError::AlreadyInitialized);
        }
        self.mapped = true;
        self.setup_count += 1;
        Ok(())
    }

    fn cleanup(&mut self) -> GpioResult<()> {
        if !self.mapped {
            return Err(GpioError::NotInitialized);
        }
        self.mapped = false;
        self.cleanup_count += 1;
        Ok(())
    }

    fn configure(&mut self, pin: i32, mode: PinMode) -> GpioResult<()> {
        self.check(pin)?;
        self.modes.insert(pin, mode);
        Ok(())
    }

    fn set_pull(&mut self, pin: i32, pull: Pull) -> GpioResult<()> {
        self.check(pin)?;
        self.pulls.insert(pin, pull);
        Ok(())
    }

    fn write(&mut self, pin: i32, level: Level) -> GpioResult<()> {
        self.check(pin)?;
        self.levels.insert(pin, level);
        self.writes.push((pin, level));
        Ok(())
    }

    fn read(&mut self, pin: i32) -> GpioResult<Level> {
        self.check(pin)?;
        Ok(self.level(pin))
    }
}

// ============================================================================
// Tests
// ============================================================================
