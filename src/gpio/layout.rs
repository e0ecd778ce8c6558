//! Byte layout of one H3 port control block.
//!
//! ```text
//! 0x00  CFG0  CFG1  CFG2  CFG3   4 bits/pin, 8 pins per word
//! 0x10  DAT                      1 bit/pin
//! 0x14  DRV0  DRV1               2 bits/pin, 16 pins per word
//! 0x1C  PUL0  PUL1               2 bits/pin, 16 pins per word
//! 0x24  (next port)
//! ```

use super::topology::PORT_COUNT;
use crate::error::{GpioError, GpioResult};

/// Physical base address of the GPIO controller (PIO) on the Allwinner H3.
pub const M1_GPIO_BASE: usize = 0x01C2_0800;

/// Size of a register word in bytes.
pub const WORD_SIZE: usize = 4;

/// Size of one port's register block.
pub const PORT_BLOCK_SIZE: usize = 0x24;

/// Configuration words.
pub const CFG_OFFSET: usize = 0x00;
/// Number of configuration words.
pub const CFG_WORDS: usize = 4;
/// Pins per configuration word.
pub const CFG_PINS_PER_WORD: u8 = 8;
/// Bits per pin in a configuration word.
pub const CFG_BITS_PER_PIN: u8 = 4;

/// Data word.
pub const DAT_OFFSET: usize = CFG_OFFSET + CFG_WORDS * WORD_SIZE;

/// Drive-strength words.
pub const DRV_OFFSET: usize = DAT_OFFSET + WORD_SIZE;
/// Number of drive-strength words.
pub const DRV_WORDS: usize = 2;

/// Pull resistor words.
pub const PUL_OFFSET: usize = DRV_OFFSET + DRV_WORDS * WORD_SIZE;
/// Number of pull words.
pub const PUL_WORDS: usize = 2;
/// Pins per pull word.
pub const PUL_PINS_PER_WORD: u8 = 16;
/// Bits per pin in a pull word.
pub const PUL_BITS_PER_PIN: u8 = 2;

const _: () = assert!(PUL_OFFSET + PUL_WORDS * WORD_SIZE == PORT_BLOCK_SIZE);

/// Bytes spanned by all port blocks, measured from the bank offset.
pub const BANK_SPAN: usize = PORT_COUNT * PORT_BLOCK_SIZE;

/// Offset of port `port`'s block from the bank start.
#[inline]
pub const fn port_offset(port: usize) -> usize {
    port * PORT_BLOCK_SIZE
}

/// Configuration word offset and bit position for `shift`.
#[inline]
pub const fn cfg_field(shift: u8) -> (usize, u32) {
    let word = (shift / CFG_PINS_PER_WORD) as usize;
    let bit = ((shift % CFG_PINS_PER_WORD) * CFG_BITS_PER_PIN) as u32;
    (CFG_OFFSET + word * WORD_SIZE, bit)
}

/// Pull word offset and bit position for `shift`.
#[inline]
pub const fn pull_field(shift: u8) -> (usize, u32) {
    let word = (shift / PUL_PINS_PER_WORD) as usize;
    let bit = ((shift % PUL_PINS_PER_WORD) * PUL_BITS_PER_PIN) as u32;
    (PUL_OFFSET + word * WORD_SIZE, bit)
}

/// Validate that a word at `offset` lies inside a mapping of `len` bytes.
pub fn check_word(offset: usize, len: usize) -> GpioResult<()> {
    let in_bounds = offset
        .checked_add(WORD_SIZE)
        .is_some_and(|end| end <= len);
    if offset % WORD_SIZE != 0 || !in_bounds {
        return Err(GpioError::OutOfBounds { offset, len });
    }
    Ok(())
}
