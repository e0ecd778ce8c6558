//! Masked read-modify-write access to one port's register block.

use super::layout::{self, DAT_OFFSET};
use crate::error::GpioResult;
use crate::traits::{Level, PinMode, Pull, RegisterBank};

/// Borrowed view of a single port inside a mapped register page.
///
/// The borrow ties the accessor to the mapping, so a `Port` can never
/// outlive the region it writes to.
pub struct Port<'a, B: RegisterBank + ?Sized> {
    bank: &'a mut B,
    base: usize,
}

impl<'a, B> Port<'a, B>
where
    B: RegisterBank<Error = crate::GpioError> + ?Sized,
{
    /// Create an accessor for port `port` of the bank mapped in `bank`.
    pub fn new(bank: &'a mut B, port: usize) -> Self {
        let base = bank.bank_offset() + layout::port_offset(port);
        Self { bank, base }
    }

    /// Byte offset of this port's block within the mapping.
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Read a register of this port.
    pub fn read_register(&self, offset: usize) -> GpioResult<u32> {
        self.bank.read_word(self.base + offset)
    }

    /// Clear `mask << bit` in the register at `offset`, then OR in `value << bit`.
    fn modify(&mut self, offset: usize, bit: u32, mask: u32, value: u32) -> GpioResult<()> {
        let addr = self.base + offset;
        let word = self.bank.read_word(addr)?;
        let word = (word & !(mask << bit)) | ((value & mask) << bit);
        self.bank.write_word(addr, word)
    }

    /// Set the 4-bit mode field for the pin at `shift`.
    pub fn set_mode(&mut self, shift: u8, mode: PinMode) -> GpioResult<()> {
        let (offset, bit) = layout::cfg_field(shift);
        self.modify(offset, bit, 0xF, mode.bits())
    }

    /// Raw 4-bit mode field for the pin at `shift`.
    pub fn mode_bits(&self, shift: u8) -> GpioResult<u32> {
        let (offset, bit) = layout::cfg_field(shift);
        Ok((self.read_register(offset)? >> bit) & 0xF)
    }

    /// Set the 2-bit pull field for the pin at `shift`.
    pub fn set_pull(&mut self, shift: u8, pull: Pull) -> GpioResult<()> {
        let (offset, bit) = layout::pull_field(shift);
        self.modify(offset, bit, 0x3, pull.bits())
    }

    /// Set or clear the data bit at `shift`, leaving the rest of the word alone.
    pub fn write(&mut self, shift: u8, level: Level) -> GpioResult<()> {
        self.modify(DAT_OFFSET, u32::from(shift), 0x1, level.bit())
    }

    /// Current level of the data bit at `shift`.
    pub fn read(&self, shift: u8) -> GpioResult<Level> {
        let data = self.read_register(DAT_OFFSET)?;
        Ok(Level::from((data >> shift) & 1 == 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::layout::{CFG_OFFSET, PUL_OFFSET};
    use crate::hal::MockRegisters;

    const PA: usize = 0;
    const PG: usize = 6;

    #[test]
    fn port_base_includes_bank_offset() {
        let mut regs = MockRegisters::new();
        assert_eq!(Port::new(&mut regs, PA).base(), 0x800);
        assert_eq!(Port::new(&mut regs, PG).base(), 0x8D8);
    }

    #[test]
    fn set_mode_touches_only_its_nibble() {
        let mut regs = MockRegisters::new();
        regs.set_port_word(PA, CFG_OFFSET, 0x7777_7777);

        Port::new(&mut regs, PA).set_mode(7, PinMode::Output).unwrap();
        assert_eq!(regs.port_word(PA, CFG_OFFSET), 0x1777_7777);

        Port::new(&mut regs, PA).set_mode(7, PinMode::Input).unwrap();
        assert_eq!(regs.port_word(PA, CFG_OFFSET), 0x0777_7777);
    }

    #[test]
    fn set_mode_selects_cfg_word_by_shift() {
        let mut regs = MockRegisters::new();
        Port::new(&mut regs, PG).set_mode(11, PinMode::Output).unwrap();
        assert_eq!(regs.port_word(PG, CFG_OFFSET), 0);
        assert_eq!(regs.port_word(PG, CFG_OFFSET + 4), 0x0000_1000);
    }

    #[test]
    fn mode_bits_reads_back() {
        let mut regs = MockRegisters::new();
        let mut port = Port::new(&mut regs, PA);
        port.set_mode(3, PinMode::Output).unwrap();
        assert_eq!(port.mode_bits(3).unwrap(), 1);
        assert_eq!(port.mode_bits(2).unwrap(), 0);
    }

    #[test]
    fn set_pull_touches_only_its_pair() {
        let mut regs = MockRegisters::new();
        regs.set_port_word(PA, PUL_OFFSET, 0xFFFF_FFFF);

        Port::new(&mut regs, PA).set_pull(2, Pull::Down).unwrap();
        assert_eq!(regs.port_word(PA, PUL_OFFSET), 0xFFFF_FFEF);

        Port::new(&mut regs, PA).set_pull(17, Pull::Up).unwrap();
        assert_eq!(regs.port_word(PA, PUL_OFFSET + 4), 0x0000_0004);
    }

    #[test]
    fn write_sets_and_clears_one_bit() {
        let mut regs = MockRegisters::new();
        regs.set_port_word(PA, DAT_OFFSET, 0x8000_0001);

        Port::new(&mut regs, PA).write(3, Level::High).unwrap();
        assert_eq!(regs.port_word(PA, DAT_OFFSET), 0x8000_0009);

        Port::new(&mut regs, PA).write(0, Level::Low).unwrap();
        assert_eq!(regs.port_word(PA, DAT_OFFSET), 0x8000_0008);
    }

    #[test]
    fn read_extracts_the_bit_at_shift() {
        let mut regs = MockRegisters::new();
        regs.set_port_word(PA, DAT_OFFSET, 1 << 21);

        let port = Port::new(&mut regs, PA);
        assert_eq!(port.read(21).unwrap(), Level::High);
        assert_eq!(port.read(20).unwrap(), Level::Low);
        assert_eq!(port.read(22).unwrap(), Level::Low);
    }

    #[test]
    fn read_high_bit_does_not_sign_extend() {
        let mut regs = MockRegisters::new();
        regs.set_port_word(PA, DAT_OFFSET, 1 << 31);
        assert_eq!(Port::new(&mut regs, PA).read(31).unwrap(), Level::High);
    }
}
