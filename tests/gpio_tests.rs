//! Register-level behaviour of the GPIO facade against an in-memory page.

use m1_car::gpio::layout::{CFG_OFFSET, DAT_OFFSET, PUL_OFFSET};
use m1_car::gpio::{mapped_pins, resolve};
use m1_car::hal::{MockMapper, MockRegisters};
use m1_car::{Gpio, GpioError, Level, PinMode, Pull};

const PA: usize = 0;

fn mapped() -> Gpio<MockMapper> {
    let gpio = Gpio::new(MockMapper::new());
    gpio.setup().unwrap();
    gpio
}

/// Fill every port's registers with a recognisable pattern.
fn seeded(pattern: u32) -> Gpio<MockMapper> {
    let registers = MockRegisters::new();
    for port in 0..7 {
        for offset in (0..0x24).step_by(4) {
            registers.set_port_word(port, offset, pattern);
        }
    }
    let gpio = Gpio::new(MockMapper::with_registers(registers));
    gpio.setup().unwrap();
    gpio
}

// ============================================================================
// Topology
// ============================================================================

#[test]
fn resolution_is_stable_for_every_pin() {
    for pin in -10..80 {
        let first = resolve(pin);
        for _ in 0..3 {
            assert_eq!(resolve(pin), first);
        }
        if !(0..64).contains(&pin) {
            assert_eq!(first, None, "pin {pin}");
        }
    }
}

#[test]
fn pin_32_is_pa7() {
    let loc = resolve(32).unwrap();
    assert_eq!((loc.port, loc.shift), (0, 7));
}

// ============================================================================
// Round trips leave neighbours alone
// ============================================================================

#[test]
fn mode_round_trip_restores_cfg_word() {
    for pattern in [0x0000_0000, 0x7777_7777, 0xFFFF_FFFF, 0x1234_5678] {
        let gpio = seeded(pattern);
        for (pin, _) in mapped_pins() {
            let before = gpio.mapper().registers().snapshot();
            gpio.configure(pin, PinMode::Output).unwrap();
            assert_eq!(gpio.mode(pin).unwrap(), Some(PinMode::Output));
            gpio.configure(pin, PinMode::Input).unwrap();
            gpio.configure(pin, PinMode::Output).unwrap();
            gpio.configure(pin, PinMode::Input).unwrap();

            let after = gpio.mapper().registers().snapshot();
            let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
            // Only the pin's own nibble may differ from the seed (now input = 0)
            assert!(changed.len() <= 1, "pin {pin} changed words {changed:?}");
            for i in changed {
                let diff = before[i] ^ after[i];
                assert_eq!(diff & !(0xF << (diff.trailing_zeros() / 4 * 4)), 0);
            }
        }
    }
}

#[test]
fn output_then_input_restores_original_input_bits() {
    let gpio = mapped();
    let before = gpio.mapper().registers().snapshot();
    for (pin, _) in mapped_pins() {
        gpio.configure(pin, PinMode::Output).unwrap();
        gpio.configure(pin, PinMode::Input).unwrap();
    }
    assert_eq!(gpio.mapper().registers().snapshot(), before);
}

#[test]
fn write_round_trip_restores_data_word() {
    for pattern in [0x0000_0000, 0xAAAA_AAAA, 0x5555_5555] {
        let gpio = seeded(pattern);
        let before = gpio.mapper().registers().snapshot();
        for (pin, loc) in mapped_pins() {
            let original = (pattern >> loc.shift) & 1;
            gpio.write(pin, Level::High).unwrap();
            assert_eq!(gpio.read(pin).unwrap(), Level::High);
            gpio.write(pin, Level::Low).unwrap();
            assert_eq!(gpio.read(pin).unwrap(), Level::Low);
            gpio.write(pin, Level::from(original == 1)).unwrap();
        }
        assert_eq!(gpio.mapper().registers().snapshot(), before);
    }
}

#[test]
fn pull_round_trip_restores_pull_words() {
    let gpio = mapped();
    let before = gpio.mapper().registers().snapshot();
    for (pin, _) in mapped_pins() {
        gpio.set_pull(pin, Pull::Up).unwrap();
        gpio.set_pull(pin, Pull::Off).unwrap();
    }
    assert_eq!(gpio.mapper().registers().snapshot(), before);
}

// ============================================================================
// Bit-exact scenarios
// ============================================================================

#[test]
fn shift_seven_output_sets_top_nibble_of_cfg0() {
    let gpio = seeded(0x0FFF_FFFF);
    gpio.configure(32, PinMode::Output).unwrap(); // PA7

    let regs = gpio.mapper().registers();
    assert_eq!(regs.port_word(PA, CFG_OFFSET), 0x1FFF_FFFF);
    assert_eq!(regs.port_word(PA, CFG_OFFSET + 4), 0x0FFF_FFFF);
    assert_eq!(regs.port_word(PA, DAT_OFFSET), 0x0FFF_FFFF);
}

#[test]
fn left_in1_output_sets_low_nibble_of_cfg0() {
    let gpio = seeded(0xFFFF_FFF0);
    gpio.configure(11, PinMode::Output).unwrap(); // PA0
    assert_eq!(
        gpio.mapper().registers().port_word(PA, CFG_OFFSET),
        0xFFFF_FFF1
    );
}

#[test]
fn pull_down_on_pa21_uses_second_half_of_pul0() {
    let gpio = mapped();
    gpio.set_pull(31, Pull::Down).unwrap(); // PA21
    let regs = gpio.mapper().registers();
    assert_eq!(regs.port_word(PA, PUL_OFFSET), 0);
    assert_eq!(regs.port_word(PA, PUL_OFFSET + 4), 0b10 << 10);
}

#[test]
fn read_returns_the_set_bit() {
    let gpio = mapped();
    gpio.mapper()
        .registers()
        .set_port_word(PA, DAT_OFFSET, 1 << 3);
    assert_eq!(gpio.read(15).unwrap(), Level::High); // PA3
    assert_eq!(gpio.read(13).unwrap(), Level::Low); // PA2
}

#[test]
fn ports_do_not_bleed_into_each_other() {
    let gpio = mapped();
    gpio.write(16, Level::High).unwrap(); // PG8
    let regs = gpio.mapper().registers();
    assert_eq!(regs.port_word(6, DAT_OFFSET), 1 << 8);
    for port in 0..6 {
        assert_eq!(regs.port_word(port, DAT_OFFSET), 0, "port {port}");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn every_operation_before_setup_reports_not_initialized() {
    let gpio = Gpio::new(MockMapper::new());
    assert!(matches!(gpio.configure(11, PinMode::Output), Err(GpioError::NotInitialized)));
    assert!(matches!(gpio.set_pull(11, Pull::Up), Err(GpioError::NotInitialized)));
    assert!(matches!(gpio.write(11, Level::High), Err(GpioError::NotInitialized)));
    assert!(matches!(gpio.read(11), Err(GpioError::NotInitialized)));
    assert!(gpio.mapper().registers().snapshot().iter().all(|&w| w == 0));
}

#[test]
fn operations_after_cleanup_report_not_initialized() {
    let gpio = mapped();
    gpio.cleanup().unwrap();
    assert!(matches!(gpio.write(11, Level::High), Err(GpioError::NotInitialized)));
}

#[test]
fn double_cleanup_is_contained() {
    let gpio = mapped();
    assert!(gpio.cleanup().is_ok());
    assert!(gpio.cleanup().is_err());
    assert_eq!(gpio.mapper().unmap_count(), 1);
}

#[test]
fn setup_failure_is_reported() {
    let gpio = Gpio::new(MockMapper::failing());
    let err = gpio.setup().unwrap_err();
    assert!(err.to_string().contains("failed to map"));
    assert!(!gpio.is_mapped());
}

#[test]
fn facade_is_shareable_across_threads() {
    use std::sync::Arc;

    let gpio = Arc::new(mapped());
    let handles: Vec<_> = [11, 12, 13, 15]
        .into_iter()
        .map(|pin| {
            let gpio = Arc::clone(&gpio);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    gpio.write(pin, Level::High).unwrap();
                    gpio.write(pin, Level::Low).unwrap();
                }
                gpio.write(pin, Level::High).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    // PA0, PA6, PA2, PA3 all high, nothing lost to racing read-modify-writes
    assert_eq!(
        gpio.mapper().registers().port_word(PA, DAT_OFFSET),
        0b0100_1101
    );
}
