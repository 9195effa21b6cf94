//! 14-bit value packing
//!
//! Every value travels as two 7-bit-clean bytes, low bits first, so payload
//! bytes can never be mistaken for a command byte.

/// Largest value the two-byte packing can carry.
pub const VALUE_MASK: u16 = 0x3FFF;
const SEVEN_BITS: u16 = 0x7F;

/// Counts per volt for voltage-like channels (10 bits over 3.3 V).
pub const VOLTS_TO_COUNTS: f32 = 310.3;
/// Amps per count on the current channel.
pub const CURRENT_LSB_A: f32 = 0.0814;
/// Zero-current code; readings below it are negative currents.
pub const CURRENT_ZERO_OFFSET: i32 = 512;

#[inline]
pub fn encode(value: u16) -> [u8; 2] {
    [
        (value & SEVEN_BITS) as u8,
        ((value >> 7) & SEVEN_BITS) as u8,
    ]
}

#[inline]
pub fn decode(lo: u8, hi: u8) -> u16 {
    (lo as u16 & SEVEN_BITS) | ((hi as u16 & SEVEN_BITS) << 7)
}

/// Voltage reading (touch sensors, bus voltage) to wire counts.
pub fn quantize_voltage(volts: f32) -> u16 {
    saturate(libm::roundf(volts * VOLTS_TO_COUNTS) as i32)
}

/// Bus current to wire counts, offset so that 0 A sits at 512.
pub fn quantize_current(amps: f32) -> u16 {
    saturate(libm::roundf(amps / CURRENT_LSB_A) as i32 + CURRENT_ZERO_OFFSET)
}

fn saturate(counts: i32) -> u16 {
    counts.clamp(0, VALUE_MASK as i32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_14_bit_value() {
        for v in 0..=VALUE_MASK {
            let [lo, hi] = encode(v);
            assert_eq!(lo & 0x80, 0);
            assert_eq!(hi & 0x80, 0);
            assert_eq!(decode(lo, hi), v);
        }
    }

    #[test]
    fn encode_1500() {
        // 1500 = 0b1011_1011100 -> low7 = 92, high7 = 11
        assert_eq!(encode(1500), [92, 11]);
        assert_eq!(decode(92, 11), 1500);
    }

    #[test]
    fn decode_ignores_top_bit() {
        assert_eq!(decode(0xFF, 0xFF), VALUE_MASK);
    }

    #[test]
    fn encode_truncates_to_14_bits() {
        assert_eq!(encode(0xFFFF), [0x7F, 0x7F]);
    }

    #[test]
    fn voltage_quantization() {
        assert_eq!(quantize_voltage(0.0), 0);
        assert_eq!(quantize_voltage(1.0), 310);
        assert_eq!(quantize_voltage(3.3), 1024);
        assert_eq!(quantize_voltage(-0.5), 0);
        assert_eq!(quantize_voltage(1000.0), VALUE_MASK);
    }

    #[test]
    fn current_quantization() {
        assert_eq!(quantize_current(0.0), 512);
        assert_eq!(quantize_current(0.0814), 513);
        assert_eq!(quantize_current(-0.0814), 511);
        assert_eq!(quantize_current(2.0), 537); // 24.57 -> 25
        assert_eq!(quantize_current(-100.0), 0);
    }
}
