//! Bit-level conversions between f32 and the 16-bit formats.

use half::{bf16, f16};

/// Convert f32 to bf16 bits
///
/// BF16 uses the same exponent as f32 but only 7 mantissa bits.
pub fn f32_to_bf16(value: f32) -> u16 {
    bf16::from_f32(value).to_bits()
}

/// Convert bf16 bits to f32
pub fn bf16_to_f32(value: u16) -> f32 {
    bf16::from_bits(value).to_f32()
}

/// Convert f32 to fp16 bits (IEEE half precision)
pub fn f32_to_fp16(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

/// Convert fp16 bits to f32
pub fn fp16_to_f32(value: u16) -> f32 {
    f16::from_bits(value).to_f32()
}
