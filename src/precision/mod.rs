//! Numeric formats an autocast scope can run in.
//!
//! The conversion helpers here are what the ambient backend uses to cast
//! fp32 weights when a scope is active.

mod conversions;
mod precision_types;


pub use conversions::{bf16_to_f32, f32_to_bf16, f32_to_fp16, fp16_to_f32};
pub use precision_types::{ParsePrecisionError, Precision};
