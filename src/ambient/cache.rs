//! Casting fp32 data into the active autocast precision.
//!
//! Weight casts can be memoised per key while a scope with
//! `cache_enabled` is active; the cache lives until the outermost scope on
//! the thread exits.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::precision::{bf16_to_f32, f32_to_bf16, f32_to_fp16, fp16_to_f32, Precision};

use super::state::current_frame;

/// Values in either full or reduced precision.
#[derive(Debug, Clone, PartialEq)]
pub enum CastTensor {
    /// Untouched fp32 values
    Full(Rc<[f32]>),
    /// Reduced-precision bit patterns
    Reduced { precision: Precision, bits: Rc<[u16]> },
}

impl CastTensor {
    /// Precision the values are stored in
    pub fn precision(&self) -> Precision {
        match self {
            Self::Full(_) => Precision::Fp32,
            Self::Reduced { precision, .. } => *precision,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::Full(values) => values.len(),
            Self::Reduced { bits, .. } => bits.len(),
        }
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen back to f32
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            Self::Full(values) => values.to_vec(),
            Self::Reduced { precision: Precision::Bf16, bits } => {
                bits.iter().map(|&b| bf16_to_f32(b)).collect()
            }
            Self::Reduced { bits, .. } => bits.iter().map(|&b| fp16_to_f32(b)).collect(),
        }
    }
}

thread_local! {
    static CAST_CACHE: RefCell<HashMap<(u64, Precision), CastTensor>> =
        RefCell::new(HashMap::new());
}

fn cast_to(values: &[f32], precision: Precision) -> CastTensor {
    let bits: Rc<[u16]> = match precision {
        Precision::Fp32 => return CastTensor::Full(Rc::from(values)),
        Precision::Fp16 => values.iter().map(|&v| f32_to_fp16(v)).collect(),
        Precision::Bf16 => values.iter().map(|&v| f32_to_bf16(v)).collect(),
    };
    CastTensor::Reduced { precision, bits }
}

/// Cast `values` to the active autocast precision, or keep them fp32 when no
/// scope is active on this thread.
pub fn maybe_autocast(values: &[f32]) -> CastTensor {
    match current_frame() {
        Some(frame) => cast_to(values, frame.dtype),
        None => CastTensor::Full(Rc::from(values)),
    }
}

/// Like [`maybe_autocast`], memoising the result under `key` when the active
/// scope allows caching.
///
/// Callers must use a stable `key` per weight; stale entries are not
/// detected if the weight changes inside a scope.
pub fn cast_weight(key: u64, values: &[f32]) -> CastTensor {
    let Some(frame) = current_frame() else {
        return CastTensor::Full(Rc::from(values));
    };
    if !frame.cache_enabled {
        return cast_to(values, frame.dtype);
    }
    CAST_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry((key, frame.dtype))
            .or_insert_with(|| cast_to(values, frame.dtype))
            .clone()
    })
}

/// Number of cached weight casts on this thread
pub fn cache_len() -> usize {
    CAST_CACHE.with(|cache| cache.borrow().len())
}

pub(crate) fn clear_cache() {
    let evicted = CAST_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        let n = cache.len();
        cache.clear();
        n
    });
    if evicted > 0 {
        tracing::trace!(evicted, "autocast cast cache cleared");
    }
}
