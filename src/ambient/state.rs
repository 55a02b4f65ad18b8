//! Per-thread stack of active autocast frames.

use std::cell::RefCell;

use crate::device::DeviceType;
use crate::precision::Precision;

use super::cache;

/// One active autocast scope on the current thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocastFrame {
    pub device: DeviceType,
    pub dtype: Precision,
    pub cache_enabled: bool,
}

/// Frame tagged with the id of the context that pushed it.
#[derive(Debug)]
struct Entry {
    owner: u64,
    frame: AutocastFrame,
}

thread_local! {
    static FRAMES: RefCell<Vec<Entry>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn push_frame(owner: u64, frame: AutocastFrame) {
    tracing::trace!(owner, device = %frame.device, dtype = %frame.dtype, "autocast frame pushed");
    FRAMES.with(|frames| frames.borrow_mut().push(Entry { owner, frame }));
}

/// Pop the innermost frame if `owner` pushed it.
///
/// Returns `None` and leaves the stack untouched when the innermost frame
/// belongs to another context. Clears the cast cache once the stack is empty.
pub(crate) fn pop_frame(owner: u64) -> Option<AutocastFrame> {
    let (popped, now_empty) = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        match frames.last() {
            Some(top) if top.owner == owner => {
                let popped = frames.pop().map(|e| e.frame);
                (popped, frames.is_empty())
            }
            _ => (None, false),
        }
    });
    if popped.is_some() && now_empty {
        cache::clear_cache();
    }
    popped
}

/// Innermost active frame on this thread
pub fn current_frame() -> Option<AutocastFrame> {
    FRAMES.with(|frames| frames.borrow().last().map(|e| e.frame.clone()))
}

/// Number of active autocast scopes on this thread
pub fn nesting_depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}

/// Whether any active scope on this thread targets `device`
pub fn is_autocast_enabled(device: &DeviceType) -> bool {
    FRAMES.with(|frames| frames.borrow().iter().any(|e| &e.frame.device == device))
}

/// Precision of the innermost active scope targeting `device`
pub fn autocast_dtype(device: &DeviceType) -> Option<Precision> {
    FRAMES.with(|frames| {
        frames.borrow().iter().rev().find(|e| &e.frame.device == device).map(|e| e.frame.dtype)
    })
}
