//! Heap accounting and uptime for the running process.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use crate::error::{ProbeError, ProbeResult};

static IN_USE: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

/// System allocator wrapper that counts live and peak heap bytes.
///
/// Install it in a binary with `#[global_allocator]`; until then
/// [`heap_in_use`] and [`heap_peak`] return `None`.
pub struct TrackingAllocator;

fn record_alloc(size: usize) {
    let now = IN_USE.fetch_add(size, Ordering::Relaxed) + size;
    PEAK.fetch_max(now, Ordering::Relaxed);
}

fn record_dealloc(size: usize) {
    IN_USE.fetch_sub(size, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            record_dealloc(layout.size());
            record_alloc(new_size);
        }
        new_ptr
    }
}

pub fn heap_in_use() -> Option<u64> {
    tracked(IN_USE.load(Ordering::Relaxed))
}

pub fn heap_peak() -> Option<u64> {
    tracked(PEAK.load(Ordering::Relaxed))
}

// Any program allocates before it reports, so a zero peak means the
// allocator was never installed.
fn tracked(value: usize) -> Option<u64> {
    if PEAK.load(Ordering::Relaxed) == 0 {
        None
    } else {
        Some(value as u64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Uptime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl Uptime {
    pub fn from_duration(elapsed: Duration) -> Self {
        let secs = elapsed.as_secs();
        Uptime {
            days: secs / 86_400,
            hours: secs % 86_400 / 3_600,
            minutes: secs % 3_600 / 60,
        }
    }

    /// Time between `started_at` and `now`. A start in the future means the
    /// clock or the provider is off, and is reported rather than zeroed.
    pub fn between(started_at: SystemTime, now: SystemTime) -> ProbeResult<Self> {
        now.duration_since(started_at)
            .map(Self::from_duration)
            .map_err(|e| {
                ProbeError::anomalous(
                    "start_time",
                    format!("process start is {:?} in the future", e.duration()),
                )
            })
    }
}
