//! Allocation accounting for benchmark runs.
//!
//! Binaries opt in by installing [`CountingAllocator`] as their
//! `#[global_allocator]`. Counters are kept per thread so a benchmark only
//! sees its own allocations, even when the test harness runs other work in
//! parallel.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// `System` wrapper that counts allocation calls and requested bytes.
pub struct CountingAllocator;

impl CountingAllocator {
    pub const fn new() -> Self {
        CountingAllocator
    }
}

impl Default for CountingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    // Const-initialized and drop-free, so touching these never allocates.
    static ALLOC_COUNT: Cell<u64> = const { Cell::new(0) };
    static ALLOC_BYTES: Cell<u64> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, old_layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, old_layout, new_size) };
        if !new_ptr.is_null() && new_size > old_layout.size() {
            record_alloc(new_size);
        }
        new_ptr
    }
}

fn record_alloc(size: usize) {
    INSTALLED.store(true, Ordering::Relaxed);
    let _ = ALLOC_COUNT.try_with(|c| c.set(c.get().wrapping_add(1)));
    let _ = ALLOC_BYTES.try_with(|c| c.set(c.get().wrapping_add(size as u64)));
}

/// True once [`CountingAllocator`] has served an allocation in this process.
pub fn tracking_active() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Point-in-time copy of the calling thread's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    count: u64,
    bytes: u64,
}

impl AllocSnapshot {
    pub fn now() -> Self {
        AllocSnapshot {
            count: ALLOC_COUNT.try_with(Cell::get).unwrap_or(0),
            bytes: ALLOC_BYTES.try_with(Cell::get).unwrap_or(0),
        }
    }

    pub fn since(&self, earlier: &AllocSnapshot) -> AllocDelta {
        AllocDelta {
            allocs: self.count.wrapping_sub(earlier.count),
            bytes: self.bytes.wrapping_sub(earlier.bytes),
        }
    }
}

/// Allocations performed between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocDelta {
    pub allocs: u64,
    pub bytes: u64,
}
