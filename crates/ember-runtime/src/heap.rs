//! Heap accounting for compiled executables
//!
//! Executables are ordinary Rust values, so the heap does not own their
//! memory. It only counts it: every executable carries an [`Allocation`] that
//! charges its size against the VM on creation and releases it on drop. The
//! VM consults the counters to decide when to collect and when to refuse an
//! allocation outright.

use crate::value::{RuntimeError, RuntimeResult};
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Live byte counters shared between the heap and outstanding allocations
#[derive(Debug, Default)]
struct Counters {
    bytes_allocated: Cell<usize>,
    peak: Cell<usize>,
}

/// Collection statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GcStats {
    /// Completed collections
    pub collections: usize,
    /// Cache slots emptied by sweeping
    pub slots_reclaimed: usize,
    /// Bytes released by those slots
    pub bytes_freed: usize,
    /// High-water mark of live bytes
    pub peak_bytes: usize,
}

/// Per-VM heap accounting
pub struct Heap {
    counters: Rc<Counters>,
    limit: Option<usize>,
    base_threshold: usize,
    next_gc_threshold: Cell<usize>,
    stress: bool,
    stats: Cell<GcStats>,
}

impl Heap {
    pub fn new(limit: Option<usize>, gc_threshold: usize, stress: bool) -> Self {
        Self {
            counters: Rc::new(Counters::default()),
            limit,
            base_threshold: gc_threshold,
            next_gc_threshold: Cell::new(gc_threshold),
            stress,
            stats: Cell::new(GcStats::default()),
        }
    }

    /// Bytes currently held by live allocations
    pub fn bytes_allocated(&self) -> usize {
        self.counters.bytes_allocated.get()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_stress(&self) -> bool {
        self.stress
    }

    pub fn next_gc_threshold(&self) -> usize {
        self.next_gc_threshold.get()
    }

    /// Whether the VM should collect before allocating `requested` bytes
    pub fn should_collect(&self, requested: usize) -> bool {
        if self.stress {
            return true;
        }
        let projected = self.bytes_allocated().saturating_add(requested);
        projected > self.next_gc_threshold.get() || self.exceeds_limit(projected)
    }

    /// Charge `requested` bytes, failing if the limit would be exceeded
    pub fn try_allocate(&self, requested: usize) -> RuntimeResult<Allocation> {
        let live = self.bytes_allocated();
        let projected = live.saturating_add(requested);
        if let Some(limit) = self.limit.filter(|_| self.exceeds_limit(projected)) {
            return Err(RuntimeError::OutOfMemory {
                requested,
                live,
                limit,
            });
        }

        self.counters.bytes_allocated.set(projected);
        if projected > self.counters.peak.get() {
            self.counters.peak.set(projected);
        }

        Ok(Allocation {
            bytes: requested,
            counters: Rc::clone(&self.counters),
        })
    }

    /// Record a finished collection and grow the next threshold
    pub(crate) fn record_collection(&self, before: usize, slots_reclaimed: usize) {
        let after = self.bytes_allocated();
        let mut stats = self.stats.get();
        stats.collections += 1;
        stats.slots_reclaimed += slots_reclaimed;
        stats.bytes_freed += before.saturating_sub(after);
        self.stats.set(stats);

        self.next_gc_threshold
            .set(std::cmp::max(after * 2, self.base_threshold));
    }

    pub fn stats(&self) -> GcStats {
        GcStats {
            peak_bytes: self.counters.peak.get(),
            ..self.stats.get()
        }
    }

    fn exceeds_limit(&self, projected: usize) -> bool {
        self.limit.is_some_and(|limit| projected > limit)
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("bytes_allocated", &self.bytes_allocated())
            .field("limit", &self.limit)
            .field("next_gc_threshold", &self.next_gc_threshold.get())
            .field("stress", &self.stress)
            .finish()
    }
}

/// Bytes charged to a heap, released when dropped
pub struct Allocation {
    bytes: usize,
    counters: Rc<Counters>,
}

impl Allocation {
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        let live = self.counters.bytes_allocated.get();
        self.counters
            .bytes_allocated
            .set(live.saturating_sub(self.bytes));
    }
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation({} bytes)", self.bytes)
    }
}
