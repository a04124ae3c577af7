//! Collector-tied weak slot
//!
//! A [`WeakSlot`] caches one value for the VM. Unlike `std::rc::Weak`, the
//! value does not disappear the moment its last outside owner drops it; it
//! stays cached until the VM's collector decides to reclaim it. Collection is
//! two-phase:
//!
//! 1. **mark** flags every cached value that nobody outside the slot holds
//!    (`Rc::strong_count == 1`) as reclaimable.
//! 2. **sweep** empties every slot still flagged.
//!
//! Reading a flagged slot between the phases hands out a new strong reference,
//! so the read clears the flag and the value survives the sweep.

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

enum SlotState<T> {
    Empty,
    Materialized(Rc<T>),
    Reclaimable(Rc<T>),
}

/// Observable state of a slot, without the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotStatus {
    Empty,
    Materialized,
    Reclaimable,
}

/// Weakly held cache cell
pub struct WeakSlot<T> {
    state: RefCell<SlotState<T>>,
}

impl<T> WeakSlot<T> {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SlotState::Empty),
        }
    }

    /// Return the cached value, resurrecting it if it was marked
    pub fn try_get(&self) -> Option<Rc<T>> {
        let mut state = self.state.borrow_mut();
        match &*state {
            SlotState::Empty => None,
            SlotState::Materialized(value) => Some(Rc::clone(value)),
            SlotState::Reclaimable(value) => {
                let value = Rc::clone(value);
                *state = SlotState::Materialized(Rc::clone(&value));
                Some(value)
            }
        }
    }

    /// Cache `value`, replacing whatever the slot held
    pub fn store(&self, value: Rc<T>) {
        *self.state.borrow_mut() = SlotState::Materialized(value);
    }

    /// Empty the slot unless someone outside it still holds the value
    ///
    /// Returns whether a value was dropped. A rooted value stays cached, so a
    /// slot never hands out a second value while the first is in use.
    pub fn invalidate(&self) -> bool {
        let rooted = match &*self.state.borrow() {
            SlotState::Empty => return false,
            SlotState::Materialized(value) | SlotState::Reclaimable(value) => {
                Rc::strong_count(value) > 1
            }
        };
        !rooted && self.clear()
    }

    fn clear(&self) -> bool {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), SlotState::Empty);
        // Drop the value after the borrow ends so its destructor may touch the slot
        !matches!(previous, SlotState::Empty)
    }

    /// Whether the slot currently holds a value
    pub fn is_live(&self) -> bool {
        !matches!(*self.state.borrow(), SlotState::Empty)
    }

    pub fn status(&self) -> SlotStatus {
        match *self.state.borrow() {
            SlotState::Empty => SlotStatus::Empty,
            SlotState::Materialized(_) => SlotStatus::Materialized,
            SlotState::Reclaimable(_) => SlotStatus::Reclaimable,
        }
    }

    /// Mark phase; returns whether the slot became reclaimable
    pub fn mark(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let unrooted = match &*state {
            SlotState::Materialized(value) => Rc::strong_count(value) == 1,
            _ => false,
        };
        if unrooted {
            if let SlotState::Materialized(value) =
                std::mem::replace(&mut *state, SlotState::Empty)
            {
                *state = SlotState::Reclaimable(value);
            }
        }
        unrooted
    }

    /// Sweep phase; returns whether the slot was reclaimed
    pub fn sweep(&self) -> bool {
        let reclaimable = matches!(*self.state.borrow(), SlotState::Reclaimable(_));
        if reclaimable {
            self.clear();
        }
        reclaimable
    }
}

impl<T> Default for WeakSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WeakSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakSlot({:?})", self.status())
    }
}
