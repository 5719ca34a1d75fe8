//! Process-unique layer identities

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::data_structures::SlotKey;

static NEXT_LAYER_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a layer instance, drawn from a process-wide counter.
///
/// Only used as a lookup key for optimizer state, never as an ownership handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

impl LayerId {
    /// Allocates the next id. Every call returns a distinct value.
    pub fn next() -> Self {
        // Only uniqueness matters, no ordering with other memory operations.
        LayerId(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SlotKey for LayerId {
    fn slot(&self, capacity: usize) -> usize {
        self.0.slot(capacity)
    }
}
