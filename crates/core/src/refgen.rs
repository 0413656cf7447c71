//! Reference number generation with reserved ranges

use parking_lot::Mutex;
use std::ops::Range;
use std::sync::atomic::{self, AtomicU64};

use crate::ActorId;

/// Thread-safe generator for actor reference numbers.
///
/// Numbers are never reused, so a reference held by a suspended script can
/// never come to point at a different entity. Zone loaders may reserve
/// ranges for definition-assigned ids; runtime allocation skips them.
pub struct ReferenceGenerator {
    reserved: Mutex<Vec<Range<u64>>>,
    next_id: AtomicU64,
}

impl ReferenceGenerator {
    pub fn new() -> Self {
        Self {
            reserved: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reserve a range for externally-assigned ids
    pub fn reserve(&self, range: Range<u64>) {
        self.reserved.lock().push(range);
    }

    /// Get the next available actor id
    pub fn allocate(&self) -> ActorId {
        loop {
            let id = self.next_id.fetch_add(1, atomic::Ordering::Relaxed);
            let reserved = self.reserved.lock();
            if !reserved.iter().any(|r| r.contains(&id)) {
                return ActorId::new(id);
            }
        }
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}
