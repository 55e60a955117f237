//! In-flight run registry.
//!
//! Tracks which run ids currently have a pipeline executing so a second enqueue of the
//! same run is a no-op. Membership is held by a [`RunGuard`] and released when it drops,
//! including on panic or early return.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct RunRegistry {
    in_flight: Arc<DashMap<String, ()>>,
}

/// Exclusive claim on a run id
pub struct RunGuard {
    run_id: String,
    in_flight: Arc<DashMap<String, ()>>,
}

impl RunGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.run_id);
    }
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `run_id`, or `None` if another pipeline already holds it.
    pub fn try_begin_exclusive(&self, run_id: &str) -> Option<RunGuard> {
        match self.in_flight.entry(run_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(RunGuard {
                    run_id: run_id.to_string(),
                    in_flight: Arc::clone(&self.in_flight),
                })
            }
        }
    }

    pub fn is_in_flight(&self, run_id: &str) -> bool {
        self.in_flight.contains_key(run_id)
    }

    /// Number of runs currently executing
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}
