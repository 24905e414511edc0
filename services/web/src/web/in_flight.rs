//! services/web/src/web/in_flight.rs
//!
//! Tracks which generation flows a user currently has outstanding. Each
//! (user, flow) pair is tracked separately, so a pending email response never
//! blocks the enhancement form and vice versa.

use clearcom_core::domain::Flow;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

type Key = (Uuid, Flow);

#[derive(Clone, Default)]
pub struct InFlightRegistry {
    active: Arc<Mutex<HashSet<Key>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Key>> {
        // The set stays consistent even if a holder panicked mid-insert.
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks the flow as running. `None` if it already is.
    pub fn try_acquire(&self, user_id: Uuid, flow: Flow) -> Option<InFlightGuard> {
        if self.lock().insert((user_id, flow)) {
            Some(InFlightGuard {
                registry: self.clone(),
                key: (user_id, flow),
            })
        } else {
            None
        }
    }

    pub fn is_active(&self, user_id: Uuid, flow: Flow) -> bool {
        self.lock().contains(&(user_id, flow))
    }
}

/// Clears the in-flight mark when dropped, whether the request succeeded,
/// failed, or its future was abandoned.
pub struct InFlightGuard {
    registry: InFlightRegistry,
    key: Key,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}
