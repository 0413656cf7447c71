//! Scoped variable store
//!
//! Variables live outside the actors as (scope, owner, name) → value, with
//! the owner an opaque id rather than a live reference, so a destroyed
//! entity leaves nothing dangling. Last write wins; a missing key reads as
//! absent and callers substitute their empty default.

use std::collections::BTreeMap;

use dashmap::DashMap;

use wyldmud_core::{ActorId, VarScope};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VarKey {
    scope: VarScope,
    owner: ActorId,
    name: String,
}

/// All temporary, permanent and quest variables in the world
#[derive(Debug, Default)]
pub struct VariableStore {
    entries: DashMap<VarKey, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, scope: VarScope, owner: ActorId, name: &str, value: &str) {
        self.entries.insert(
            VarKey {
                scope,
                owner,
                name: name.to_string(),
            },
            value.to_string(),
        );
    }

    pub fn get(&self, scope: VarScope, owner: ActorId, name: &str) -> Option<String> {
        self.entries
            .get(&VarKey {
                scope,
                owner,
                name: name.to_string(),
            })
            .map(|entry| entry.clone())
    }

    pub fn delete(&self, scope: VarScope, owner: ActorId, name: &str) -> bool {
        self.entries
            .remove(&VarKey {
                scope,
                owner,
                name: name.to_string(),
            })
            .is_some()
    }

    /// Drop every variable of a destroyed or unloaded owner
    pub fn purge_owner(&self, owner: ActorId) {
        self.entries.retain(|key, _| key.owner != owner);
    }

    /// Temporary and permanent variables merged for context binding,
    /// permanent winning on name collisions. Sorted for determinism.
    pub fn context_vars(&self, owner: ActorId) -> Vec<(String, String)> {
        let mut merged = BTreeMap::new();
        for scope in [VarScope::Temporary, VarScope::Permanent] {
            for entry in self.entries.iter() {
                if entry.key().scope == scope && entry.key().owner == owner {
                    merged.insert(entry.key().name.clone(), entry.value().clone());
                }
            }
        }
        merged.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
