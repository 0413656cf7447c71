//! Quest variables and knowledge side effects
//!
//! Quest variables are permanent variables namespaced
//! `zone.quest.variable`. A schema may attach knowledge updates to a
//! variable: when a set matches an update's condition value, the listed
//! knowledge entries are recorded on the owner.

use std::collections::HashMap;

/// One conditional knowledge update
#[derive(Debug, Clone)]
pub struct KnowledgeUpdate {
    /// Variable value that activates the update
    pub condition: String,
    /// knowledge id → content
    pub updates: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
struct QuestVarRules {
    knowledge_updates: Vec<KnowledgeUpdate>,
}

/// Registered quest variables, keyed by fully-qualified id
#[derive(Debug, Default)]
pub struct QuestSchema {
    vars: HashMap<String, QuestVarRules>,
}

impl QuestSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, knowledge_updates: Vec<KnowledgeUpdate>) {
        self.vars
            .insert(id.to_string(), QuestVarRules { knowledge_updates });
    }

    /// Knowledge entries activated by setting `id` to `value`
    pub fn updates_for(&self, id: &str, value: &str) -> Vec<(String, String)> {
        let Some(rules) = self.vars.get(id) else {
            return Vec::new();
        };
        rules
            .knowledge_updates
            .iter()
            .filter(|ku| ku.condition == value)
            .flat_map(|ku| ku.updates.iter().cloned())
            .collect()
    }
}

/// Resolve a quest variable id against the owner's zone.
///
/// A fully-qualified id (`zone.quest.variable`, three or more parts) passes
/// through; a local id (`quest.variable`) is prefixed with the zone.
pub fn resolve_quest_id(zone: &str, var_id: &str) -> String {
    if zone.is_empty() || var_id.split('.').count() >= 3 {
        var_id.to_string()
    } else {
        format!("{}.{}", zone, var_id)
    }
}
