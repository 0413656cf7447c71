//! Per-firing execution context
//!
//! One [`ExecutionContext`] is built for every trigger firing and dropped
//! when the run completes. It snapshots the identity of the trigger owner,
//! the event causer and an optional target, and derives the system variable
//! map the resolver works from. Contexts are never persisted.

use std::collections::HashMap;

use wyldmud_core::{ActorId, ActorKind, ActorRef, Pronouns};

/// Variables visible to one script run, keyed by placeholder name
#[derive(Debug, Clone, Default)]
pub struct VarMap {
    entries: HashMap<String, String>,
}

impl VarMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of one actor's identity for variable derivation
#[derive(Debug, Clone)]
pub struct ActorBinding {
    pub id: ActorId,
    pub kind: ActorKind,
    pub name: String,
    pub pronouns: Pronouns,
    /// Temporary + permanent variables of this actor at firing time,
    /// merged under the binding's prefix (e.g. `a.mood`)
    pub vars: Vec<(String, String)>,
}

impl ActorBinding {
    pub fn new(id: ActorId, kind: ActorKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            pronouns: Pronouns::default(),
            vars: Vec::new(),
        }
    }

    pub fn with_pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn with_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.vars = vars;
        self
    }

    pub fn reference(&self) -> ActorRef {
        ActorRef::new(self.kind, self.id)
    }
}

/// Transient binding for one trigger firing
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// The trigger owner running the script
    pub actor: ActorBinding,
    /// The entity that caused the event, if any
    pub subject: Option<ActorBinding>,
    /// Optional event target
    pub target: Option<ActorBinding>,
    /// Raw event text
    pub event_text: String,
    /// Accumulated timer units, timer-tick firings only
    pub time_elapsed: Option<f64>,
}

impl ExecutionContext {
    pub fn new(actor: ActorBinding) -> Self {
        Self {
            actor,
            subject: None,
            target: None,
            event_text: String::new(),
            time_elapsed: None,
        }
    }

    pub fn with_subject(mut self, subject: ActorBinding) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_target(mut self, target: ActorBinding) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.event_text = text.into();
        self
    }

    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.time_elapsed = Some(elapsed);
        self
    }

    /// Derive the system variable map for this firing.
    ///
    /// Letter keys follow the authoring convention: lowercase for names and
    /// subject pronouns, uppercase for references and object pronouns,
    /// doubled letters for possessives, `*` for the raw event text.
    pub fn var_map(&self) -> VarMap {
        let mut map = VarMap::new();
        map.insert("*", self.event_text.clone());
        bind(&mut map, ["a", "A", "p", "P", "pp"], &self.actor);
        if let Some(subject) = &self.subject {
            bind(&mut map, ["s", "S", "q", "Q", "qq"], subject);
        }
        if let Some(target) = &self.target {
            bind(&mut map, ["t", "T", "r", "R", "rr"], target);
        }
        if let Some(elapsed) = self.time_elapsed {
            map.insert("time_elapsed", format_units(elapsed));
        }
        map
    }
}

fn bind(map: &mut VarMap, keys: [&str; 5], binding: &ActorBinding) {
    let [name, reference, subj, obj, poss] = keys;
    map.insert(name, binding.name.clone());
    map.insert(reference, binding.reference().to_string());
    map.insert(subj, binding.pronouns.subject.clone());
    map.insert(obj, binding.pronouns.object.clone());
    map.insert(poss, binding.pronouns.possessive.clone());
    for (var, value) in &binding.vars {
        map.insert(format!("{}.{}", name, var), value.clone());
    }
}

fn format_units(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
