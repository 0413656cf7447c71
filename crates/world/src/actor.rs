//! Trigger-owning entities
//!
//! Rooms, characters and objects share one representation; the kind decides
//! which fields matter. Triggers are owned exclusively by their actor and
//! die with it.

use std::collections::HashMap;

use wyldmud_core::{ActorId, ActorKind, ActorRef, Pronouns};

use crate::trigger::Trigger;

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub name: String,
    pub pronouns: Pronouns,
    /// Characters only; presence flags look for these
    pub is_player: bool,
    pub hp: i64,
    /// Containing room (characters, objects) or carrier (carried objects);
    /// rooms have no location
    pub location: Option<ActorId>,
    /// Occupants for rooms, inventory for characters
    pub contents: Vec<ActorId>,
    /// Equipped objects by slot name
    pub equipment: HashMap<String, ActorId>,
    /// Zone id; meaningful on rooms
    pub zone: String,
    pub triggers: Vec<Trigger>,
}

impl Actor {
    fn new(id: ActorId, kind: ActorKind, name: &str) -> Self {
        Self {
            id,
            kind,
            name: name.to_string(),
            pronouns: Pronouns::default(),
            is_player: false,
            hp: 10,
            location: None,
            contents: Vec::new(),
            equipment: HashMap::new(),
            zone: String::new(),
            triggers: Vec::new(),
        }
    }

    pub fn room(id: ActorId, name: &str, zone: &str) -> Self {
        let mut actor = Self::new(id, ActorKind::Room, name);
        actor.zone = zone.to_string();
        actor
    }

    pub fn character(id: ActorId, name: &str) -> Self {
        Self::new(id, ActorKind::Character, name)
    }

    pub fn object(id: ActorId, name: &str) -> Self {
        Self::new(id, ActorKind::Object, name)
    }

    pub fn with_pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn as_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn reference(&self) -> ActorRef {
        ActorRef::new(self.kind, self.id)
    }

    /// Find a trigger by its owner-unique id
    pub fn trigger(&self, id: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_matches_kind() {
        let room = Actor::room(ActorId::new(1), "square", "old_town");
        assert_eq!(room.reference().to_string(), "@R1");
        let who = Actor::character(ActorId::new(2), "guard");
        assert_eq!(who.reference().to_string(), "@C2");
    }
}
