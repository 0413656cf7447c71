//! Inbound game events
//!
//! Event producers (movement, speech parsing, item transfer, the periodic
//! loop) live in the surrounding engine; this is the contract they speak.

use wyldmud_core::ActorId;

use crate::trigger::TriggerType;

/// One dispatched event
#[derive(Debug, Clone)]
pub struct GameEvent {
    pub trigger_type: TriggerType,
    /// Primary entity: the room for broadcast events, otherwise the entity
    /// whose triggers are considered
    pub owner: ActorId,
    /// The entity that caused the event
    pub subject: Option<ActorId>,
    pub target: Option<ActorId>,
    /// Raw event text, exposed to scripts as `%*%`
    pub text: String,
}

impl GameEvent {
    pub fn new(trigger_type: TriggerType, owner: ActorId) -> Self {
        Self {
            trigger_type,
            owner,
            subject: None,
            target: None,
            text: String::new(),
        }
    }

    pub fn with_subject(mut self, subject: ActorId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Room-wide speech
    pub fn say(room: ActorId, speaker: ActorId, text: &str) -> Self {
        Self::new(TriggerType::CatchSay, room)
            .with_subject(speaker)
            .with_text(text)
    }

    /// Someone entered the room
    pub fn enter(room: ActorId, mover: ActorId) -> Self {
        Self::new(TriggerType::OnEnter, room).with_subject(mover)
    }

    /// Someone left the room
    pub fn exit(room: ActorId, mover: ActorId) -> Self {
        Self::new(TriggerType::OnExit, room).with_subject(mover)
    }

    /// An entity was examined
    pub fn look(owner: ActorId, looker: ActorId) -> Self {
        Self::new(TriggerType::CatchLook, owner).with_subject(looker)
    }

    /// An entity came under attack
    pub fn attacked(victim: ActorId, attacker: ActorId) -> Self {
        Self::new(TriggerType::OnAttacked, victim).with_subject(attacker)
    }
}
