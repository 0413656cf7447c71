//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix for stable entity references embedded in script text
pub const REFERENCE_SYMBOL: char = '@';

/// Actor ID (64-bit, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl ActorId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three kinds of trigger-owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Room,
    Character,
    Object,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Character => "character",
            Self::Object => "object",
        }
    }

    /// Single-letter tag used in reference strings
    pub fn letter(&self) -> char {
        match self {
            Self::Room => 'R',
            Self::Character => 'C',
            Self::Object => 'O',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Room),
            'C' => Some(Self::Character),
            'O' => Some(Self::Object),
            _ => None,
        }
    }
}

/// Stable textual handle for an actor, e.g. `@C42`
///
/// References are the only way script text names an entity; they stay
/// parseable after the entity is destroyed so lookups can fail soft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorRef {
    pub kind: ActorKind,
    pub id: ActorId,
}

impl ActorRef {
    pub fn new(kind: ActorKind, id: ActorId) -> Self {
        Self { kind, id }
    }

    /// Parse a reference string of the form `@C42`
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        if chars.next()? != REFERENCE_SYMBOL {
            return None;
        }
        let kind = ActorKind::from_letter(chars.next()?)?;
        let id: u64 = chars.as_str().parse().ok()?;
        Some(Self::new(kind, ActorId::new(id)))
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", REFERENCE_SYMBOL, self.kind.letter(), self.id)
    }
}

/// Persisted variable scopes. System variables are derived per firing and
/// never stored, so they have no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarScope {
    Temporary,
    Permanent,
    Quest,
}

impl VarScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temporary => "temporary",
            Self::Permanent => "permanent",
            Self::Quest => "quest",
        }
    }
}

/// Pronoun set for an actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronouns {
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl Pronouns {
    pub fn new(subject: &str, object: &str, possessive: &str) -> Self {
        Self {
            subject: subject.to_string(),
            object: object.to_string(),
            possessive: possessive.to_string(),
        }
    }

    pub fn he() -> Self {
        Self::new("he", "him", "his")
    }

    pub fn she() -> Self {
        Self::new("she", "her", "her")
    }

    pub fn they() -> Self {
        Self::new("they", "them", "their")
    }

    pub fn it() -> Self {
        Self::new("it", "it", "its")
    }
}

impl Default for Pronouns {
    fn default() -> Self {
        Self::it()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_roundtrip() {
        let r = ActorRef::new(ActorKind::Character, ActorId::new(42));
        assert_eq!(r.to_string(), "@C42");
        assert_eq!(ActorRef::parse("@C42"), Some(r));
    }

    #[test]
    fn test_reference_parse_rejects_garbage() {
        assert!(ActorRef::parse("C42").is_none());
        assert!(ActorRef::parse("@X42").is_none());
        assert!(ActorRef::parse("@C").is_none());
        assert!(ActorRef::parse("@Cforty").is_none());
    }
}
