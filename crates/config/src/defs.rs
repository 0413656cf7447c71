//! Zone fragment definitions
//!
//! The trigger-authoring surface: rooms, characters and objects with their
//! attached trigger definitions. The full world-definition format lives in
//! the external loader; these fragments cover the trigger-bearing subset.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_hp() -> i64 {
    10
}

/// One zone fragment file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<RoomDef>,
    #[serde(default)]
    pub characters: Vec<CharacterDef>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    #[serde(default)]
    pub quest_variables: Vec<QuestVarDef>,
}

impl ZoneDef {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDef {
    /// Definition id, referenced by characters and objects in the same zone
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDef {
    pub id: String,
    pub name: String,
    /// `he`, `she`, `they` or `it`
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub player: bool,
    #[serde(default = "default_hp")]
    pub hp: i64,
    /// Room definition id this character starts in
    pub room: String,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDef {
    pub id: String,
    pub name: String,
    /// Room definition id the object lies in
    #[serde(default)]
    pub room: Option<String>,
    /// Character definition id carrying the object
    #[serde(default)]
    pub carried_by: Option<String>,
    /// Equipment slot on the carrier, e.g. `wield`
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

/// Declarative trigger definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDef {
    /// Unique within the owning entity
    pub id: String,
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub criteria: Vec<CriterionDef>,
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionDef {
    pub subject: String,
    pub operator: String,
    pub predicate: String,
}

/// Quest variable with optional knowledge side effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestVarDef {
    /// Fully-qualified id: `zone.quest.variable`
    pub id: String,
    #[serde(default)]
    pub knowledge_updates: Vec<KnowledgeUpdateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeUpdateDef {
    /// Value that triggers these updates when the variable is set to it
    pub condition: String,
    #[serde(default)]
    pub updates: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: &str = r#"
id = "old_town"
name = "Old Town"

[[rooms]]
id = "square"
name = "Town Square"

[[rooms.triggers]]
id = "greeting"
type = "catch_say"
flags = ["requires_player_in_room"]
script = "say Welcome to the square."

[[rooms.triggers.criteria]]
subject = "%*%"
operator = "contains"
predicate = "hello"

[[characters]]
id = "guard"
name = "town guard"
pronouns = "she"
room = "square"

[[characters.triggers]]
id = "patrol"
type = "timer_tick"

[[characters.triggers.criteria]]
subject = "%time_elapsed%"
operator = "numgte"
predicate = "30"

[[objects]]
id = "lantern"
name = "brass lantern"
room = "square"

[[quest_variables]]
id = "old_town.murder_mystery.found_body"

[[quest_variables.knowledge_updates]]
condition = "true"
updates = { town_rumors = "A body was found near the square." }
"#;

    #[test]
    fn test_parse_zone_fragment() {
        let zone = ZoneDef::from_toml(ZONE).unwrap();
        assert_eq!(zone.id, "old_town");
        assert_eq!(zone.rooms.len(), 1);
        let room = &zone.rooms[0];
        assert_eq!(room.triggers.len(), 1);
        assert_eq!(room.triggers[0].trigger_type, "catch_say");
        assert_eq!(room.triggers[0].criteria[0].operator, "contains");
        assert_eq!(zone.characters[0].room, "square");
        assert_eq!(zone.quest_variables[0].knowledge_updates[0].condition, "true");
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(ZoneDef::from_toml("id = ").is_err());
    }
}
