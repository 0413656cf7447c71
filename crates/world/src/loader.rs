//! Zone fragment loading
//!
//! Compiles declarative definitions into live actors and triggers. The
//! error policy follows the engine contract: a structurally broken trigger
//! definition (unknown operator or flag, unbalanced script braces, bad
//! static pattern) produces a disabled trigger instead of corrupted logic,
//! and the rest of the zone loads normally.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use wyldmud_core::{ActorId, Pronouns};
use wyldmud_config::{TriggerDef, ZoneDef};
use wyldmud_scripting::{Criterion, CriterionOp, Pattern, Script};

use crate::error::{Result, WorldError};
use crate::quest::KnowledgeUpdate;
use crate::trigger::{Trigger, TriggerFlags, TriggerType};
use crate::world::World;

/// Definition-id → runtime-id maps for one loaded zone
#[derive(Debug, Default)]
pub struct ZoneIndex {
    pub zone: String,
    pub rooms: HashMap<String, ActorId>,
    pub characters: HashMap<String, ActorId>,
    pub objects: HashMap<String, ActorId>,
}

/// Load a zone fragment into the world.
///
/// Fails only on zone-level wiring problems (a character placed in a room
/// that does not exist); trigger-level problems degrade per trigger.
pub fn load_zone(world: &mut World, def: &ZoneDef) -> Result<ZoneIndex> {
    let mut index = ZoneIndex {
        zone: def.id.clone(),
        ..ZoneIndex::default()
    };

    for quest_var in &def.quest_variables {
        let updates = quest_var
            .knowledge_updates
            .iter()
            .map(|ku| KnowledgeUpdate {
                condition: ku.condition.clone(),
                updates: ku.updates.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            })
            .collect();
        world.register_quest_var(&quest_var.id, updates);
    }

    for room_def in &def.rooms {
        let id = world.create_room(&room_def.name, &def.id);
        attach_triggers(world, id, &room_def.triggers);
        if index.rooms.insert(room_def.id.clone(), id).is_some() {
            warn!(zone = %def.id, room = %room_def.id, "duplicate room definition id");
        }
    }

    for char_def in &def.characters {
        let room = *index
            .rooms
            .get(&char_def.room)
            .ok_or_else(|| WorldError::UnknownRoom(char_def.room.clone()))?;
        let id = world.create_character(&char_def.name, room);
        if let Some(actor) = world.actor_mut(id) {
            actor.is_player = char_def.player;
            actor.hp = char_def.hp;
            actor.pronouns = parse_pronouns(char_def.pronouns.as_deref());
        }
        attach_triggers(world, id, &char_def.triggers);
        index.characters.insert(char_def.id.clone(), id);
    }

    for obj_def in &def.objects {
        let holder = match (&obj_def.carried_by, &obj_def.room) {
            (Some(carrier), _) => Some(
                *index
                    .characters
                    .get(carrier)
                    .ok_or_else(|| WorldError::InvalidDefinition(format!(
                        "object {} carried by unknown character {}",
                        obj_def.id, carrier
                    )))?,
            ),
            (None, Some(room)) => Some(
                *index
                    .rooms
                    .get(room)
                    .ok_or_else(|| WorldError::UnknownRoom(room.clone()))?,
            ),
            (None, None) => None,
        };
        let id = world.create_object(&obj_def.name, holder);
        if let (Some(slot), Some(carrier)) = (&obj_def.slot, holder) {
            world.equip(carrier, slot, id);
        }
        attach_triggers(world, id, &obj_def.triggers);
        index.objects.insert(obj_def.id.clone(), id);
    }

    Ok(index)
}

fn attach_triggers(world: &mut World, owner: ActorId, defs: &[TriggerDef]) {
    for def in defs {
        if let Some(trigger) = compile_trigger(def) {
            world.add_trigger(owner, trigger);
        }
    }
}

/// Compile one trigger definition. Returns `None` only when the type
/// itself is unknown (nothing to bucket it under); every other structural
/// error yields a disabled trigger that stays visible for diagnostics.
pub fn compile_trigger(def: &TriggerDef) -> Option<Trigger> {
    let trigger_type = match TriggerType::from_str(&def.trigger_type) {
        Ok(t) => t,
        Err(err) => {
            warn!(trigger = %def.id, %err, "skipping trigger");
            return None;
        }
    };

    let mut flags = TriggerFlags::empty();
    for name in &def.flags {
        match TriggerFlags::from_name(name) {
            Ok(flag) => flags |= flag,
            Err(err) => {
                warn!(trigger = %def.id, %err, "disabling trigger");
                return Some(Trigger::disabled(&def.id, trigger_type));
            }
        }
    }

    let mut criteria = Vec::with_capacity(def.criteria.len());
    for crit in &def.criteria {
        let operator = match CriterionOp::from_str(&crit.operator) {
            Ok(op) => op,
            Err(err) => {
                warn!(trigger = %def.id, %err, "disabling trigger");
                return Some(Trigger::disabled(&def.id, trigger_type));
            }
        };
        if operator == CriterionOp::Contains && !has_dynamic_parts(&crit.predicate) {
            if let Err(err) = Pattern::parse(&crit.predicate) {
                warn!(trigger = %def.id, %err, "disabling trigger");
                return Some(Trigger::disabled(&def.id, trigger_type));
            }
        }
        criteria.push(Criterion::new(&crit.subject, operator, &crit.predicate));
    }

    let script = match Script::parse(&def.script) {
        Ok(script) => script,
        Err(err) => {
            warn!(trigger = %def.id, %err, "disabling trigger");
            return Some(Trigger::disabled(&def.id, trigger_type));
        }
    };

    Some(
        Trigger::new(&def.id, trigger_type, script)
            .with_flags(flags)
            .with_criteria(criteria),
    )
}

fn has_dynamic_parts(text: &str) -> bool {
    text.contains('%') || text.contains('$')
}

fn parse_pronouns(spec: Option<&str>) -> Pronouns {
    match spec {
        None => Pronouns::default(),
        Some("he") => Pronouns::he(),
        Some("she") => Pronouns::she(),
        Some("they") => Pronouns::they(),
        Some("it") => Pronouns::it(),
        Some(other) => {
            warn!(pronouns = other, "unknown pronoun set, using default");
            Pronouns::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wyldmud_config::CriterionDef;

    fn trigger_def(script: &str) -> TriggerDef {
        TriggerDef {
            id: "t1".into(),
            trigger_type: "catch_say".into(),
            flags: Vec::new(),
            criteria: Vec::new(),
            script: script.into(),
        }
    }

    #[test]
    fn test_compile_plain_trigger() {
        let trigger = compile_trigger(&trigger_def("say hi")).unwrap();
        assert!(trigger.enabled);
        assert_eq!(trigger.trigger_type, TriggerType::CatchSay);
    }

    #[test]
    fn test_unknown_type_skipped() {
        let mut def = trigger_def("say hi");
        def.trigger_type = "catch_sneeze".into();
        assert!(compile_trigger(&def).is_none());
    }

    #[test]
    fn test_bad_script_disables() {
        let trigger = compile_trigger(&trigger_def("$if(1, numeq, 1) { say hi")).unwrap();
        assert!(!trigger.enabled);
    }

    #[test]
    fn test_bad_operator_disables() {
        let mut def = trigger_def("say hi");
        def.criteria.push(CriterionDef {
            subject: "%*%".into(),
            operator: "sortof".into(),
            predicate: "x".into(),
        });
        assert!(!compile_trigger(&def).unwrap().enabled);
    }

    #[test]
    fn test_bad_static_pattern_disables() {
        let mut def = trigger_def("say hi");
        def.criteria.push(CriterionDef {
            subject: "%*%".into(),
            operator: "contains".into(),
            predicate: "(a|b".into(),
        });
        assert!(!compile_trigger(&def).unwrap().enabled);
    }

    #[test]
    fn test_dynamic_pattern_deferred() {
        let mut def = trigger_def("say hi");
        def.criteria.push(CriterionDef {
            subject: "%*%".into(),
            operator: "contains".into(),
            predicate: "%a.watchword%".into(),
        });
        assert!(compile_trigger(&def).unwrap().enabled);
    }

    #[test]
    fn test_unknown_flag_disables() {
        let mut def = trigger_def("say hi");
        def.flags.push("requires_luck".into());
        assert!(!compile_trigger(&def).unwrap().enabled);
    }

    #[test]
    fn test_load_zone_wires_entities() {
        let zone = ZoneDef::from_toml(
            r#"
id = "old_town"

[[rooms]]
id = "square"
name = "Town Square"

[[characters]]
id = "guard"
name = "town guard"
room = "square"

[[objects]]
id = "sword"
name = "iron sword"
carried_by = "guard"
slot = "wield"
"#,
        )
        .unwrap();
        let mut world = World::new();
        let index = load_zone(&mut world, &zone).unwrap();
        let guard = index.characters["guard"];
        let room = index.rooms["square"];
        assert_eq!(world.actor(guard).unwrap().location, Some(room));
        let sword = index.objects["sword"];
        assert_eq!(
            world.actor(guard).unwrap().equipment.get("wield"),
            Some(&sword)
        );
    }

    #[test]
    fn test_load_zone_unknown_room_fails() {
        let zone = ZoneDef::from_toml(
            r#"
id = "z"
[[characters]]
id = "c"
name = "lost soul"
room = "nowhere"
"#,
        )
        .unwrap();
        let mut world = World::new();
        assert!(matches!(
            load_zone(&mut world, &zone),
            Err(WorldError::UnknownRoom(_))
        ));
    }
}
