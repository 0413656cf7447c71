//! Action command surface
//!
//! The flat command namespace scripts dispatch into. Commands that mutate
//! engine-owned state (variables, movement, items, spawning) apply here;
//! observable outcomes (messages, damage numbers) are recorded as
//! [`ActionEffect`]s for the surrounding engine, which owns transport and
//! combat resolution. Every command returns success/failure and a failure
//! never aborts the calling script.

use serde::Serialize;
use tracing::warn;

use wyldmud_core::{ActorId, VarScope};

use crate::world::World;

/// Observable outcome of a script command, drained by the outer engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ActionEffect {
    /// Message to everyone in a room, minus the excluded
    RoomEcho {
        room: ActorId,
        text: String,
        exclude: Vec<ActorId>,
    },
    /// Message to one entity
    Message { to: ActorId, text: String },
    Say { actor: ActorId, text: String },
    SayTo {
        actor: ActorId,
        to: ActorId,
        text: String,
    },
    Emote { actor: ActorId, text: String },
    Damage {
        actor: ActorId,
        target: ActorId,
        amount: i64,
    },
    Heal {
        actor: ActorId,
        target: ActorId,
        amount: i64,
    },
    Spawned { actor: ActorId, room: ActorId },
    Teleported { actor: ActorId, to: ActorId },
    ItemGiven {
        item: ActorId,
        from: ActorId,
        to: ActorId,
    },
    ItemTaken {
        item: ActorId,
        from: ActorId,
        by: ActorId,
    },
    Stopped { actor: ActorId },
}

impl World {
    /// Dispatch one resolved command line. Unknown commands and bad
    /// references are rejections, not errors.
    pub(crate) fn do_command(&mut self, actor: ActorId, command: &str, args: &[String]) -> bool {
        match command {
            "echo" => {
                let Some(room) = self.containing_room(actor) else {
                    return false;
                };
                self.effects.push(ActionEffect::RoomEcho {
                    room,
                    text: args.join(" "),
                    exclude: Vec::new(),
                });
                true
            }
            "echoto" => {
                let Some((target, text)) = self.target_and_text(actor, args) else {
                    return false;
                };
                self.effects.push(ActionEffect::Message { to: target, text });
                true
            }
            "echoexcept" => {
                let Some((target, text)) = self.target_and_text(actor, args) else {
                    return false;
                };
                let Some(room) = self.containing_room(actor) else {
                    return false;
                };
                self.effects.push(ActionEffect::RoomEcho {
                    room,
                    text,
                    exclude: vec![target],
                });
                true
            }
            "say" => {
                self.effects.push(ActionEffect::Say {
                    actor,
                    text: args.join(" "),
                });
                true
            }
            "sayto" => {
                let Some((target, text)) = self.target_and_text(actor, args) else {
                    return false;
                };
                self.effects.push(ActionEffect::SayTo {
                    actor,
                    to: target,
                    text,
                });
                true
            }
            "emote" => {
                self.effects.push(ActionEffect::Emote {
                    actor,
                    text: args.join(" "),
                });
                true
            }
            "settempvar" => self.set_var(VarScope::Temporary, actor, args),
            "setpermvar" => self.set_var(VarScope::Permanent, actor, args),
            "setquestvar" => {
                let Some(target) = args.first().and_then(|t| self.resolve_target(t, actor)) else {
                    return false;
                };
                let Some(name) = args.get(1) else {
                    return false;
                };
                let value = args[2..].join(" ");
                self.set_quest_var(target, name, &value);
                true
            }
            "deltempvar" => self.del_var(VarScope::Temporary, actor, args),
            "delpermvar" => self.del_var(VarScope::Permanent, actor, args),
            "delquestvar" => {
                let Some(target) = args.first().and_then(|t| self.resolve_target(t, actor)) else {
                    return false;
                };
                let Some(name) = args.get(1) else {
                    return false;
                };
                self.delete_quest_var(target, name)
            }
            "damage" => {
                let Some((target, amount)) = self.target_and_amount(actor, args) else {
                    return false;
                };
                if let Some(victim) = self.actor_mut(target) {
                    victim.hp = (victim.hp - amount).max(0);
                }
                self.effects.push(ActionEffect::Damage {
                    actor,
                    target,
                    amount,
                });
                true
            }
            "heal" => {
                let Some((target, amount)) = self.target_and_amount(actor, args) else {
                    return false;
                };
                if let Some(patient) = self.actor_mut(target) {
                    patient.hp += amount;
                }
                self.effects.push(ActionEffect::Heal {
                    actor,
                    target,
                    amount,
                });
                true
            }
            "spawn" => {
                let Some(room) = self.containing_room(actor) else {
                    return false;
                };
                let Some(kind) = args.first() else {
                    return false;
                };
                let name = args[1..].join(" ");
                if name.is_empty() {
                    return false;
                }
                let spawned = match kind.as_str() {
                    "character" => self.create_character(&name, room),
                    "object" => self.create_object(&name, Some(room)),
                    other => {
                        warn!(kind = other, "spawn with unknown kind");
                        return false;
                    }
                };
                self.effects.push(ActionEffect::Spawned {
                    actor: spawned,
                    room,
                });
                true
            }
            "teleport" | "transfer" => {
                let Some(target) = args.first().and_then(|t| self.resolve_target(t, actor)) else {
                    return false;
                };
                let Some(dest) = args.get(1).and_then(|t| self.resolve_destination(t)) else {
                    return false;
                };
                if self.move_to(target, dest).is_err() {
                    return false;
                }
                self.effects.push(ActionEffect::Teleported {
                    actor: target,
                    to: dest,
                });
                true
            }
            "give" => {
                let Some(item) = args.first().and_then(|t| self.resolve_carried(actor, t)) else {
                    return false;
                };
                let Some(to) = args.get(1).and_then(|t| self.resolve_target(t, actor)) else {
                    return false;
                };
                if self.move_to(item, to).is_err() {
                    return false;
                }
                self.effects.push(ActionEffect::ItemGiven {
                    item,
                    from: actor,
                    to,
                });
                true
            }
            "take" => {
                let Some(from) = args.get(1).and_then(|t| self.resolve_target(t, actor)) else {
                    return false;
                };
                let Some(item) = args.first().and_then(|t| self.resolve_carried(from, t)) else {
                    return false;
                };
                if self.move_to(item, actor).is_err() {
                    return false;
                }
                self.effects.push(ActionEffect::ItemTaken {
                    item,
                    from,
                    by: actor,
                });
                true
            }
            "force" => {
                let Some(target) = args.first().and_then(|t| self.resolve_target(t, actor)) else {
                    return false;
                };
                let Some(forced) = args.get(1) else {
                    return false;
                };
                let forced = forced.clone();
                self.do_command(target, &forced, &args[2..])
            }
            "stop" => {
                let target = match args.first() {
                    Some(token) => match self.resolve_target(token, actor) {
                        Some(target) => target,
                        None => return false,
                    },
                    None => actor,
                };
                self.scheduler.discard_for(target);
                self.effects.push(ActionEffect::Stopped { actor: target });
                true
            }
            other => {
                warn!(command = other, "unknown action command");
                false
            }
        }
    }

    fn set_var(&mut self, scope: VarScope, actor: ActorId, args: &[String]) -> bool {
        let Some(target) = args.first().and_then(|t| self.resolve_target(t, actor)) else {
            return false;
        };
        let Some(name) = args.get(1) else {
            return false;
        };
        self.variables().set(scope, target, name, &args[2..].join(" "));
        true
    }

    fn del_var(&mut self, scope: VarScope, actor: ActorId, args: &[String]) -> bool {
        let Some(target) = args.first().and_then(|t| self.resolve_target(t, actor)) else {
            return false;
        };
        let Some(name) = args.get(1) else {
            return false;
        };
        self.variables().delete(scope, target, name)
    }

    fn target_and_text(&self, actor: ActorId, args: &[String]) -> Option<(ActorId, String)> {
        let target = self.resolve_target(args.first()?, actor)?;
        Some((target, args[1..].join(" ")))
    }

    fn target_and_amount(&self, actor: ActorId, args: &[String]) -> Option<(ActorId, i64)> {
        let target = self.resolve_target(args.first()?, actor)?;
        let amount = args.get(1)?.trim().parse::<i64>().ok()?;
        Some((target, amount))
    }

    /// Resolve an item token within a carrier's inventory
    fn resolve_carried(&self, carrier: ActorId, token: &str) -> Option<ActorId> {
        let carrier = self.actor(carrier)?;
        carrier
            .contents
            .iter()
            .copied()
            .find(|c| {
                self.actor(*c).is_some_and(|item| {
                    item.name.eq_ignore_ascii_case(token)
                        || item.reference().to_string() == token
                })
            })
    }

    /// Destination rooms are addressed by reference only
    fn resolve_destination(&self, token: &str) -> Option<ActorId> {
        self.resolve_reference(token).map(|a| a.id)
    }
}
