//! The live world: actors, trigger dispatch and the tick loop
//!
//! One `World` is mutated only from the cooperative game loop. An event
//! walks the matching trigger buckets in a stable order; each fired script
//! runs to completion or its next suspension before the next candidate is
//! considered, so no trigger ever observes a sibling mid-statement.

use std::collections::BTreeMap;

use dashmap::DashMap;
use tracing::{debug, warn};

use wyldmud_core::{ActorId, ActorKind, ActorRef, Pronouns, ReferenceGenerator, VarScope};
use wyldmud_scripting::{
    ActorBinding, ExecutionContext, RunState, Script, ScriptHost, ScriptRun, WorldQuery,
};

use crate::actions::ActionEffect;
use crate::actor::Actor;
use crate::events::GameEvent;
use crate::quest::{resolve_quest_id, QuestSchema};
use crate::scheduler::Scheduler;
use crate::trigger::{Trigger, TriggerFlags, TriggerType};
use crate::vars::VariableStore;

/// Containment chains are short (object → character → room); anything
/// longer indicates a cycle from bad data.
const MAX_CONTAINMENT_DEPTH: usize = 8;

pub struct World {
    /// BTreeMap keeps iteration in allocation order, which makes timer
    /// processing deterministic across runs
    actors: BTreeMap<ActorId, Actor>,
    refgen: ReferenceGenerator,
    vars: VariableStore,
    quests: QuestSchema,
    knowledge: DashMap<(ActorId, String), String>,
    pub(crate) scheduler: Scheduler,
    clock: f64,
    pause_ceiling: f64,
    pub(crate) effects: Vec<ActionEffect>,
}

impl World {
    pub fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
            refgen: ReferenceGenerator::new(),
            vars: VariableStore::new(),
            quests: QuestSchema::new(),
            knowledge: DashMap::new(),
            scheduler: Scheduler::new(),
            clock: 0.0,
            pause_ceiling: 60.0,
            effects: Vec::new(),
        }
    }

    pub fn with_pause_ceiling(mut self, ceiling: f64) -> Self {
        self.pause_ceiling = ceiling;
        self
    }

    // ---- actor management ----

    pub fn create_room(&mut self, name: &str, zone: &str) -> ActorId {
        let id = self.refgen.allocate();
        self.actors.insert(id, Actor::room(id, name, zone));
        id
    }

    pub fn create_character(&mut self, name: &str, room: ActorId) -> ActorId {
        let id = self.refgen.allocate();
        let mut actor = Actor::character(id, name);
        actor.location = Some(room);
        self.actors.insert(id, actor);
        if let Some(room) = self.actors.get_mut(&room) {
            room.contents.push(id);
        }
        id
    }

    pub fn create_object(&mut self, name: &str, holder: Option<ActorId>) -> ActorId {
        let id = self.refgen.allocate();
        let mut actor = Actor::object(id, name);
        actor.location = holder;
        self.actors.insert(id, actor);
        if let Some(holder) = holder.and_then(|h| self.actors.get_mut(&h)) {
            holder.contents.push(id);
        }
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn add_trigger(&mut self, owner: ActorId, trigger: Trigger) {
        let Some(actor) = self.actors.get_mut(&owner) else {
            warn!(%owner, "add_trigger on unknown actor");
            return;
        };
        if actor.triggers.iter().any(|t| t.id == trigger.id) {
            warn!(%owner, trigger = %trigger.id, "duplicate trigger id, skipping");
            return;
        }
        actor.triggers.push(trigger);
    }

    /// Destroy an actor: detach it, orphan its contents, drop its
    /// variables and discard its pending script resumes.
    pub fn destroy(&mut self, id: ActorId) {
        let Some(actor) = self.actors.remove(&id) else {
            return;
        };
        if let Some(parent) = actor.location.and_then(|l| self.actors.get_mut(&l)) {
            parent.contents.retain(|c| *c != id);
        }
        for child in actor.contents {
            if let Some(child) = self.actors.get_mut(&child) {
                child.location = None;
            }
        }
        self.vars.purge_owner(id);
        self.knowledge.retain(|(owner, _), _| *owner != id);
        let dropped = self.scheduler.discard_for(id);
        if dropped > 0 {
            debug!(%id, dropped, "discarded pending resumes of destroyed actor");
        }
    }

    /// Move a character or object into a room or container. Does not emit
    /// enter/exit events; producing those is the caller's job.
    pub fn move_to(&mut self, id: ActorId, dest: ActorId) -> crate::Result<()> {
        if !self.actors.contains_key(&dest) {
            return Err(crate::WorldError::UnknownActor(dest));
        }
        let old = {
            let actor = self
                .actors
                .get_mut(&id)
                .ok_or(crate::WorldError::UnknownActor(id))?;
            std::mem::replace(&mut actor.location, Some(dest))
        };
        if let Some(old) = old.and_then(|o| self.actors.get_mut(&o)) {
            old.contents.retain(|c| *c != id);
        }
        if let Some(dest) = self.actors.get_mut(&dest) {
            dest.contents.push(id);
        }
        Ok(())
    }

    /// Move an object from a character's inventory into an equipment slot
    pub fn equip(&mut self, who: ActorId, slot: &str, item: ActorId) {
        if let Some(actor) = self.actors.get_mut(&who) {
            actor.contents.retain(|c| *c != item);
            actor.equipment.insert(slot.to_string(), item);
        }
    }

    // ---- presence and containment ----

    /// Room an actor is in: itself for rooms, otherwise the containment
    /// chain is chased upward.
    pub fn containing_room(&self, id: ActorId) -> Option<ActorId> {
        let mut current = id;
        for _ in 0..MAX_CONTAINMENT_DEPTH {
            let actor = self.actors.get(&current)?;
            if actor.kind == ActorKind::Room {
                return Some(current);
            }
            current = actor.location?;
        }
        None
    }

    pub fn any_player_in_room(&self, room: ActorId) -> bool {
        self.actors.get(&room).is_some_and(|room| {
            room.contents
                .iter()
                .any(|c| self.actors.get(c).is_some_and(|a| a.is_player))
        })
    }

    pub fn any_player_in_zone(&self, zone: &str) -> bool {
        self.actors.values().any(|a| {
            a.is_player
                && self
                    .containing_room(a.id)
                    .and_then(|r| self.actors.get(&r))
                    .is_some_and(|r| r.zone == zone)
        })
    }

    /// Presence flags short-circuit firing when no player could observe
    /// the effect.
    fn presence_ok(&self, owner: ActorId, flags: TriggerFlags) -> bool {
        if flags.contains(TriggerFlags::REQUIRES_PLAYER_IN_ROOM) {
            let in_room = self
                .containing_room(owner)
                .is_some_and(|r| self.any_player_in_room(r));
            if !in_room {
                return false;
            }
        }
        if flags.contains(TriggerFlags::REQUIRES_PLAYER_IN_ZONE) {
            let in_zone = self
                .containing_room(owner)
                .and_then(|r| self.actors.get(&r))
                .is_some_and(|r| self.any_player_in_zone(&r.zone));
            if !in_zone {
                return false;
            }
        }
        true
    }

    // ---- context building ----

    fn binding(&self, id: ActorId) -> Option<ActorBinding> {
        let actor = self.actors.get(&id)?;
        Some(
            ActorBinding::new(id, actor.kind, actor.name.as_str())
                .with_pronouns(actor.pronouns.clone())
                .with_vars(self.vars.context_vars(id)),
        )
    }

    fn build_context(
        &self,
        owner: ActorId,
        event: &GameEvent,
        elapsed: Option<f64>,
    ) -> Option<ExecutionContext> {
        let mut ctx = ExecutionContext::new(self.binding(owner)?).with_text(&event.text);
        if let Some(subject) = event.subject.and_then(|s| self.binding(s)) {
            ctx = ctx.with_subject(subject);
        }
        if let Some(target) = event.target.and_then(|t| self.binding(t)) {
            ctx = ctx.with_target(target);
        }
        if let Some(elapsed) = elapsed {
            ctx = ctx.with_elapsed(elapsed);
        }
        Some(ctx)
    }

    // ---- dispatch ----

    /// Entities that perceive an event: for broadcasts, the room's
    /// occupants (except the causer) and then the room itself; otherwise
    /// just the primary entity.
    fn recipients(&self, event: &GameEvent) -> Vec<ActorId> {
        if !event.trigger_type.is_broadcast() {
            return vec![event.owner];
        }
        let Some(room) = self.actors.get(&event.owner) else {
            return Vec::new();
        };
        let mut out: Vec<ActorId> = room
            .contents
            .iter()
            .copied()
            .filter(|c| Some(*c) != event.subject)
            .collect();
        out.push(event.owner);
        out
    }

    /// Dispatch one event: candidates are evaluated and fired in
    /// definition order, and a fired script's side effects are visible to
    /// the candidates after it. Returns how many triggers fired.
    pub fn dispatch(&mut self, event: &GameEvent) -> usize {
        let recipients = self.recipients(event);
        let mut fired = 0;
        for recipient in recipients {
            let count = match self.actors.get(&recipient) {
                Some(actor) => actor.triggers.len(),
                None => continue,
            };
            for index in 0..count {
                let prepared = self.prepare(recipient, index, event);
                if let Some((script, ctx)) = prepared {
                    fired += 1;
                    self.run_script(&script, ctx);
                }
            }
        }
        debug!(event = %event.trigger_type, fired, "event dispatched");
        fired
    }

    /// Flag and criteria gauntlet for one candidate trigger. Immutable so
    /// the world stays readable for queries during evaluation.
    fn prepare(
        &self,
        owner: ActorId,
        index: usize,
        event: &GameEvent,
    ) -> Option<(Script, ExecutionContext)> {
        let actor = self.actors.get(&owner)?;
        let trigger = actor.triggers.get(index)?;
        if trigger.trigger_type != event.trigger_type || !trigger.enabled {
            return None;
        }
        if !self.presence_ok(owner, trigger.flags) {
            return None;
        }
        let ctx = self.build_context(owner, event, None)?;
        let vars = ctx.var_map();
        if !trigger.criteria.iter().all(|c| c.evaluate(&vars, self)) {
            return None;
        }
        Some(((*trigger.script).clone(), ctx))
    }

    fn run_script(&mut self, script: &Script, ctx: ExecutionContext) {
        let mut run = ScriptRun::new(script, ctx);
        run.resume(&mut *self);
        if matches!(run.state(), RunState::Suspended { .. }) {
            self.scheduler.park(run);
        }
    }

    // ---- the tick ----

    /// One cooperative tick: advance timer triggers, then resume due
    /// suspensions.
    pub fn tick(&mut self, dt: f64) {
        self.clock += dt;
        self.advance_timers(dt);
        self.resume_due();
    }

    fn advance_timers(&mut self, dt: f64) {
        let ids: Vec<ActorId> = self.actors.keys().copied().collect();
        for owner in ids {
            let count = match self.actors.get(&owner) {
                Some(actor) => actor.triggers.len(),
                None => continue,
            };
            for index in 0..count {
                let flags = {
                    let Some(actor) = self.actors.get_mut(&owner) else {
                        break;
                    };
                    let Some(trigger) = actor.triggers.get_mut(index) else {
                        break;
                    };
                    if trigger.trigger_type != TriggerType::TimerTick || !trigger.enabled {
                        continue;
                    }
                    trigger.elapsed += dt;
                    trigger.flags
                };
                // a gated skip accumulates instead of resetting, so the
                // trigger does not burst-fire once a player shows up
                if !self.presence_ok(owner, flags) {
                    continue;
                }
                let prepared = {
                    let Some(actor) = self.actors.get(&owner) else {
                        break;
                    };
                    let Some(trigger) = actor.triggers.get(index) else {
                        break;
                    };
                    let event = GameEvent::new(TriggerType::TimerTick, owner);
                    match self.build_context(owner, &event, Some(trigger.elapsed)) {
                        Some(ctx) => {
                            let vars = ctx.var_map();
                            trigger
                                .criteria
                                .iter()
                                .all(|c| c.evaluate(&vars, self))
                                .then(|| ((*trigger.script).clone(), ctx))
                        }
                        None => None,
                    }
                };
                if let Some((script, ctx)) = prepared {
                    if let Some(trigger) = self
                        .actors
                        .get_mut(&owner)
                        .and_then(|a| a.triggers.get_mut(index))
                    {
                        trigger.elapsed = 0.0;
                    }
                    self.run_script(&script, ctx);
                }
            }
        }
    }

    fn resume_due(&mut self) {
        let due = self.scheduler.take_due(self.clock);
        for mut run in due {
            if !self.actors.contains_key(&run.actor()) {
                debug!(actor = %run.actor(), "owner destroyed while suspended, dropping run");
                continue;
            }
            run.resume(&mut *self);
            if matches!(run.state(), RunState::Suspended { .. }) {
                self.scheduler.park(run);
            }
        }
    }

    // ---- quest variables & knowledge ----

    pub fn set_quest_schema(&mut self, quests: QuestSchema) {
        self.quests = quests;
    }

    pub fn register_quest_var(&mut self, id: &str, updates: Vec<crate::KnowledgeUpdate>) {
        self.quests.register(id, updates);
    }

    /// Set a quest variable, applying any matching knowledge updates
    pub fn set_quest_var(&mut self, owner: ActorId, var_id: &str, value: &str) {
        let zone = self.zone_of_actor(owner).unwrap_or_default();
        let full_id = resolve_quest_id(&zone, var_id);
        self.vars.set(VarScope::Quest, owner, &full_id, value);
        for (knowledge_id, content) in self.quests.updates_for(&full_id, value) {
            debug!(%owner, knowledge = %knowledge_id, "quest knowledge updated");
            self.knowledge.insert((owner, knowledge_id), content);
        }
    }

    pub fn delete_quest_var(&mut self, owner: ActorId, var_id: &str) -> bool {
        let zone = self.zone_of_actor(owner).unwrap_or_default();
        let full_id = resolve_quest_id(&zone, var_id);
        self.vars.delete(VarScope::Quest, owner, &full_id)
    }

    pub fn quest_var(&self, owner: ActorId, var_id: &str) -> Option<String> {
        let zone = self.zone_of_actor(owner).unwrap_or_default();
        let full_id = resolve_quest_id(&zone, var_id);
        self.vars.get(VarScope::Quest, owner, &full_id)
    }

    pub fn knowledge(&self, owner: ActorId, id: &str) -> Option<String> {
        self.knowledge
            .get(&(owner, id.to_string()))
            .map(|entry| entry.clone())
    }

    fn zone_of_actor(&self, id: ActorId) -> Option<String> {
        self.containing_room(id)
            .and_then(|r| self.actors.get(&r))
            .map(|r| r.zone.clone())
    }

    // ---- misc accessors ----

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    pub fn pending_runs(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn drain_effects(&mut self) -> Vec<ActionEffect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn resolve_reference(&self, reference: &str) -> Option<&Actor> {
        let parsed = ActorRef::parse(reference)?;
        let actor = self.actors.get(&parsed.id)?;
        (actor.kind == parsed.kind).then_some(actor)
    }

    /// Resolve a command argument into an actor: a reference string,
    /// `self`, or a name looked up in the origin's room.
    pub(crate) fn resolve_target(&self, token: &str, origin: ActorId) -> Option<ActorId> {
        if token.eq_ignore_ascii_case("self") {
            return Some(origin);
        }
        if let Some(actor) = self.resolve_reference(token) {
            return Some(actor.id);
        }
        let room = self.containing_room(origin)?;
        let room = self.actors.get(&room)?;
        let candidates = room.contents.iter().chain(std::iter::once(&room.id));
        for id in candidates {
            if let Some(actor) = self.actors.get(id) {
                if actor.name.eq_ignore_ascii_case(token)
                    || actor
                        .name
                        .to_ascii_lowercase()
                        .contains(&token.to_ascii_lowercase())
                {
                    return Some(*id);
                }
            }
        }
        None
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldQuery for World {
    fn name_of(&self, reference: &str) -> Option<String> {
        self.resolve_reference(reference).map(|a| a.name.clone())
    }

    fn equipped(&self, reference: &str, slot: &str) -> Option<String> {
        let actor = self.resolve_reference(reference)?;
        let item = actor.equipment.get(slot)?;
        self.actors.get(item).map(|i| i.name.clone())
    }

    fn has_item(&self, reference: &str, item: &str) -> bool {
        let Some(actor) = self.resolve_reference(reference) else {
            return false;
        };
        actor.contents.iter().any(|c| {
            self.actors.get(c).is_some_and(|held| {
                held.name.eq_ignore_ascii_case(item) || held.reference().to_string() == item
            })
        })
    }

    fn room_of(&self, reference: &str) -> Option<String> {
        let actor = self.resolve_reference(reference)?;
        let room = self.containing_room(actor.id)?;
        self.actors.get(&room).map(|r| r.reference().to_string())
    }

    fn zone_of(&self, reference: &str) -> Option<String> {
        let actor = self.resolve_reference(reference)?;
        self.zone_of_actor(actor.id)
    }

    fn scoped_var(&self, scope: VarScope, reference: &str, name: &str) -> Option<String> {
        let actor = self.resolve_reference(reference)?;
        match scope {
            VarScope::Quest => self.quest_var(actor.id, name),
            scope => self.vars.get(scope, actor.id, name),
        }
    }
}

impl ScriptHost for World {
    fn perform(&mut self, actor: ActorId, command: &str, args: &[String]) -> bool {
        self.do_command(actor, command, args)
    }

    fn now(&self) -> f64 {
        self.clock
    }

    fn pause_ceiling(&self) -> f64 {
        self.pause_ceiling
    }
}

/// Convenience for wiring entities in tests and demos
impl World {
    pub fn spawn_player(&mut self, name: &str, room: ActorId) -> ActorId {
        let id = self.create_character(name, room);
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.is_player = true;
            actor.pronouns = Pronouns::they();
        }
        id
    }
}
