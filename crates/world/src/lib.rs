//! # WyldMUD World
//!
//! The live world model and the engine halves that need it: actors and
//! their triggers, the scoped variable store, the quest schema, event
//! dispatch through the trigger registry, and the tick-driven scheduler
//! for timers and suspended script runs.
//!
//! The simulation is cooperative: one [`World::tick`] advances timers,
//! fires eligible triggers and resumes due suspensions. Nothing here is
//! preemptive, so no locking guards world mutation.

pub mod error;
pub mod actor;
pub mod trigger;
pub mod events;
pub mod vars;
pub mod quest;
pub mod actions;
pub mod scheduler;
pub mod world;
pub mod loader;

pub use error::{Result, WorldError};
pub use actor::Actor;
pub use trigger::{Trigger, TriggerFlags, TriggerType};
pub use events::GameEvent;
pub use vars::VariableStore;
pub use quest::{resolve_quest_id, KnowledgeUpdate, QuestSchema};
pub use actions::ActionEffect;
pub use scheduler::Scheduler;
pub use world::World;
pub use loader::{load_zone, ZoneIndex};
