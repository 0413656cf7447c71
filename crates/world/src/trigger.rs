//! Triggers and their types

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use wyldmud_scripting::{Criterion, Script};

use crate::error::WorldError;

/// Event categories a trigger can hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    CatchAny,
    CatchSay,
    CatchLook,
    TimerTick,
    OnEnter,
    OnExit,
    OnReceive,
    OnGet,
    OnDrop,
    OnOpen,
    OnClose,
    OnLock,
    OnUnlock,
    OnUse,
    OnAttacked,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatchAny => "catch_any",
            Self::CatchSay => "catch_say",
            Self::CatchLook => "catch_look",
            Self::TimerTick => "timer_tick",
            Self::OnEnter => "on_enter",
            Self::OnExit => "on_exit",
            Self::OnReceive => "on_receive",
            Self::OnGet => "on_get",
            Self::OnDrop => "on_drop",
            Self::OnOpen => "on_open",
            Self::OnClose => "on_close",
            Self::OnLock => "on_lock",
            Self::OnUnlock => "on_unlock",
            Self::OnUse => "on_use",
            Self::OnAttacked => "on_attacked",
        }
    }

    /// Whether events of this type are perceived by everything in the room
    /// rather than a single entity
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            Self::CatchAny | Self::CatchSay | Self::OnEnter | Self::OnExit
        )
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catch_any" => Ok(Self::CatchAny),
            "catch_say" => Ok(Self::CatchSay),
            "catch_look" => Ok(Self::CatchLook),
            "timer_tick" => Ok(Self::TimerTick),
            "on_enter" => Ok(Self::OnEnter),
            "on_exit" => Ok(Self::OnExit),
            "on_receive" => Ok(Self::OnReceive),
            "on_get" => Ok(Self::OnGet),
            "on_drop" => Ok(Self::OnDrop),
            "on_open" => Ok(Self::OnOpen),
            "on_close" => Ok(Self::OnClose),
            "on_lock" => Ok(Self::OnLock),
            "on_unlock" => Ok(Self::OnUnlock),
            "on_use" => Ok(Self::OnUse),
            "on_attacked" => Ok(Self::OnAttacked),
            other => Err(WorldError::UnknownTriggerType(other.to_string())),
        }
    }
}

bitflags::bitflags! {
    /// Gating flags checked before criteria
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TriggerFlags: u8 {
        /// Skip firing unless a player is in the owner's room
        const REQUIRES_PLAYER_IN_ROOM = 1 << 0;
        /// Skip firing unless a player is somewhere in the owner's zone
        const REQUIRES_PLAYER_IN_ZONE = 1 << 1;
    }
}

impl TriggerFlags {
    pub fn from_name(name: &str) -> Result<Self, WorldError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "requires_player_in_room" => Ok(Self::REQUIRES_PLAYER_IN_ROOM),
            "requires_player_in_zone" => Ok(Self::REQUIRES_PLAYER_IN_ZONE),
            other => Err(WorldError::UnknownFlag(other.to_string())),
        }
    }
}

/// A rule on a room, character or object: fire the script when an event of
/// the right type passes flags and criteria.
#[derive(Debug, Clone)]
pub struct Trigger {
    /// Unique within the owning actor
    pub id: String,
    pub trigger_type: TriggerType,
    pub flags: TriggerFlags,
    pub criteria: Vec<Criterion>,
    pub script: Arc<Script>,
    /// Structural errors at load flip this off; the trigger stays visible
    /// for diagnostics but never runs
    pub enabled: bool,
    /// Accumulated units since the last fire; timer triggers only
    pub elapsed: f64,
}

impl Trigger {
    pub fn new(id: &str, trigger_type: TriggerType, script: Script) -> Self {
        Self {
            id: id.to_string(),
            trigger_type,
            flags: TriggerFlags::empty(),
            criteria: Vec::new(),
            script: Arc::new(script),
            enabled: true,
            elapsed: 0.0,
        }
    }

    /// A disabled placeholder for a definition that failed structurally
    pub fn disabled(id: &str, trigger_type: TriggerType) -> Self {
        let mut trigger = Self::new(id, trigger_type, Script::empty());
        trigger.enabled = false;
        trigger
    }

    pub fn with_flags(mut self, flags: TriggerFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_criteria(mut self, criteria: Vec<Criterion>) -> Self {
        self.criteria = criteria;
        self
    }
}
