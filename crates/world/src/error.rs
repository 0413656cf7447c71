//! Error types for the world crate

use wyldmud_core::{ActorId, MudError};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Unknown actor: {0}")]
    UnknownActor(ActorId),

    #[error("Unknown room definition: {0}")]
    UnknownRoom(String),

    #[error("Unknown trigger type: {0}")]
    UnknownTriggerType(String),

    #[error("Unknown trigger flag: {0}")]
    UnknownFlag(String),

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

impl From<WorldError> for MudError {
    fn from(err: WorldError) -> Self {
        MudError::World(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorldError>;
