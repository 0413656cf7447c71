//! Core error types for WyldMUD

#[derive(thiserror::Error, Debug)]
pub enum MudError {
    #[error("Script error: {0}")]
    Script(String),

    #[error("World error: {0}")]
    World(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, MudError>;
