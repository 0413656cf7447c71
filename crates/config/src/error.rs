//! Error types for configuration loading

use wyldmud_core::MudError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<ConfigError> for MudError {
    fn from(err: ConfigError) -> Self {
        MudError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
