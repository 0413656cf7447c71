//! Engine settings
//!
//! Loaded from a small TOML file; every field has a sensible default so a
//! missing file is not fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Tunables for the game loop and script engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Length of one game-loop tick, in seconds
    pub tick_seconds: f64,

    /// Longest a single `pause` may suspend a script, in time units
    pub pause_ceiling: f64,

    /// Directory scanned for zone fragment files
    pub zones_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0,
            pause_ceiling: 60.0,
            zones_dir: PathBuf::from("zones"),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(toml::from_str(&data)?)
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or malformed
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), %err, "using default settings");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.tick_seconds, 1.0);
        assert_eq!(s.pause_ceiling, 60.0);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_seconds = 0.5").unwrap();
        let s = Settings::load(file.path()).unwrap();
        assert_eq!(s.tick_seconds, 0.5);
        assert_eq!(s.pause_ceiling, 60.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let s = Settings::load_or_default("/nonexistent/wyldmud.toml");
        assert_eq!(s.tick_seconds, 1.0);
    }
}
