// Runtime options with TOML overlay
//
// Defaults live on the typed struct; an all-Option file mirror is merged
// over them so embedding hosts can override just the knobs they care about.

use serde::Deserialize;
use std::time::Duration;

/// Tunable knobs for the view runtime
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    /// Quiet interval a draw must survive before it fires
    pub debounce: Duration,
    /// Target frame rate for animated capabilities
    pub frame_rate: u32,
    /// Log every state transition at trace level
    pub trace_transitions: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            frame_rate: 30,
            trace_transitions: false,
        }
    }
}

/// File-side mirror of [`RuntimeOptions`]; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsFile {
    pub debounce_ms: Option<u64>,
    pub frame_rate: Option<u32>,
    pub trace_transitions: Option<bool>,
}

impl RuntimeOptions {
    /// Parse a TOML fragment and merge it over the defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        let file: OptionsFile = toml::from_str(toml_str)?;
        Ok(Self::from_file(file))
    }

    /// Merge a file overlay over the defaults
    pub fn from_file(file: OptionsFile) -> Self {
        let defaults = Self::default();
        Self {
            debounce: file
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            frame_rate: file.frame_rate.unwrap_or(defaults.frame_rate),
            trace_transitions: file
                .trace_transitions
                .unwrap_or(defaults.trace_transitions),
        }
    }
}
