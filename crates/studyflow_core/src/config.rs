//! Engine configuration.
//!
//! # Responsibility
//! - Hold the tunable limits of the recurrence engine and node titles.
//! - Load overrides from a JSON document; absent keys keep defaults.
//!
//! # Invariants
//! - `RecurrenceLimits::open_ended_cap` only bounds absolute repeating alerts
//!   without `until`; it is a termination guard, not product behavior.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};

/// Default iteration cap for open-ended absolute repeats.
pub const DEFAULT_OPEN_ENDED_CAP: u32 = 30;
/// Default ceiling for `until`-bounded absolute repeats.
pub const DEFAULT_UNTIL_CEILING: u32 = 5_000;

/// Bounds applied while expanding absolute repeating alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceLimits {
    pub open_ended_cap: u32,
    pub until_ceiling: u32,
}

impl Default for RecurrenceLimits {
    fn default() -> Self {
        Self {
            open_ended_cap: DEFAULT_OPEN_ENDED_CAP,
            until_ceiling: DEFAULT_UNTIL_CEILING,
        }
    }
}

/// Truncation lengths for generated node titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleLimits {
    pub name_chars: usize,
    pub question_chars: usize,
}

impl Default for TitleLimits {
    fn default() -> Self {
        Self {
            name_chars: 32,
            question_chars: 60,
        }
    }
}

/// Top-level configuration shared by CLI and services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub recurrence: RecurrenceLimits,
    pub titles: TitleLimits,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recurrence: RecurrenceLimits::default(),
            titles: TitleLimits::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON override document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, DEFAULT_OPEN_ENDED_CAP};

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            EngineConfig::from_json(r#"{"recurrence": {"until_ceiling": 90}}"#).unwrap();
        assert_eq!(config.recurrence.until_ceiling, 90);
        assert_eq!(config.recurrence.open_ended_cap, DEFAULT_OPEN_ENDED_CAP);
        assert_eq!(config.titles.name_chars, 32);
    }
}
