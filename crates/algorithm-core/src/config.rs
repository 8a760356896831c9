//! Player configuration. Defaults are strict; every knob can be overridden from
//! the environment with [`PlayerConfig::from_env`].

use serde::{Deserialize, Serialize};

/// How structural problems found at load time are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Error-severity issues fail `initialize` with `PlayerError::InvalidGraph`.
    #[default]
    Strict,
    /// Issues are logged only; broken edges surface during traversal.
    Lenient,
}

/// What an edge with an unrecognized `condition_type` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownConditionPolicy {
    #[default]
    NeverMatch,
    AlwaysMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub validation: ValidationMode,
    #[serde(default)]
    pub unknown_conditions: UnknownConditionPolicy,
    /// Send view/usage counters to the source.
    #[serde(default = "default_telemetry")]
    pub telemetry: bool,
}

const fn default_telemetry() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::default(),
            unknown_conditions: UnknownConditionPolicy::default(),
            telemetry: default_telemetry(),
        }
    }
}

pub(crate) fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

impl PlayerConfig {
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_unknown_conditions(mut self, policy: UnknownConditionPolicy) -> Self {
        self.unknown_conditions = policy;
        self
    }

    pub fn with_telemetry(mut self, enabled: bool) -> Self {
        self.telemetry = enabled;
        self
    }

    /// Environment variables:
    /// - `ALGOPLAYER_VALIDATION`: `strict` | `lenient`.
    /// - `ALGOPLAYER_UNKNOWN_CONDITIONS`: `never_match` | `always_match`.
    /// - `ALGOPLAYER_TELEMETRY`: boolean flag.
    ///
    /// Unparseable values keep the default and are logged.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup("ALGOPLAYER_VALIDATION") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "strict" => config.validation = ValidationMode::Strict,
                "lenient" => config.validation = ValidationMode::Lenient,
                _ => tracing::error!(value = %raw, "invalid ALGOPLAYER_VALIDATION"),
            }
        }
        if let Some(raw) = lookup("ALGOPLAYER_UNKNOWN_CONDITIONS") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "never_match" => config.unknown_conditions = UnknownConditionPolicy::NeverMatch,
                "always_match" => config.unknown_conditions = UnknownConditionPolicy::AlwaysMatch,
                _ => tracing::error!(value = %raw, "invalid ALGOPLAYER_UNKNOWN_CONDITIONS"),
            }
        }
        if let Some(raw) = lookup("ALGOPLAYER_TELEMETRY") {
            match parse_bool_env(&raw) {
                Some(enabled) => config.telemetry = enabled,
                None => tracing::error!(value = %raw, "invalid ALGOPLAYER_TELEMETRY"),
            }
        }
        config
    }
}
