//! Memory settings resolution.
//!
//! Hosts hand the plugin a loosely-typed JSON object; [`Settings::resolve`]
//! turns it into a fully-defaulted record without ever failing. Each field
//! falls back to its default independently when absent or mistyped, so a
//! half-broken config still yields a usable record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved memory configuration.
///
/// Integer fields are signed on purpose: the resolver accepts out-of-range
/// values as-is and consumers clamp where an actual bound matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Results to request from the search collaborator and inject.
    pub max_results: i64,
    /// Inclusive lower similarity bound passed to the collaborator.
    pub min_score: f64,
    /// Prompts with fewer characters than this are never queried.
    pub min_prompt_length: i64,
    /// Annotate injected snippets with a similarity percentage.
    pub show_score: bool,
    /// Enables the conversation-end capture pipeline.
    pub auto_capture: bool,
    /// Cap on storage attempts per conversation-end event.
    pub capture_max_per_run: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_results: 5,
            min_score: 0.3,
            min_prompt_length: 8,
            show_score: false,
            auto_capture: true,
            capture_max_per_run: 3,
        }
    }
}

impl Settings {
    /// Resolve settings from an untyped configuration value.
    ///
    /// Total function: non-object input or a mistyped field falls back to the
    /// documented default for that field alone. Numeric fields are truncated
    /// toward zero where an integer is required. No clamping happens here.
    pub fn resolve(raw: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = raw.as_object() else {
            return defaults;
        };
        Self {
            max_results: int_field(obj, "max_results", defaults.max_results),
            min_score: float_field(obj, "min_score", defaults.min_score),
            min_prompt_length: int_field(obj, "min_prompt_length", defaults.min_prompt_length),
            show_score: bool_field(obj, "show_score", defaults.show_score),
            auto_capture: bool_field(obj, "auto_capture", defaults.auto_capture),
            capture_max_per_run: int_field(
                obj,
                "capture_max_per_run",
                defaults.capture_max_per_run,
            ),
        }
    }
}

fn int_field(obj: &Map<String, Value>, key: &str, default: i64) -> i64 {
    // `as i64` truncates toward zero, so 5.9 resolves to 5 and -2.7 to -2.
    obj.get(key)
        .and_then(Value::as_f64)
        .map_or(default, |v| v as i64)
}

fn float_field(obj: &Map<String, Value>, key: &str, default: f64) -> f64 {
    obj.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn bool_field(obj: &Map<String, Value>, key: &str, default: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(default)
}
