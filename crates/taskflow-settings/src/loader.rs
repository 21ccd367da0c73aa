//! Layered settings loading.
//!
//! Loading flow:
//! 1. Start with compiled [`TaskflowSettings::default()`]
//! 2. Merge `~/.taskflow/settings.json` (or an explicit path) if it exists
//! 3. Merge `TASKFLOW_*` environment variables (highest priority)
//!
//! Environment keys use `__` as the nesting separator and `snake_case`
//! segments, which are mapped onto the camelCase JSON names:
//! `TASKFLOW_BACKEND__REMOTE__BASE_URL` sets `backend.remote.baseUrl`.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::Result;
use crate::types::TaskflowSettings;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TASKFLOW_";

/// Resolve the path to the settings file (`~/.taskflow/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".taskflow").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TaskflowSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file is not an error; malformed JSON or a value that does not
/// fit the schema is.
pub fn load_settings_from_path(path: &Path) -> Result<TaskflowSettings> {
    if path.exists() {
        debug!(?path, "loading settings from file");
    } else {
        debug!(?path, "settings file not found, using defaults");
    }

    let settings: TaskflowSettings = figment(path).extract()?;
    settings.validate()?;
    Ok(settings)
}

/// The provider stack, exposed for callers that want to add their own layers.
pub fn figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(TaskflowSettings::default()))
        .merge(Json::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| env_key_to_path(key.as_str()).into()),
        )
}

/// Map a prefix-stripped env key to a dotted camelCase settings path.
///
/// Input case is ignored: `BACKEND__REMOTE__BASE_URL` → `backend.remote.baseUrl`.
/// The provider must not lowercase keys after this mapping, or the camelCase
/// segments stop matching the settings fields.
pub fn env_key_to_path(key: &str) -> String {
    key.split("__")
        .map(snake_to_camel)
        .collect::<Vec<_>>()
        .join(".")
}

fn snake_to_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper_next = false;
    for ch in segment.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
