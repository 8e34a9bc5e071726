//! Typed access to the global settings.
//!
//! Settings are re-read at the start of each handler rather than cached:
//! a change to `allowed_roots` or `safe_mode` takes effect for the next
//! request without invalidation machinery.

use serde_json::Value;
use std::path::PathBuf;

use switchboard_core::{ApiError, ApiResult};
use switchboard_storage::Store;

use crate::error::map_storage;

/// Setting key: ordered list of absolute directory paths.
pub const ALLOWED_ROOTS: &str = "allowed_roots";
/// Setting key: list of regex patterns shell commands must match.
pub const SHELL_ALLOWLIST: &str = "shell_allowlist";
/// Setting key: global kill switch.
pub const SAFE_MODE: &str = "safe_mode";

/// Snapshot of the recognized settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Filesystem sandbox roots.
    pub allowed_roots: Vec<PathBuf>,
    /// Shell allowlist patterns.
    pub shell_allowlist: Vec<String>,
    /// Whether safe mode is on.
    pub safe_mode: bool,
}

impl Settings {
    /// Read the current settings from the store.
    ///
    /// # Errors
    ///
    /// Returns INTERNAL if the store fails.
    pub async fn load(store: &Store) -> ApiResult<Self> {
        let allowed_roots = store
            .get_setting(ALLOWED_ROOTS)
            .await
            .map_err(map_storage)?
            .and_then(|v| {
                v.as_array().map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(PathBuf::from)
                        .collect()
                })
            })
            .unwrap_or_default();

        let shell_allowlist = store
            .get_setting(SHELL_ALLOWLIST)
            .await
            .map_err(map_storage)?
            .and_then(|v| {
                v.as_array().map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
            })
            .unwrap_or_default();

        let safe_mode = store
            .get_setting(SAFE_MODE)
            .await
            .map_err(map_storage)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(Self {
            allowed_roots,
            shell_allowlist,
            safe_mode,
        })
    }
}

/// Validate the shape of a recognized setting value.
///
/// Unrecognized keys are accepted as opaque values.
///
/// # Errors
///
/// Returns VALIDATION when a recognized key carries the wrong shape.
pub fn validate_setting(key: &str, value: &Value) -> ApiResult<()> {
    match key {
        ALLOWED_ROOTS => {
            let Some(items) = value.as_array() else {
                return Err(ApiError::validation("allowed_roots must be an array"));
            };
            for item in items {
                match item.as_str() {
                    Some(path) if path.starts_with('/') => {}
                    Some(path) => {
                        return Err(ApiError::validation(format!(
                            "allowed_roots entries must be absolute paths: {path}"
                        )));
                    }
                    None => {
                        return Err(ApiError::validation("allowed_roots entries must be strings"));
                    }
                }
            }
            Ok(())
        }
        SHELL_ALLOWLIST => {
            let Some(items) = value.as_array() else {
                return Err(ApiError::validation("shell_allowlist must be an array"));
            };
            for item in items {
                match item.as_str() {
                    Some(pattern) => {
                        regex::Regex::new(pattern).map_err(|e| {
                            ApiError::validation(format!("invalid allowlist pattern: {e}"))
                        })?;
                    }
                    None => {
                        return Err(ApiError::validation(
                            "shell_allowlist entries must be strings",
                        ));
                    }
                }
            }
            Ok(())
        }
        SAFE_MODE => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(ApiError::validation("safe_mode must be a boolean"))
            }
        }
        _ => Ok(()),
    }
}
