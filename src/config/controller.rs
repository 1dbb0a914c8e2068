//! # Reconciler Configuration

use super::env_var_or_default;
use crate::constants::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Field manager recorded on every create, patch and status write
    pub field_manager: String,
    /// Restrict the watch to one namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Fibonacci error backoff bounds (seconds)
    pub error_backoff_min_secs: u64,
    pub error_backoff_max_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            watch_namespace: None,
            error_backoff_min_secs: DEFAULT_ERROR_BACKOFF_MIN_SECS,
            error_backoff_max_secs: DEFAULT_ERROR_BACKOFF_MAX_SECS,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let error_backoff_min_secs =
            env_var_or_default("ERROR_BACKOFF_MIN_SECS", DEFAULT_ERROR_BACKOFF_MIN_SECS);
        let error_backoff_max_secs =
            env_var_or_default("ERROR_BACKOFF_MAX_SECS", DEFAULT_ERROR_BACKOFF_MAX_SECS)
                .max(error_backoff_min_secs);

        Self {
            field_manager: std::env::var("FIELD_MANAGER")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_string()),
            watch_namespace: std::env::var("WATCH_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty()),
            error_backoff_min_secs,
            error_backoff_max_secs,
        }
    }
}
