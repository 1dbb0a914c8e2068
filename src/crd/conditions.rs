//! # Conditions
//!
//! Status conditions and the type-keyed ledger that holds them.
//!
//! The ledger keeps at most one condition per type, collapsing duplicates
//! loaded from an existing status on the next `set`. Setting a condition whose
//! status, reason and message all match the stored entry leaves the entry (and
//! its transition time) untouched, so repeated reconciles of a converged object
//! produce no status churn.

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition type reporting the outcome of the last reconcile
pub const CONDITION_RECONCILED: &str = "Reconciled";

/// Reason used when reconciliation converged
pub const REASON_COMPLETE: &str = "Complete";

/// Reason used when reconciliation failed
pub const REASON_ERROR: &str = "Error";

/// Tri-state status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

/// Condition represents one observation about a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g. "Reconciled")
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,
    /// Short machine-readable reason
    #[serde(default)]
    pub reason: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Last time the condition changed (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl Condition {
    /// Build a condition without a transition time; the ledger stamps it on `set`.
    pub fn new(
        r#type: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: None,
        }
    }

    /// True when status, reason and message match; the timestamp is ignored.
    fn same_observation(&self, other: &Condition) -> bool {
        self.status == other.status && self.reason == other.reason && self.message == other.message
    }
}

/// Ordered, type-keyed list of conditions
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, condition_type: &str) -> Option<&Condition> {
        self.0.iter().find(|c| c.r#type == condition_type)
    }

    /// Upsert a condition, stamping the current time when it changes.
    ///
    /// Returns `true` if the ledger changed.
    pub fn set(&mut self, condition: Condition) -> bool {
        self.set_at(condition, Utc::now())
    }

    /// Same as [`Conditions::set`] with a caller-supplied clock.
    pub fn set_at(&mut self, mut condition: Condition, now: DateTime<Utc>) -> bool {
        condition.last_transition_time = Some(now.to_rfc3339_opts(SecondsFormat::Secs, true));

        let Some(index) = self.0.iter().position(|c| c.r#type == condition.r#type) else {
            self.0.push(condition);
            return true;
        };

        // A status written by someone else may repeat a type; keep the first
        let before = self.0.len();
        let mut seen = false;
        self.0.retain(|c| {
            if c.r#type != condition.r#type {
                return true;
            }
            let first = !seen;
            seen = true;
            first
        });
        let deduplicated = self.0.len() != before;

        let existing = &mut self.0[index];
        if existing.same_observation(&condition) {
            return deduplicated;
        }
        *existing = condition;
        true
    }

    /// Remove the condition of this type. Returns `true` if one was present.
    pub fn remove(&mut self, condition_type: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c.r#type != condition_type);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Condition>> for Conditions {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}
