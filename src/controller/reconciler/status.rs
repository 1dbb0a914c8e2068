//! # Status Management
//!
//! Records a reconcile outcome in the definition's condition ledger.
//!
//! Status is only written when something observable changed, so a converged
//! definition produces no write and no watch event.

use crate::controller::reconciler::executor::Outcome;
use crate::controller::reconciler::types::ReconcilerError;
use crate::crd::{
    Condition, ConditionStatus, ReplicationSourceDefinition, ReplicationSourceDefinitionStatus,
    CONDITION_RECONCILED, REASON_COMPLETE, REASON_ERROR,
};
use chrono::{DateTime, Utc};

/// Message recorded when reconciliation converged
pub const RECONCILE_COMPLETE_MESSAGE: &str = "Reconcile complete";

/// `Reconciled` condition describing a reconcile result
pub fn reconciled_condition(result: &Result<Outcome, ReconcilerError>) -> Condition {
    match result {
        Ok(_) => Condition::new(
            CONDITION_RECONCILED,
            ConditionStatus::True,
            REASON_COMPLETE,
            RECONCILE_COMPLETE_MESSAGE,
        ),
        Err(err) => Condition::new(
            CONDITION_RECONCILED,
            ConditionStatus::False,
            REASON_ERROR,
            err.to_string(),
        ),
    }
}

/// Status the definition should carry after this reconcile.
///
/// Returns `None` when the stored status already says the same thing.
pub fn next_status(
    definition: &ReplicationSourceDefinition,
    condition: Condition,
    source_name: Option<String>,
    now: DateTime<Utc>,
) -> Option<ReplicationSourceDefinitionStatus> {
    let current = definition.status.clone();
    let mut status = current.clone().unwrap_or_default();

    status.conditions.set_at(condition, now);
    status.observed_generation = definition.metadata.generation;
    if source_name.is_some() {
        status.source_name = source_name;
    }

    if current.as_ref() == Some(&status) {
        None
    } else {
        Some(status)
    }
}
