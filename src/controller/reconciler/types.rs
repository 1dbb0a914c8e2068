//! # Reconciler Types
//!
//! Shared context, error type, and scheduler directives.

use crate::config::ControllerConfig;
use crate::constants;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::ownership::OwnershipError;
use crate::controller::projection::ProjectionError;
use crate::controller::reconciler::entry::DefinitionController;
use crate::controller::store::StoreError;
use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while reconciling one definition
///
/// Store errors pass through untouched so their text lands verbatim in the
/// `Reconciled` condition message.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error("failed to encode ReplicationSource spec: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the definition status failed, independent of the reconcile outcome
    #[error("failed to update ReplicationSourceDefinition status: {0}")]
    StatusUpdate(#[source] StoreError),
}

impl ReconcilerError {
    /// The host is stopping; nothing should be recorded
    pub fn is_cancelled(&self) -> bool {
        match self {
            ReconcilerError::Store(err) | ReconcilerError::StatusUpdate(err) => err.is_cancelled(),
            _ => false,
        }
    }

    /// Retrying cannot help until the definition itself changes
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ReconcilerError::Projection(ProjectionError::UnsupportedMethod { .. })
                | ReconcilerError::Ownership(OwnershipError::AlreadyOwned { .. })
        )
    }

    /// What the scheduler should do with an invocation that failed this way
    pub fn directive(&self) -> Directive {
        if self.is_cancelled() || self.is_permanent() {
            Directive::NoRequeue
        } else {
            Directive::RequeueOnError
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcilerError::Store(StoreError::Conflict { .. })
            | ReconcilerError::StatusUpdate(StoreError::Conflict { .. }) => "conflict",
            ReconcilerError::Store(_) => "store",
            ReconcilerError::Projection(_) => "projection",
            ReconcilerError::Ownership(_) => "ownership",
            ReconcilerError::Serialization(_) => "serialization",
            ReconcilerError::StatusUpdate(_) => "status_update",
        }
    }
}

/// Scheduler directive returned by one reconcile invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Wait for the next change event
    NoRequeue,
    /// Run again after a fixed delay
    RequeueAfter(Duration),
    /// Run again under the host's error backoff
    RequeueOnError,
}

impl From<Directive> for Action {
    fn from(directive: Directive) -> Self {
        match directive {
            Directive::NoRequeue => Action::await_change(),
            Directive::RequeueAfter(delay) => Action::requeue(delay),
            Directive::RequeueOnError => Action::requeue(Duration::from_secs(
                constants::DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS,
            )),
        }
    }
}

/// Per-resource error backoff tracking
#[derive(Debug)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Context shared by every reconcile invocation run by the watch loop
#[derive(Debug)]
pub struct Reconciler {
    pub controller: DefinitionController,
    pub config: ControllerConfig,
    /// Keyed by "namespace/name"; never held across an await
    pub backoff_states: Mutex<HashMap<String, BackoffState>>,
}

impl Reconciler {
    pub fn new(controller: DefinitionController, config: ControllerConfig) -> Self {
        Self {
            controller,
            config,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Forget the error history of a resource after it reconciles cleanly
    pub fn clear_backoff(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::store::ObjectKey;

    #[test]
    fn test_store_errors_requeue() {
        let err = ReconcilerError::Store(StoreError::Read {
            kind: "ReplicationSource",
            key: ObjectKey::new("ns", "src"),
            message: "timeout".to_string(),
        });
        assert_eq!(err.directive(), Directive::RequeueOnError);
        assert_eq!(err.kind(), "store");
    }

    #[test]
    fn test_cancellation_does_not_requeue() {
        let err = ReconcilerError::Store(StoreError::Cancelled);
        assert!(err.is_cancelled());
        assert_eq!(err.directive(), Directive::NoRequeue);

        let status_err = ReconcilerError::StatusUpdate(StoreError::Cancelled);
        assert!(status_err.is_cancelled());
    }

    #[test]
    fn test_unsupported_method_is_permanent() {
        let err = ReconcilerError::Projection(ProjectionError::UnsupportedMethod {
            method: "restic".to_string(),
            supported: "rclone".to_string(),
        });
        assert!(err.is_permanent());
        assert_eq!(err.directive(), Directive::NoRequeue);
    }

    #[test]
    fn test_empty_method_is_not_permanent() {
        let err = ReconcilerError::Projection(ProjectionError::EmptyMethod);
        assert!(!err.is_permanent());
        assert_eq!(err.directive(), Directive::RequeueOnError);
    }

    #[test]
    fn test_conflicts_are_labelled() {
        let conflict = || StoreError::Conflict {
            kind: "ReplicationSourceDefinition",
            key: ObjectKey::new("ns", "job1"),
            message: "the object has been modified".to_string(),
        };
        assert_eq!(ReconcilerError::Store(conflict()).kind(), "conflict");
        assert_eq!(ReconcilerError::StatusUpdate(conflict()).kind(), "conflict");
    }

    #[test]
    fn test_directive_to_action() {
        assert_eq!(Action::from(Directive::NoRequeue), Action::await_change());
        assert_eq!(
            Action::from(Directive::RequeueAfter(Duration::from_secs(7))),
            Action::requeue(Duration::from_secs(7))
        );
        assert_eq!(
            Action::from(Directive::RequeueOnError),
            Action::requeue(Duration::from_secs(
                constants::DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS
            ))
        );
    }
}
