//! # Error Policy
//!
//! Requeue scheduling for failed reconciliations.
//!
//! Each definition keeps its own Fibonacci backoff so one failing resource
//! cannot slow down retries for the others. The state is cleared as soon as
//! the resource reconciles cleanly again.

use crate::constants;
use crate::controller::reconciler::{BackoffState, Directive, Reconciler, ReconcilerError};
use crate::controller::store::ObjectKey;
use crate::crd::ReplicationSourceDefinition;
use crate::observability;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Handle reconciliation errors with Fibonacci backoff
pub fn handle_reconciliation_error(
    obj: Arc<ReplicationSourceDefinition>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let key = ObjectKey::from_resource(obj.as_ref());

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        error.kind = error.kind(),
        error = %error
    );
    let _error_guard = error_span.enter();

    if error.directive() == Directive::NoRequeue {
        debug!("Not requeueing {} after {}", key, error);
        return Action::await_change();
    }

    error!("Reconciliation error for {}: {}", key, error);
    observability::metrics::increment_reconciliation_errors();

    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(key.to_string()).or_insert_with(|| {
                BackoffState::new(
                    ctx.config.error_backoff_min_secs,
                    ctx.config.error_backoff_max_secs,
                )
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!(
                "Failed to lock backoff_states: {}, using default backoff",
                e
            );
            (constants::DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS, 0)
        }
    };

    info!(
        "Retrying {} in {}s (error count: {}, trigger source: error-backoff)",
        key, backoff_seconds, error_count
    );

    observability::metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}
