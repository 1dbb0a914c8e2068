//! # Controller Entry Point
//!
//! One reconcile invocation for one definition identity:
//!
//! - load the definition; absent or being deleted means nothing to do
//! - an empty `replicationMethod` leaves the definition inert
//! - otherwise run the [`SourceExecutor`], record the outcome in the
//!   `Reconciled` condition and persist the status
//! - map the result to a scheduler [`Directive`]
//!
//! This is the only place an error becomes a condition and a directive.

use crate::controller::projection::{ProjectionError, StrategyRegistry};
use crate::controller::reconciler::executor::{Outcome, SourceExecutor};
use crate::controller::reconciler::status::{next_status, reconciled_condition};
use crate::controller::reconciler::types::{Directive, ReconcilerError};
use crate::controller::store::{ObjectKey, ObjectStore};
use crate::observability;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Reconciles ReplicationSourceDefinitions against an [`ObjectStore`]
#[derive(Clone)]
pub struct DefinitionController {
    store: Arc<dyn ObjectStore>,
    executor: SourceExecutor,
}

impl std::fmt::Debug for DefinitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionController")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl DefinitionController {
    pub fn new(store: Arc<dyn ObjectStore>, strategies: Arc<StrategyRegistry>) -> Self {
        let executor = SourceExecutor::new(Arc::clone(&store), strategies);
        Self { store, executor }
    }

    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Directive, ReconcilerError> {
        let start = Instant::now();
        observability::metrics::increment_reconciliations();
        let result = self.reconcile_inner(key).await;
        observability::metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
        result
    }

    async fn reconcile_inner(&self, key: &ObjectKey) -> Result<Directive, ReconcilerError> {
        let definition = match self.store.get_definition(key).await {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                debug!("ReplicationSourceDefinition {} not found, nothing to do", key);
                return Ok(Directive::NoRequeue);
            }
            Err(e) if e.is_cancelled() => {
                debug!("Reconcile of {} cancelled while loading definition", key);
                return Ok(Directive::NoRequeue);
            }
            Err(e) => return Err(e.into()),
        };

        if definition.metadata.deletion_timestamp.is_some() {
            debug!("ReplicationSourceDefinition {} is being deleted, skipping", key);
            return Ok(Directive::NoRequeue);
        }

        if !definition.spec.is_active() {
            debug!("ReplicationSourceDefinition {} has no replicationMethod, skipping", key);
            return Ok(Directive::NoRequeue);
        }

        let result = self.executor.reconcile(&definition).await;
        match &result {
            Ok(outcome) => {
                observability::metrics::increment_source_operations(outcome.as_str());
                if *outcome != Outcome::Unchanged {
                    info!("ReplicationSource for {} {}", key, outcome.as_str());
                }
            }
            Err(e) if e.is_cancelled() => {
                debug!("Reconcile of {} cancelled, leaving status untouched", key);
                return Ok(Directive::NoRequeue);
            }
            Err(ReconcilerError::Projection(ProjectionError::EmptyMethod)) => {
                error!(
                    "Projection of {} refused an empty replicationMethod after the activity guard passed",
                    key
                );
            }
            Err(_) => {}
        }

        let source_name = self.executor.source_key(&definition).ok().map(|k| k.name);
        let condition = reconciled_condition(&result);
        if let Some(status) = next_status(&definition, condition, source_name, chrono::Utc::now())
        {
            let mut updated = definition.clone();
            updated.status = Some(status);
            match self.store.update_definition_status(&updated).await {
                Ok(()) => observability::metrics::increment_status_updates(),
                Err(e) if e.is_cancelled() => {
                    debug!("Status update of {} cancelled", key);
                    return Ok(Directive::NoRequeue);
                }
                Err(e) => {
                    if let Err(reconcile_err) = &result {
                        warn!("Reconcile of {} failed: {}", key, reconcile_err);
                    }
                    return Err(ReconcilerError::StatusUpdate(e));
                }
            }
        } else {
            debug!("Status of {} unchanged, skipping update", key);
        }

        match result {
            Ok(_) => Ok(Directive::NoRequeue),
            Err(e) if e.is_permanent() => {
                warn!("Reconcile of {} failed permanently: {}", key, e);
                observability::metrics::increment_reconciliation_errors();
                Ok(Directive::NoRequeue)
            }
            Err(e) => Err(e),
        }
    }
}
