//! # Watch Loop
//!
//! Runs the kube-runtime controller: watches ReplicationSourceDefinitions and
//! the ReplicationSources they own, and feeds every change through
//! [`reconcile`] with [`handle_reconciliation_error`] as the error policy.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::crd::{ReplicationSource, ReplicationSourceDefinition};
use crate::runtime::error_policy::handle_reconciliation_error;
use anyhow::Result;
use futures::StreamExt;
use kube::api::Api;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller until a shutdown signal drains it
pub async fn run_watch_loop(
    definitions: Api<ReplicationSourceDefinition>,
    sources: Api<ReplicationSource>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<()> {
    info!("Starting watch loop for ReplicationSourceDefinition resources");

    Controller::new(definitions, watcher::Config::default())
        .owns(sources, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(
                        resource.name = %object.name,
                        resource.namespace = ?object.namespace,
                        action = ?action,
                        "reconciliation.complete"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Controller stream error");
                }
            }
        })
        .await;

    server_state.set_ready(false);
    info!("Watch loop stopped");
    Ok(())
}
