//! # ReplicationSourceDefinition Controller
//!
//! A Kubernetes controller that turns each `ReplicationSourceDefinition` into
//! the `ReplicationSource` it describes.
//!
//! ## Overview
//!
//! 1. **Watch definitions** - every namespace, or `WATCH_NAMESPACE` when set
//! 2. **Project desired state** - `replicationMethod` selects a strategy that
//!    builds the ReplicationSource spec
//! 3. **Create or drift-correct** - the source is created with an owner
//!    reference back to its definition, then merge-patched whenever it drifts
//! 4. **Report** - the outcome lands in the definition's `Reconciled` condition
//!
//! Deleting a definition garbage-collects its source through the owner reference.
//!
//! Metrics and probes are served on `METRICS_PORT` (`/metrics`, `/healthz`, `/readyz`).

use anyhow::Result;
use definition_controller::runtime::{initialize, run_watch_loop};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize().await?;

    run_watch_loop(
        init_result.definitions,
        init_result.sources,
        init_result.reconciler,
        init_result.server_state,
    )
    .await?;

    // The watch loop only returns once a signal arrived; make sure no store call outlives it
    init_result.shutdown.trigger();
    info!("Controller stopped");
    Ok(())
}
