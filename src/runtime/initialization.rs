//! # Initialization
//!
//! Controller startup: rustls provider, tracing, metrics, probe server,
//! Kubernetes client and reconciler context.

use crate::config::{load_config, ControllerConfig, ServerConfig};
use crate::controller::projection::StrategyRegistry;
use crate::controller::reconciler::{DefinitionController, Reconciler};
use crate::controller::server::{start_server, ServerState};
use crate::controller::store::KubeObjectStore;
use crate::crd::{ReplicationSource, ReplicationSourceDefinition};
use crate::observability;
use crate::runtime::shutdown::Shutdown;
use anyhow::{anyhow, Result};
use kube::{
    api::{Api, ListParams},
    Client,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Everything the watch loop needs
#[allow(missing_debug_implementations, reason = "kube Api handles carry no useful Debug output")]
pub struct InitializationResult {
    pub definitions: Api<ReplicationSourceDefinition>,
    pub sources: Api<ReplicationSource>,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
    pub shutdown: Shutdown,
}

/// Initialize the controller runtime
pub async fn initialize() -> Result<InitializationResult> {
    // Must run before anything opens a TLS connection
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|existing| {
            anyhow!("Failed to install rustls crypto provider, one is already installed: {:?}", existing)
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "definition_controller=info".into()),
        )
        .init();

    info!("Starting ReplicationSourceDefinition controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let (controller_config, server_config) = load_config();
    info!(
        field_manager = %controller_config.field_manager,
        watch_namespace = ?controller_config.watch_namespace,
        metrics_port = server_config.metrics_port,
        "Loaded configuration"
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::new());
    let server_handle = {
        let state = Arc::clone(&server_state);
        let port = server_config.metrics_port;
        tokio::spawn(async move {
            if let Err(e) = start_server(port, state).await {
                error!("HTTP server error: {:#}", e);
            }
        })
    };
    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    let client = Client::try_default().await?;

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();

    let (definitions, sources) = watched_apis(&client, &controller_config);
    let reconciler = build_reconciler(client, controller_config, &shutdown);

    log_startup_inventory(&definitions).await;

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        definitions,
        sources,
        reconciler,
        server_state,
        shutdown,
    })
}

fn watched_apis(
    client: &Client,
    config: &ControllerConfig,
) -> (Api<ReplicationSourceDefinition>, Api<ReplicationSource>) {
    match config.watch_namespace.as_deref() {
        Some(namespace) => (
            Api::namespaced(client.clone(), namespace),
            Api::namespaced(client.clone(), namespace),
        ),
        None => (Api::all(client.clone()), Api::all(client.clone())),
    }
}

fn build_reconciler(
    client: Client,
    config: ControllerConfig,
    shutdown: &Shutdown,
) -> Arc<Reconciler> {
    let store = Arc::new(KubeObjectStore::new(
        client,
        config.field_manager.clone(),
        shutdown.subscribe(),
    ));
    let controller = DefinitionController::new(store, Arc::new(StrategyRegistry::default()));
    Arc::new(Reconciler::new(controller, config))
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &ServerState,
    server_handle: &tokio::task::JoinHandle<()>,
    config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Log the definitions present at startup, grouped by namespace
///
/// The watch picks every one of them up on its initial list.
async fn log_startup_inventory(definitions: &Api<ReplicationSourceDefinition>) {
    let list = match definitions.list(&ListParams::default()).await {
        Ok(list) => list,
        Err(e) => {
            error!("CRD is not queryable; {}. Is the CRD installed?", e);
            error!("Installation: crdgen | kubectl apply -f -");
            warn!("Continuing despite CRD queryability check failure - the watch will retry");
            return;
        }
    };

    if list.items.is_empty() {
        info!("No existing ReplicationSourceDefinition resources found");
        return;
    }

    let mut by_namespace: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in &list.items {
        by_namespace
            .entry(item.metadata.namespace.clone().unwrap_or_default())
            .or_default()
            .push(item.metadata.name.clone().unwrap_or_default());
    }

    info!(
        "Found {} ReplicationSourceDefinition resources in {} namespaces",
        list.items.len(),
        by_namespace.len()
    );
    for (namespace, mut names) in by_namespace {
        names.sort();
        let shown = if names.len() <= 3 {
            names.join(", ")
        } else {
            format!("{}, ... ({} total)", names[..3].join(", "), names.len())
        };
        info!("  {}: {}", namespace, shown);
    }
}
