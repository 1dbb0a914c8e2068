//! # Kubernetes Object Store
//!
//! [`ObjectStore`] backed by the Kubernetes API server.
//!
//! HTTP 404 and 409 responses are mapped onto typed [`StoreError`]s. Every call
//! races against the shutdown signal so an in-flight request is abandoned with
//! [`StoreError::Cancelled`] once the controller starts stopping.

use super::{ObjectKey, ObjectStore, StoreError};
use crate::crd::{ReplicationSource, ReplicationSourceDefinition};
use crate::runtime::shutdown::wait_for_shutdown;
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
use std::future::Future;
use tokio::sync::watch;
use tracing::debug;

const DEFINITION_KIND: &str = "ReplicationSourceDefinition";
const SOURCE_KIND: &str = "ReplicationSource";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Create,
    Write,
}

/// Kubernetes-backed object store
#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
    field_manager: String,
    shutdown: watch::Receiver<bool>,
}

impl std::fmt::Debug for KubeObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeObjectStore")
            .field("field_manager", &self.field_manager)
            .finish_non_exhaustive()
    }
}

impl KubeObjectStore {
    /// `shutdown` flips to `true` when the host begins stopping
    pub fn new(
        client: Client,
        field_manager: impl Into<String>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
            shutdown,
        }
    }

    fn definitions(&self, namespace: &str) -> Api<ReplicationSourceDefinition> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn sources(&self, namespace: &str) -> Api<ReplicationSource> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn patch_params(&self) -> PatchParams {
        PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..PatchParams::default()
        }
    }

    /// Run a store call unless shutdown is signalled first
    async fn cancellable<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        let shutdown = self.shutdown.clone();
        tokio::select! {
            biased;
            () = wait_for_shutdown(shutdown) => Err(StoreError::Cancelled),
            result = call => result,
        }
    }
}

fn classify(err: &kube::Error, kind: &'static str, key: &ObjectKey, op: Operation) -> StoreError {
    let key = key.clone();
    match err {
        kube::Error::Api(response) if response.code == 404 => StoreError::NotFound { kind, key },
        kube::Error::Api(response) if response.code == 409 => match op {
            Operation::Create => StoreError::AlreadyExists { kind, key },
            _ => StoreError::Conflict {
                kind,
                key,
                message: err.to_string(),
            },
        },
        _ => match op {
            Operation::Read => StoreError::Read {
                kind,
                key,
                message: err.to_string(),
            },
            Operation::Create | Operation::Write => StoreError::Write {
                kind,
                key,
                message: err.to_string(),
            },
        },
    }
}

#[async_trait]
impl ObjectStore for KubeObjectStore {
    async fn get_definition(
        &self,
        key: &ObjectKey,
    ) -> Result<Option<ReplicationSourceDefinition>, StoreError> {
        let api = self.definitions(&key.namespace);
        self.cancellable(async {
            api.get_opt(&key.name)
                .await
                .map_err(|e| classify(&e, DEFINITION_KIND, key, Operation::Read))
        })
        .await
    }

    async fn get_source(&self, key: &ObjectKey) -> Result<Option<ReplicationSource>, StoreError> {
        let api = self.sources(&key.namespace);
        self.cancellable(async {
            api.get_opt(&key.name)
                .await
                .map_err(|e| classify(&e, SOURCE_KIND, key, Operation::Read))
        })
        .await
    }

    async fn create_source(
        &self,
        source: &ReplicationSource,
    ) -> Result<ReplicationSource, StoreError> {
        let key = ObjectKey::from_resource(source);
        let api = self.sources(&key.namespace);
        let params = PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..PostParams::default()
        };
        debug!(source.name = %key.name, source.namespace = %key.namespace, "creating ReplicationSource");
        self.cancellable(async {
            api.create(&params, source)
                .await
                .map_err(|e| classify(&e, SOURCE_KIND, &key, Operation::Create))
        })
        .await
    }

    async fn patch_source(
        &self,
        key: &ObjectKey,
        patch: &serde_json::Value,
    ) -> Result<ReplicationSource, StoreError> {
        let api = self.sources(&key.namespace);
        let params = self.patch_params();
        debug!(source.name = %key.name, source.namespace = %key.namespace, patch = %patch, "patching ReplicationSource");
        self.cancellable(async {
            api.patch(&key.name, &params, &Patch::Merge(patch))
                .await
                .map_err(|e| classify(&e, SOURCE_KIND, key, Operation::Write))
        })
        .await
    }

    async fn update_definition_status(
        &self,
        definition: &ReplicationSourceDefinition,
    ) -> Result<(), StoreError> {
        let key = ObjectKey::from_resource(definition);
        let api = self.definitions(&key.namespace);
        let params = self.patch_params();

        // resourceVersion in a merge patch makes the API server reject stale writes with 409
        let mut body = serde_json::json!({ "status": definition.status });
        if let Some(resource_version) = &definition.metadata.resource_version {
            body["metadata"] = serde_json::json!({ "resourceVersion": resource_version });
        }

        self.cancellable(async {
            api.patch_status(&key.name, &params, &Patch::Merge(&body))
                .await
                .map(|_| ())
                .map_err(|e| classify(&e, DEFINITION_KIND, &key, Operation::Write))
        })
        .await
    }
}
