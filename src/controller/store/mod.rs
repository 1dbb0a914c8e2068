//! # Object Store
//!
//! The persistent resource store the reconciler reads from and writes to.
//!
//! The reconciler only talks to the store through [`ObjectStore`], which keeps
//! the core testable without a cluster. [`KubeObjectStore`] is the production
//! implementation backed by the Kubernetes API server.

mod kubernetes;

pub use kubernetes::KubeObjectStore;

use crate::crd::{ReplicationSource, ReplicationSourceDefinition};
use async_trait::async_trait;
use kube::{Resource, ResourceExt};
use std::fmt;
use thiserror::Error;

/// Namespace/name identity of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn from_resource<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Errors reported by the object store
///
/// The display text carries the store's own message so it can be surfaced
/// verbatim in a status condition.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: ObjectKey },

    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: &'static str, key: ObjectKey },

    /// Optimistic-concurrency collision; the next reconcile re-reads fresh state
    #[error("conflict writing {kind} {key}: {message}")]
    Conflict {
        kind: &'static str,
        key: ObjectKey,
        message: String,
    },

    #[error("failed to read {kind} {key}: {message}")]
    Read {
        kind: &'static str,
        key: ObjectKey,
        message: String,
    },

    #[error("failed to write {kind} {key}: {message}")]
    Write {
        kind: &'static str,
        key: ObjectKey,
        message: String,
    },

    /// The host is shutting down; the call was abandoned
    #[error("store call cancelled")]
    Cancelled,
}

impl StoreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}

/// Store operations the reconciler needs
///
/// Every call is a round trip; implementations must not cache object state
/// between calls.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a definition; `Ok(None)` when it does not exist
    async fn get_definition(
        &self,
        key: &ObjectKey,
    ) -> Result<Option<ReplicationSourceDefinition>, StoreError>;

    /// Fetch a source; `Ok(None)` when it does not exist
    async fn get_source(&self, key: &ObjectKey) -> Result<Option<ReplicationSource>, StoreError>;

    /// Create a source exactly as given, owner references included
    async fn create_source(
        &self,
        source: &ReplicationSource,
    ) -> Result<ReplicationSource, StoreError>;

    /// Apply a JSON merge patch to a source
    async fn patch_source(
        &self,
        key: &ObjectKey,
        patch: &serde_json::Value,
    ) -> Result<ReplicationSource, StoreError>;

    /// Write the status subresource of a definition
    ///
    /// The definition's `resourceVersion` guards the write; a stale version
    /// yields [`StoreError::Conflict`].
    async fn update_definition_status(
        &self,
        definition: &ReplicationSourceDefinition,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::ReplicationSourceDefinitionSpec;

    #[test]
    fn test_object_key_from_resource() {
        let mut definition =
            ReplicationSourceDefinition::new("job1", ReplicationSourceDefinitionSpec::default());
        definition.metadata.namespace = Some("ns".to_string());

        let key = ObjectKey::from_resource(&definition);
        assert_eq!(key, ObjectKey::new("ns", "job1"));
        assert_eq!(key.to_string(), "ns/job1");
    }

    #[test]
    fn test_store_error_messages_carry_cause() {
        let err = StoreError::Read {
            kind: "ReplicationSource",
            key: ObjectKey::new("ns", "scribe-rclone-src-job1"),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read ReplicationSource ns/scribe-rclone-src-job1: connection refused"
        );
        assert!(!err.is_cancelled());
        assert!(StoreError::Cancelled.is_cancelled());
    }
}
