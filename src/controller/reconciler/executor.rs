//! # Source Executor
//!
//! Drives the ReplicationSource owned by one definition toward its projected
//! desired state:
//!
//! 1. derive the source identity from the definition identity
//! 2. fetch the live source
//! 3. absent: build it from the projection, attach ownership, create it
//! 4. present: merge-patch only the fields that drifted, or do nothing
//!
//! Errors are returned as-is. Retrying and recording them is the caller's job.

use crate::controller::ownership::{is_owned_by, set_owner};
use crate::controller::projection::{ReplicationStrategy, StrategyRegistry};
use crate::controller::reconciler::diff::merge_patch;
use crate::controller::reconciler::types::ReconcilerError;
use crate::controller::store::{ObjectKey, ObjectStore};
use crate::crd::{ReplicationSource, ReplicationSourceDefinition};
use kube::ResourceExt;
use serde_json::{Map, Value};
use std::sync::Arc;

/// What a successful reconcile did to the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
        }
    }
}

/// Creates or patches the ReplicationSource owned by a definition
#[derive(Clone)]
pub struct SourceExecutor {
    store: Arc<dyn ObjectStore>,
    strategies: Arc<StrategyRegistry>,
}

impl std::fmt::Debug for SourceExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceExecutor")
            .field("methods", &self.strategies.methods())
            .finish_non_exhaustive()
    }
}

impl SourceExecutor {
    pub fn new(store: Arc<dyn ObjectStore>, strategies: Arc<StrategyRegistry>) -> Self {
        Self { store, strategies }
    }

    /// Identity of the source owned by `definition`
    pub fn source_key(
        &self,
        definition: &ReplicationSourceDefinition,
    ) -> Result<ObjectKey, ReconcilerError> {
        let strategy = self.strategies.resolve(&definition.spec)?;
        Ok(source_key(strategy.as_ref(), definition))
    }

    pub async fn reconcile(
        &self,
        definition: &ReplicationSourceDefinition,
    ) -> Result<Outcome, ReconcilerError> {
        let strategy = self.strategies.resolve(&definition.spec)?;
        let desired = strategy.project(&definition.spec)?;
        let key = source_key(strategy.as_ref(), definition);

        let Some(current) = self.store.get_source(&key).await? else {
            let mut source = ReplicationSource::new(&key.name, desired);
            source.metadata.namespace = Some(key.namespace.clone());
            set_owner(&mut source.metadata, definition)?;
            self.store.create_source(&source).await?;
            return Ok(Outcome::Created);
        };

        let mut patch = Map::new();
        if let Some(spec_patch) =
            merge_patch(&serde_json::to_value(&current.spec)?, &serde_json::to_value(&desired)?)
        {
            patch.insert("spec".to_string(), spec_patch);
        }
        if !is_owned_by(&current.metadata, definition) {
            // Merge patches replace lists, so send the complete owner list
            let mut metadata = current.metadata.clone();
            set_owner(&mut metadata, definition)?;
            patch.insert(
                "metadata".to_string(),
                serde_json::json!({ "ownerReferences": metadata.owner_references }),
            );
        }

        if patch.is_empty() {
            return Ok(Outcome::Unchanged);
        }

        self.store.patch_source(&key, &Value::Object(patch)).await?;
        Ok(Outcome::Updated)
    }
}

fn source_key(
    strategy: &dyn ReplicationStrategy,
    definition: &ReplicationSourceDefinition,
) -> ObjectKey {
    ObjectKey::new(
        definition.namespace().unwrap_or_default(),
        strategy.source_name(&definition.name_any()),
    )
}
