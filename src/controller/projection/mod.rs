//! # Desired-State Projection
//!
//! Maps a definition spec onto the spec of the ReplicationSource it should own.
//!
//! Projection is selected by the definition's `replicationMethod` tag through
//! a [`StrategyRegistry`]. Adding a replication method means registering a new
//! [`ReplicationStrategy`]; the reconcile flow does not change.
//!
//! Projections are pure and deterministic: equal input specs always produce
//! equal output specs, which is what makes diffing against the live object safe
//! to repeat.

mod rclone;

pub use rclone::{RcloneStrategy, RCLONE_METHOD};

use crate::crd::{ReplicationSourceDefinitionSpec, ReplicationSourceSpec};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// Projection was attempted for an inert definition; callers must guard against this
    #[error("cannot project a ReplicationSource for a definition without a replicationMethod")]
    EmptyMethod,

    #[error("unsupported replicationMethod '{method}' (supported: {supported})")]
    UnsupportedMethod { method: String, supported: String },
}

/// One replication method: how its source is named and what it should contain
pub trait ReplicationStrategy: Send + Sync + fmt::Debug {
    /// Tag matched against `spec.replicationMethod`
    fn method(&self) -> &'static str;

    /// Name of the source owned by the definition named `definition_name`
    fn source_name(&self, definition_name: &str) -> String {
        format!("scribe-{}-src-{}", self.method(), definition_name)
    }

    /// Desired source spec for this definition spec
    fn project(
        &self,
        spec: &ReplicationSourceDefinitionSpec,
    ) -> Result<ReplicationSourceSpec, ProjectionError>;
}

/// Method tag → strategy lookup
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, Arc<dyn ReplicationStrategy>>,
}

impl Default for StrategyRegistry {
    /// Registry with every built-in strategy
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(RcloneStrategy));
        registry
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register a strategy, replacing any previous one for the same tag
    pub fn register(&mut self, strategy: Arc<dyn ReplicationStrategy>) {
        self.strategies.insert(strategy.method(), strategy);
    }

    /// Sorted list of registered tags
    pub fn methods(&self) -> Vec<&'static str> {
        let mut methods: Vec<_> = self.strategies.keys().copied().collect();
        methods.sort_unstable();
        methods
    }

    /// Strategy selected by the spec's method tag
    pub fn resolve(
        &self,
        spec: &ReplicationSourceDefinitionSpec,
    ) -> Result<Arc<dyn ReplicationStrategy>, ProjectionError> {
        if spec.replication_method.is_empty() {
            return Err(ProjectionError::EmptyMethod);
        }
        self.strategies
            .get(spec.replication_method.as_str())
            .map(Arc::clone)
            .ok_or_else(|| ProjectionError::UnsupportedMethod {
                method: spec.replication_method.clone(),
                supported: self.methods().join(", "),
            })
    }

    /// Resolve and project in one step
    pub fn project(
        &self,
        spec: &ReplicationSourceDefinitionSpec,
    ) -> Result<ReplicationSourceSpec, ProjectionError> {
        self.resolve(spec)?.project(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{CopyMethod, ReplicationSourceRcloneSpec};

    #[derive(Debug)]
    struct StaticStrategy;

    impl ReplicationStrategy for StaticStrategy {
        fn method(&self) -> &'static str {
            "static"
        }

        fn project(
            &self,
            _spec: &ReplicationSourceDefinitionSpec,
        ) -> Result<ReplicationSourceSpec, ProjectionError> {
            Ok(ReplicationSourceSpec {
                source_pvc: Some("fixed".to_string()),
                rclone: None,
            })
        }
    }

    fn spec(method: &str) -> ReplicationSourceDefinitionSpec {
        ReplicationSourceDefinitionSpec {
            replication_method: method.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_registry_has_rclone() {
        assert_eq!(StrategyRegistry::default().methods(), vec!["rclone"]);
    }

    #[test]
    fn test_empty_method_is_a_precondition_failure() {
        let err = StrategyRegistry::default().project(&spec("")).unwrap_err();
        assert_eq!(err, ProjectionError::EmptyMethod);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let err = StrategyRegistry::default()
            .project(&spec("restic"))
            .unwrap_err();
        assert_eq!(
            err,
            ProjectionError::UnsupportedMethod {
                method: "restic".to_string(),
                supported: "rclone".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "unsupported replicationMethod 'restic' (supported: rclone)"
        );
    }

    #[test]
    fn test_registered_strategy_is_dispatched_by_tag() {
        let mut registry = StrategyRegistry::default();
        registry.register(Arc::new(StaticStrategy));

        assert_eq!(registry.methods(), vec!["rclone", "static"]);
        assert_eq!(
            registry.project(&spec("static")).unwrap().source_pvc.as_deref(),
            Some("fixed")
        );
        assert_eq!(
            registry.project(&spec("rclone")).unwrap().rclone,
            Some(ReplicationSourceRcloneSpec {
                copy_method: CopyMethod::None,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_default_source_name_rule() {
        assert_eq!(StaticStrategy.source_name("job1"), "scribe-static-src-job1");
    }
}
