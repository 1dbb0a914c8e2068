//! # Rclone Projection
//!
//! Field-for-field copy of the rclone references, with `copyMethod` defaulting
//! to `None` when the definition leaves it unset.

use super::{ProjectionError, ReplicationStrategy};
use crate::crd::{ReplicationSourceDefinitionSpec, ReplicationSourceRcloneSpec, ReplicationSourceSpec};

/// `replicationMethod` tag selecting rclone
pub const RCLONE_METHOD: &str = "rclone";

#[derive(Debug, Clone, Copy, Default)]
pub struct RcloneStrategy;

impl ReplicationStrategy for RcloneStrategy {
    fn method(&self) -> &'static str {
        RCLONE_METHOD
    }

    fn project(
        &self,
        spec: &ReplicationSourceDefinitionSpec,
    ) -> Result<ReplicationSourceSpec, ProjectionError> {
        if spec.replication_method.is_empty() {
            return Err(ProjectionError::EmptyMethod);
        }

        Ok(ReplicationSourceSpec {
            source_pvc: spec.source_pvc.clone(),
            rclone: Some(ReplicationSourceRcloneSpec {
                rclone_config_section: spec.rclone_config_section.clone(),
                rclone_dest_path: spec.rclone_dest_path.clone(),
                rclone_config: spec.rclone_config.clone(),
                copy_method: spec.copy_method.unwrap_or_default(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::CopyMethod;

    fn full_spec() -> ReplicationSourceDefinitionSpec {
        ReplicationSourceDefinitionSpec {
            replication_method: RCLONE_METHOD.to_string(),
            source_pvc: Some("data".to_string()),
            rclone_config_section: Some("s3-backup".to_string()),
            rclone_dest_path: Some("bucket/job1".to_string()),
            rclone_config: Some("rclone-secret".to_string()),
            copy_method: Some(CopyMethod::Snapshot),
        }
    }

    #[test]
    fn test_copies_references_verbatim() {
        let projected = RcloneStrategy.project(&full_spec()).unwrap();

        assert_eq!(projected.source_pvc.as_deref(), Some("data"));
        let rclone = projected.rclone.unwrap();
        assert_eq!(rclone.rclone_config_section.as_deref(), Some("s3-backup"));
        assert_eq!(rclone.rclone_dest_path.as_deref(), Some("bucket/job1"));
        assert_eq!(rclone.rclone_config.as_deref(), Some("rclone-secret"));
        assert_eq!(rclone.copy_method, CopyMethod::Snapshot);
    }

    #[test]
    fn test_copy_method_defaults_to_none() {
        let spec = ReplicationSourceDefinitionSpec {
            copy_method: None,
            ..full_spec()
        };
        let projected = RcloneStrategy.project(&spec).unwrap();
        assert_eq!(projected.rclone.unwrap().copy_method, CopyMethod::None);
    }

    #[test]
    fn test_unset_references_stay_unset() {
        let spec = ReplicationSourceDefinitionSpec {
            replication_method: RCLONE_METHOD.to_string(),
            ..Default::default()
        };
        let projected = RcloneStrategy.project(&spec).unwrap();

        assert!(projected.source_pvc.is_none());
        assert_eq!(
            projected.rclone,
            Some(ReplicationSourceRcloneSpec::default())
        );
    }

    #[test]
    fn test_projection_is_deterministic() {
        let spec = full_spec();
        let first = RcloneStrategy.project(&spec).unwrap();
        // Unrelated projection in between must not influence the result
        let _ = RcloneStrategy.project(&ReplicationSourceDefinitionSpec {
            replication_method: RCLONE_METHOD.to_string(),
            ..Default::default()
        });
        let second = RcloneStrategy.project(&spec).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_refuses_empty_method() {
        let spec = ReplicationSourceDefinitionSpec {
            replication_method: String::new(),
            ..full_spec()
        };
        assert_eq!(
            RcloneStrategy.project(&spec).unwrap_err(),
            ProjectionError::EmptyMethod
        );
    }

    #[test]
    fn test_source_name() {
        assert_eq!(RcloneStrategy.source_name("job1"), "scribe-rclone-src-job1");
    }
}
