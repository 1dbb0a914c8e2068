//! # ReplicationSourceDefinition
//!
//! The user-authored intent object. A definition with a non-empty
//! `replicationMethod` causes the controller to provision and maintain one
//! [`ReplicationSource`](super::ReplicationSource).

use super::{CopyMethod, ReplicationSourceDefinitionStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ReplicationSourceDefinition Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: scribe.backube/v1alpha1
/// kind: ReplicationSourceDefinition
/// metadata:
///   name: job1
///   namespace: ns
/// spec:
///   replicationMethod: rclone
///   sourcePVC: data
///   rcloneConfigSection: s3-backup
///   rcloneDestPath: bucket/job1
///   rcloneConfig: rclone-secret
///   copyMethod: Snapshot
/// ```
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ReplicationSourceDefinition",
    group = "scribe.backube",
    version = "v1alpha1",
    namespaced,
    status = "ReplicationSourceDefinitionStatus",
    shortname = "rsd",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Method", "type":"string", "jsonPath":".spec.replicationMethod"}, {"name":"Source", "type":"string", "jsonPath":".status.sourceName"}, {"name":"Reconciled", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Reconciled\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSourceDefinitionSpec {
    /// Replication strategy tag (e.g. "rclone")
    /// An empty value leaves the definition inert
    #[serde(default)]
    pub replication_method: String,
    /// Volume to replicate
    #[serde(default, rename = "sourcePVC", skip_serializing_if = "Option::is_none")]
    pub source_pvc: Option<String>,
    /// Section in the rclone config file to use for this job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone_config_section: Option<String>,
    /// Remote path to sync to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone_dest_path: Option<String>,
    /// Name of the secret holding the rclone config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone_config: Option<String>,
    /// How a point-in-time image of the volume is taken; defaults to None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_method: Option<CopyMethod>,
}

impl ReplicationSourceDefinitionSpec {
    /// A definition without a method has no desired state
    pub fn is_active(&self) -> bool {
        !self.replication_method.is_empty()
    }
}
