//! # ReplicationSource
//!
//! The dependent object that performs replication. The controller only ever
//! creates and merge-patches it; deletion follows the owning definition.

use super::CopyMethod;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ReplicationSource Custom Resource Definition
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ReplicationSource",
    group = "scribe.backube",
    version = "v1alpha1",
    namespaced,
    shortname = "rs",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSourceSpec {
    /// Volume to replicate
    #[serde(default, rename = "sourcePVC", skip_serializing_if = "Option::is_none")]
    pub source_pvc: Option<String>,
    /// Rclone replication settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone: Option<ReplicationSourceRcloneSpec>,
}

/// Rclone-specific settings of a ReplicationSource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSourceRcloneSpec {
    /// Section in the rclone config file to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone_config_section: Option<String>,
    /// Remote path to sync to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone_dest_path: Option<String>,
    /// Name of the secret holding the rclone config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rclone_config: Option<String>,
    /// Point-in-time copy method
    #[serde(default)]
    pub copy_method: CopyMethod,
}
