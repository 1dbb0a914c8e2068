//! # ReplicationSourceDefinition Status

use super::Conditions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Observed state of a ReplicationSourceDefinition
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSourceDefinitionStatus {
    /// Latest available observations of the definition's state
    #[serde(default)]
    pub conditions: Conditions,
    /// Generation of the definition these conditions describe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Name of the ReplicationSource owned by this definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}
