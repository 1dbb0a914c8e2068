//! # Custom Resource Definitions
//!
//! CRD types for the replication definition controller.
//!
//! - [`ReplicationSourceDefinition`] - the user-facing intent object
//! - [`ReplicationSource`] - the derived object that performs replication,
//!   owned by exactly one definition

mod conditions;
mod definition;
mod source;
mod status;

pub use conditions::*;
pub use definition::*;
pub use source::*;
pub use status::*;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// API group shared by both resources
pub const API_GROUP: &str = "scribe.backube";

/// API version shared by both resources
pub const API_VERSION: &str = "v1alpha1";

/// How a point-in-time image of the source volume is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum CopyMethod {
    /// Replicate the live volume without a point-in-time copy
    #[default]
    None,
    /// Take a clone of the volume before replicating
    Clone,
    /// Take a volume snapshot before replicating
    Snapshot,
}

impl CopyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyMethod::None => "None",
            CopyMethod::Clone => "Clone",
            CopyMethod::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for CopyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for CopyMethod {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("CopyMethod")
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        // Plain string enum keeps the CRD schema structural when the field is optional
        let schema_value = serde_json::json!({
            "type": "string",
            "enum": ["None", "Clone", "Snapshot"],
            "description": "How a point-in-time image of the source volume is created before replication."
        });
        Schema::try_from(schema_value).expect("static CopyMethod schema is a JSON object")
    }
}
