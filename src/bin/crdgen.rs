//! Prints the CustomResourceDefinitions as a multi-document YAML stream.
//!
//! ```bash
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use anyhow::Result;
use definition_controller::crd::{ReplicationSource, ReplicationSourceDefinition};
use kube::CustomResourceExt;

fn main() -> Result<()> {
    print!("{}", serde_yaml::to_string(&ReplicationSourceDefinition::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&ReplicationSource::crd())?);
    Ok(())
}
