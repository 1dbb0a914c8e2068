//! # Ownership
//!
//! Links a ReplicationSource to the definition that produced it. The store
//! uses the controller owner reference to garbage-collect the source when the
//! definition is deleted; the controller never deletes sources itself.

use crate::crd::ReplicationSourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OwnershipError {
    /// The owner has not been persisted yet (no uid) or has no name
    #[error("ReplicationSourceDefinition {0} has no name or uid and cannot own objects")]
    MissingIdentity(String),

    /// Another controller already owns the object
    #[error("object is already controlled by {kind} {name}")]
    AlreadyOwned { kind: String, name: String },
}

/// Controller owner reference pointing at `owner`
pub fn owner_reference(
    owner: &ReplicationSourceDefinition,
) -> Result<OwnerReference, OwnershipError> {
    owner
        .controller_owner_ref(&())
        .map(|reference| OwnerReference {
            block_owner_deletion: Some(true),
            ..reference
        })
        .ok_or_else(|| OwnershipError::MissingIdentity(owner.name_any()))
}

/// Record that `child` is controlled by `owner`.
///
/// Idempotent: an existing reference to the same owner is replaced rather than
/// duplicated. Fails if a different controller already owns the child.
pub fn set_owner(
    child: &mut ObjectMeta,
    owner: &ReplicationSourceDefinition,
) -> Result<(), OwnershipError> {
    let reference = owner_reference(owner)?;
    let references = child.owner_references.get_or_insert_with(Vec::new);

    if let Some(other) = references
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != reference.uid)
    {
        return Err(OwnershipError::AlreadyOwned {
            kind: other.kind.clone(),
            name: other.name.clone(),
        });
    }

    references.retain(|r| r.uid != reference.uid);
    references.push(reference);
    Ok(())
}

/// Whether `child` carries an owner reference to `owner`
pub fn is_owned_by(child: &ObjectMeta, owner: &ReplicationSourceDefinition) -> bool {
    let Some(uid) = owner.meta().uid.as_deref() else {
        return false;
    };
    child
        .owner_references
        .as_ref()
        .is_some_and(|refs| refs.iter().any(|r| r.uid == uid))
}
