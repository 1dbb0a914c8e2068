//! # Reconcile
//!
//! Adapter between the kube-runtime controller and [`DefinitionController`].
//!
//! [`DefinitionController`]: crate::controller::reconciler::DefinitionController

use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::controller::store::ObjectKey;
use crate::crd::ReplicationSourceDefinition;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::Instrument;

pub async fn reconcile(
    definition: Arc<ReplicationSourceDefinition>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let key = ObjectKey::from_resource(definition.as_ref());
    let span = tracing::info_span!(
        "controller.reconcile",
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        resource.kind = "ReplicationSourceDefinition"
    );

    let directive = ctx.controller.reconcile(&key).instrument(span).await?;
    ctx.clear_backoff(&key.to_string());
    Ok(directive.into())
}
