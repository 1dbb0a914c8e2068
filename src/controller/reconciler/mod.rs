//! # Reconciler
//!
//! Turns a ReplicationSourceDefinition into the ReplicationSource it describes.
//!
//! ## Sub-modules
//!
//! - `entry` - per-invocation state machine and status persistence
//! - `executor` - create or drift-correct the owned ReplicationSource
//! - `diff` - JSON merge patch computation
//! - `status` - `Reconciled` condition and status change detection
//! - `reconcile` - kube-runtime adapter
//! - `types` - error, directive and shared context types

mod diff;
mod entry;
mod executor;
mod reconcile;
mod status;
mod types;

pub use diff::merge_patch;
pub use entry::DefinitionController;
pub use executor::{Outcome, SourceExecutor};
pub use reconcile::reconcile;
pub use status::{next_status, reconciled_condition, RECONCILE_COMPLETE_MESSAGE};
pub use types::{BackoffState, Directive, Reconciler, ReconcilerError};
