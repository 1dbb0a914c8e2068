//! # Controller
//!
//! Reconciliation core and the HTTP surface that runs alongside it.

pub mod backoff;
pub mod ownership;
pub mod projection;
pub mod reconciler;
pub mod server;
pub mod store;
