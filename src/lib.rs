//! ReplicationSourceDefinition Controller Library
//!
//! Reconciles `ReplicationSourceDefinition` resources into the
//! `ReplicationSource` objects they describe.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod runtime;

pub use crd::*;
