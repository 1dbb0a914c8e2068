//! # Runtime Module
//!
//! Runtime components for the controller: initialization, watch loop,
//! error handling and shutdown.

pub mod error_policy;
pub mod initialization;
pub mod shutdown;
pub mod watch_loop;

pub use error_policy::*;
pub use initialization::*;
pub use shutdown::*;
pub use watch_loop::*;
