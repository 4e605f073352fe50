//! Simmer Session Daemon (simmer-sd)
//!
//! Hosts the recipe catalog and the cooking session engine behind a REST
//! + SSE API. The session state machine is a drift-corrected wall-clock
//! countdown; clients are pure renderers of its snapshots.

pub mod api;
pub mod error;
pub mod session;
pub mod store;

pub use error::{Error, Result};
