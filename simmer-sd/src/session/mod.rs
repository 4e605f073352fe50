//! Cooking session state machine, orchestration, and tick cadence

pub mod driver;
pub mod engine;
pub mod registry;

pub use engine::SessionEngine;
pub use registry::{SessionData, SessionRegistry};
