//! # Simmer Common Library
//!
//! Shared code for the Simmer recipe manager:
//! - Recipe data model and save-time validation
//! - Event types (SessionEvent enum) and EventBus
//! - Session read projections (remaining clock, progress, last-step)
//! - Timestamp utilities
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod projection;
pub mod recipe;
pub mod time;

pub use error::{Error, Result};
