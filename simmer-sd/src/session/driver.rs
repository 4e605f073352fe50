//! Tick driver
//!
//! Background task that generates the session cadence. The driver only
//! observes wall-clock time and hands it to the engine; all accounting
//! lives in the engine and registry, so a late or coalesced interval
//! firing costs nothing (the delta math charges the real elapsed time).

use crate::session::engine::SessionEngine;
use simmer_common::time;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Spawn the cadence task. Runs for the lifetime of the process; passes
/// with no active session are no-ops inside the engine.
pub fn spawn(engine: Arc<SessionEngine>, cadence: Duration) -> JoinHandle<()> {
    info!("Starting session tick driver ({}ms cadence)", cadence.as_millis());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cadence);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            engine.tick_active(time::now_ms()).await;
        }
    })
}
