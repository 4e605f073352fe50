//! Session state machine
//!
//! Pure time accounting over the session registry. Each operation mutates
//! one `SessionData` entry; content decisions (what the next step's duration
//! is, whether a next step exists) belong to the step-transition policy in
//! the engine, never to this module. Every time-sensitive operation takes
//! `now_ms` explicitly so tests inject wall-clock time.
//!
//! Operations on a recipe with no session entry are silent no-ops: the UI
//! can race session teardown without producing errors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Per-recipe session state: a pausable countdown plus a step cursor
///
/// `current_step_index` may equal the recipe's step count, meaning the
/// session completed and awaits finalization by the transition policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub current_step_index: usize,
    pub is_running: bool,
    pub step_remaining_sec: u32,
    pub overall_remaining_sec: u32,
    /// Wall-clock ms of the last time accounting, None before the first tick
    pub last_tick_ms: Option<i64>,
}

/// All session state for the process
///
/// At most one session is "the active one" (driving the tick cadence and the
/// mini-player); stale entries for other recipes may linger until explicitly
/// ended. Invariant: `active_recipe_id`, when present, is a key of
/// `by_recipe`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    active_recipe_id: Option<Uuid>,
    by_recipe: HashMap<Uuid, SessionData>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipe id of the active session, if any
    pub fn active_recipe_id(&self) -> Option<Uuid> {
        self.active_recipe_id
    }

    /// Session data for a recipe, if a run exists
    pub fn get(&self, recipe_id: Uuid) -> Option<&SessionData> {
        self.by_recipe.get(&recipe_id)
    }

    /// The active session together with its recipe id
    pub fn active(&self) -> Option<(Uuid, &SessionData)> {
        let recipe_id = self.active_recipe_id?;
        self.by_recipe.get(&recipe_id).map(|data| (recipe_id, data))
    }

    /// Create a session for a recipe and make it the active one.
    ///
    /// The caller enforces the one-active-session policy and must follow
    /// immediately with `initialize_step` for step 0; this operation does
    /// not derive step durations from recipe content.
    pub fn start(&mut self, recipe_id: Uuid, total_duration_sec: u32, now_ms: i64) {
        self.active_recipe_id = Some(recipe_id);
        self.by_recipe.insert(
            recipe_id,
            SessionData {
                current_step_index: 0,
                is_running: true,
                step_remaining_sec: 0,
                overall_remaining_sec: total_duration_sec,
                last_tick_ms: Some(now_ms),
            },
        );
    }

    /// Load the current step's countdown. Used at session start and after
    /// every advance.
    pub fn initialize_step(&mut self, recipe_id: Uuid, step_duration_sec: u32, now_ms: i64) {
        if let Some(session) = self.by_recipe.get_mut(&recipe_id) {
            session.step_remaining_sec = step_duration_sec;
            session.last_tick_ms = Some(now_ms);
        }
    }

    /// One time-accounting pass: charge all wall-clock seconds elapsed since
    /// the last pass against both countdowns.
    ///
    /// Drift-correcting: a late caller (suspended process, missed cadence
    /// pulses) charges the full elapsed interval in one call. A backward
    /// clock move charges nothing; remaining time is never increased.
    pub fn tick(&mut self, recipe_id: Uuid, now_ms: i64) {
        let Some(session) = self.by_recipe.get_mut(&recipe_id) else {
            return;
        };
        if !session.is_running {
            return;
        }

        let delta_sec = match session.last_tick_ms {
            // Clamp at zero: negative deltas never refund time
            Some(prev_ms) => ((now_ms - prev_ms).max(0) / 1000) as u32,
            // Bootstrap case, one cadence period's worth
            None => 1,
        };

        session.step_remaining_sec = session.step_remaining_sec.saturating_sub(delta_sec);
        session.overall_remaining_sec = session.overall_remaining_sec.saturating_sub(delta_sec);
        session.last_tick_ms = Some(now_ms);
    }

    /// Pause the countdown. Idempotent; no-op if absent.
    pub fn pause(&mut self, recipe_id: Uuid) {
        if let Some(session) = self.by_recipe.get_mut(&recipe_id) {
            session.is_running = false;
        }
    }

    /// Resume the countdown. Refreshing `last_tick_ms` here is what keeps
    /// the paused interval from being charged by the next tick.
    pub fn resume(&mut self, recipe_id: Uuid, now_ms: i64) {
        if let Some(session) = self.by_recipe.get_mut(&recipe_id) {
            session.is_running = true;
            session.last_tick_ms = Some(now_ms);
        }
    }

    /// Move the step cursor forward and load the next step's countdown.
    /// Forces the session to running.
    pub fn advance_step(&mut self, recipe_id: Uuid, next_step_duration_sec: u32, now_ms: i64) {
        if let Some(session) = self.by_recipe.get_mut(&recipe_id) {
            session.current_step_index += 1;
            session.step_remaining_sec = next_step_duration_sec;
            session.is_running = true;
            session.last_tick_ms = Some(now_ms);
        }
    }

    /// End the current step early: the unspent step budget is removed from
    /// the overall countdown before the step countdown is zeroed, so the
    /// budget is subtracted exactly once. The step cursor does not move;
    /// the transition policy acts on the zero-remaining observation.
    pub fn stop_current_step(&mut self, recipe_id: Uuid) {
        if let Some(session) = self.by_recipe.get_mut(&recipe_id) {
            session.overall_remaining_sec = session
                .overall_remaining_sec
                .saturating_sub(session.step_remaining_sec);
            session.step_remaining_sec = 0;
        }
    }

    /// Remove the session entry; clears the active marker iff it pointed at
    /// this recipe. Idempotent; terminal — cooking again requires `start`.
    pub fn end(&mut self, recipe_id: Uuid) {
        self.by_recipe.remove(&recipe_id);
        if self.active_recipe_id == Some(recipe_id) {
            self.active_recipe_id = None;
        }
    }
}
