//! Session engine
//!
//! Orchestrates the session registry behind a single serialized mutation
//! path, consults the recipe store for content, and broadcasts state
//! transitions over the EventBus. The registry stays a pure countdown; this
//! module owns the policy layered on top of it — the one-active-session
//! rule at start, and the step-transition decision (advance or end) when a
//! step's remaining time reaches zero.

use crate::error::{Error, Result};
use crate::session::registry::{SessionData, SessionRegistry};
use crate::store::RecipeStore;
use simmer_common::events::{EventBus, SessionEvent, SessionSnapshot};
use simmer_common::projection;
use simmer_common::recipe::{Recipe, RecipeStep};
use simmer_common::time;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session engine shared across the tick driver and all HTTP handlers
pub struct SessionEngine {
    registry: RwLock<SessionRegistry>,
    store: RecipeStore,
    events: Arc<EventBus>,
}

impl SessionEngine {
    pub fn new(store: RecipeStore, events: Arc<EventBus>) -> Self {
        Self {
            registry: RwLock::new(SessionRegistry::new()),
            store,
            events,
        }
    }

    /// Start a cooking session for a recipe.
    ///
    /// Enforces the one-active-session policy: a different recipe's active
    /// session rejects the start with a recoverable conflict (the existing
    /// session is untouched). Restarting the already-active recipe is
    /// allowed and resets its run. Creates the session and loads step 0 in
    /// one atomic pass.
    pub async fn start_session(&self, recipe_id: Uuid, now_ms: i64) -> Result<SessionSnapshot> {
        let recipe = self
            .store
            .get(recipe_id)
            .await
            .ok_or(Error::RecipeNotFound(recipe_id))?;
        let Some(first_step) = recipe.steps.first() else {
            // Validation forbids step-less recipes; keep the engine defensive
            return Err(Error::BadRequest("recipe has no steps".into()));
        };

        let mut registry = self.registry.write().await;
        if let Some(active) = registry.active_recipe_id() {
            if active != recipe_id {
                return Err(Error::SessionConflict { active });
            }
        }

        let total_duration_sec = recipe.total_duration_sec();
        registry.start(recipe_id, total_duration_sec, now_ms);
        registry.initialize_step(recipe_id, first_step.duration_sec(), now_ms);
        info!(
            "Session started for recipe '{}' ({} steps, {}s total)",
            recipe.title,
            recipe.steps.len(),
            total_duration_sec
        );

        self.events.emit_lossy(SessionEvent::SessionStarted {
            recipe_id,
            total_duration_sec,
            timestamp: time::now(),
        });

        let snapshot = registry
            .get(recipe_id)
            .map(|data| make_snapshot(&recipe, data))
            .ok_or_else(|| Error::Internal("session vanished during start".into()))?;
        self.events.emit_lossy(SessionEvent::SessionProgress {
            snapshot: snapshot.clone(),
            timestamp: time::now(),
        });
        Ok(snapshot)
    }

    /// Pause the active session. Idempotent; None when no session exists.
    pub async fn pause(&self) -> Option<bool> {
        let mut registry = self.registry.write().await;
        let (recipe_id, data) = registry.active()?;
        let was_running = data.is_running;
        registry.pause(recipe_id);
        if was_running {
            self.emit_state_changed(recipe_id, false);
        }
        Some(false)
    }

    /// Resume the active session. None when no session exists.
    pub async fn resume(&self, now_ms: i64) -> Option<bool> {
        let mut registry = self.registry.write().await;
        let (recipe_id, data) = registry.active()?;
        let was_running = data.is_running;
        registry.resume(recipe_id, now_ms);
        if !was_running {
            self.emit_state_changed(recipe_id, true);
        }
        Some(true)
    }

    /// Space-bar contract: pause a running session, resume a paused one.
    /// Returns the new running state, or None (silent no-op) when no
    /// session exists.
    pub async fn toggle(&self, now_ms: i64) -> Option<bool> {
        let mut registry = self.registry.write().await;
        let (recipe_id, data) = registry.active()?;
        let running = data.is_running;
        if running {
            registry.pause(recipe_id);
        } else {
            registry.resume(recipe_id, now_ms);
        }
        self.emit_state_changed(recipe_id, !running);
        Some(!running)
    }

    /// End the active session's current step early. The step cursor does
    /// not move here; the next cadence pass observes the zero remaining
    /// time and advances or ends. Returns the stopped step index.
    pub async fn stop_current_step(&self) -> Option<usize> {
        let mut registry = self.registry.write().await;
        let (recipe_id, data) = registry.active()?;
        let step_index = data.current_step_index;
        registry.stop_current_step(recipe_id);
        debug!("Step {} stopped early for recipe {}", step_index, recipe_id);
        self.events.emit_lossy(SessionEvent::StepStopped {
            recipe_id,
            step_index,
            timestamp: time::now(),
        });
        Some(step_index)
    }

    /// Explicitly end a session. With no id, targets the active session;
    /// with an id, also finalizes a stale non-active entry (which leaves
    /// the active marker untouched). Returns the ended recipe id.
    pub async fn end_session(&self, recipe_id: Option<Uuid>) -> Option<Uuid> {
        let mut registry = self.registry.write().await;
        let target = recipe_id.or_else(|| registry.active_recipe_id())?;
        registry.get(target)?;
        registry.end(target);
        info!("Session ended for recipe {}", target);
        self.events.emit_lossy(SessionEvent::SessionEnded {
            recipe_id: target,
            completed: false,
            timestamp: time::now(),
        });
        Some(target)
    }

    /// One cadence pass: tick the active session, then run the
    /// step-transition policy on a zero-remaining observation.
    ///
    /// The tick itself refuses paused sessions, but the zero observation
    /// fires regardless of the run flag so a manually stopped step still
    /// transitions while paused. Emits a progress snapshot when the pass
    /// left a running session; an unchanged paused pass stays silent.
    pub async fn tick_active(&self, now_ms: i64) {
        // Resolve the recipe before taking the write lock; the pass
        // re-checks the session under the lock.
        let Some(recipe_id) = self.registry.read().await.active_recipe_id() else {
            return;
        };
        let recipe = self.store.get(recipe_id).await;

        let mut registry = self.registry.write().await;
        if registry.get(recipe_id).is_none() {
            return;
        }
        let Some(recipe) = recipe else {
            // Recipe deleted out from under its session: nothing left to cook
            warn!("Recipe {} vanished mid-session, ending session", recipe_id);
            registry.end(recipe_id);
            self.events.emit_lossy(SessionEvent::SessionEnded {
                recipe_id,
                completed: false,
                timestamp: time::now(),
            });
            return;
        };

        registry.tick(recipe_id, now_ms);

        let Some(data) = registry.get(recipe_id) else {
            return;
        };
        if data.step_remaining_sec == 0 {
            match recipe.steps.get(data.current_step_index + 1) {
                Some(next_step) => {
                    let next_index = data.current_step_index + 1;
                    registry.advance_step(recipe_id, next_step.duration_sec(), now_ms);
                    debug!("Advanced recipe {} to step {}", recipe_id, next_index);
                    self.events.emit_lossy(SessionEvent::StepAdvanced {
                        recipe_id,
                        step_index: next_index,
                        timestamp: time::now(),
                    });
                }
                // Current step is the last (or the cursor ran past the end)
                None => {
                    registry.end(recipe_id);
                    info!("Recipe {} completed", recipe_id);
                    self.events.emit_lossy(SessionEvent::SessionEnded {
                        recipe_id,
                        completed: true,
                        timestamp: time::now(),
                    });
                    return;
                }
            }
        }

        // A paused pass with no transition changed nothing; stay quiet so
        // SSE clients are not fed identical frames once per cadence.
        // advance_step forces running, so transitioned passes still emit.
        if let Some(data) = registry.get(recipe_id) {
            if data.is_running {
                self.events.emit_lossy(SessionEvent::SessionProgress {
                    snapshot: make_snapshot(&recipe, data),
                    timestamp: time::now(),
                });
            }
        }
    }

    /// Read model for the active session, or None when no session exists.
    /// Every surface (full view, mini-player) renders from this snapshot.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (recipe_id, data) = {
            let registry = self.registry.read().await;
            let (id, data) = registry.active()?;
            (id, data.clone())
        };
        let recipe = self.store.get(recipe_id).await?;
        Some(make_snapshot(&recipe, &data))
    }

    fn emit_state_changed(&self, recipe_id: Uuid, running: bool) {
        self.events.emit_lossy(SessionEvent::SessionStateChanged {
            recipe_id,
            running,
            timestamp: time::now(),
        });
    }
}

/// Compose the shared read model from session state plus recipe content
fn make_snapshot(recipe: &Recipe, data: &SessionData) -> SessionSnapshot {
    let step_count = recipe.steps.len();
    let current_step = recipe.steps.get(data.current_step_index).cloned();
    let step_duration_sec = current_step
        .as_ref()
        .map(RecipeStep::duration_sec)
        .unwrap_or(0);
    // Past-the-end cursor means the session completed, awaiting finalization
    let step_progress_percent = if step_duration_sec > 0 {
        projection::progress_percent(
            projection::elapsed_sec(step_duration_sec, data.step_remaining_sec),
            step_duration_sec,
        )
    } else {
        100
    };
    let total_duration_sec = recipe.total_duration_sec();
    let overall_progress_percent = if total_duration_sec > 0 {
        projection::progress_percent(
            projection::elapsed_sec(total_duration_sec, data.overall_remaining_sec),
            total_duration_sec,
        )
    } else {
        100
    };

    SessionSnapshot {
        recipe_id: recipe.id,
        recipe_title: recipe.title.clone(),
        current_step_index: data.current_step_index,
        step_count,
        current_step,
        is_running: data.is_running,
        is_last_step: projection::is_last_step(data.current_step_index, step_count),
        step_duration_sec,
        step_remaining_sec: data.step_remaining_sec,
        step_remaining_clock: projection::remaining_clock(data.step_remaining_sec),
        step_progress_percent,
        total_duration_sec,
        overall_remaining_sec: data.overall_remaining_sec,
        overall_remaining_clock: projection::remaining_clock(data.overall_remaining_sec),
        overall_progress_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use simmer_common::recipe::{CookSettings, Difficulty, Ingredient, StepDetail};

    const T0: i64 = 1_700_000_000_000;

    fn two_step_recipe() -> Recipe {
        let tomato = Ingredient {
            id: Uuid::new_v4(),
            name: "Tomato".to_string(),
            quantity: 4.0,
            unit: "pcs".to_string(),
        };
        let now = Utc::now();
        Recipe {
            id: Uuid::new_v4(),
            title: "Tomato Sauce".to_string(),
            cuisine: Some("Italian".to_string()),
            difficulty: Difficulty::Easy,
            steps: vec![
                RecipeStep {
                    id: Uuid::new_v4(),
                    description: "Chop the tomatoes".to_string(),
                    duration_minutes: 2,
                    detail: StepDetail::Instruction {
                        ingredient_ids: vec![tomato.id],
                    },
                },
                RecipeStep {
                    id: Uuid::new_v4(),
                    description: "Simmer".to_string(),
                    duration_minutes: 3,
                    detail: StepDetail::Cooking {
                        cooking_settings: CookSettings {
                            temperature: 95,
                            speed: 2,
                        },
                    },
                },
            ],
            ingredients: vec![tomato],
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    async fn engine_with(recipes: Vec<Recipe>) -> (SessionEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecipeStore::load(dir.path()).await.unwrap();
        for recipe in recipes {
            store.upsert(recipe).await.unwrap();
        }
        let engine = SessionEngine::new(store, Arc::new(EventBus::new(100)));
        (engine, dir)
    }

    #[tokio::test]
    async fn test_start_builds_snapshot_for_step_zero() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;

        let snapshot = engine.start_session(recipe_id, T0).await.unwrap();
        assert_eq!(snapshot.recipe_id, recipe_id);
        assert_eq!(snapshot.current_step_index, 0);
        assert_eq!(snapshot.step_count, 2);
        assert!(snapshot.is_running);
        assert!(!snapshot.is_last_step);
        assert_eq!(snapshot.step_remaining_sec, 120);
        assert_eq!(snapshot.step_remaining_clock, "02:00");
        assert_eq!(snapshot.total_duration_sec, 300);
        assert_eq!(snapshot.overall_remaining_sec, 300);
        assert_eq!(snapshot.overall_progress_percent, 0);
    }

    #[tokio::test]
    async fn test_start_unknown_recipe() {
        let (engine, _dir) = engine_with(vec![]).await;
        let err = engine.start_session(Uuid::new_v4(), T0).await.unwrap_err();
        assert!(matches!(err, Error::RecipeNotFound(_)));
    }

    #[tokio::test]
    async fn test_start_conflict_leaves_active_session_untouched() {
        let first = two_step_recipe();
        let second = two_step_recipe();
        let (first_id, second_id) = (first.id, second.id);
        let (engine, _dir) = engine_with(vec![first, second]).await;

        engine.start_session(first_id, T0).await.unwrap();
        let err = engine.start_session(second_id, T0).await.unwrap_err();
        assert!(matches!(err, Error::SessionConflict { active } if active == first_id));

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.recipe_id, first_id);
        assert_eq!(snapshot.step_remaining_sec, 120);
    }

    #[tokio::test]
    async fn test_toggle_pauses_and_resumes() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();

        assert_eq!(engine.toggle(T0 + 1_000).await, Some(false));
        assert!(!engine.snapshot().await.unwrap().is_running);

        assert_eq!(engine.toggle(T0 + 2_000).await, Some(true));
        assert!(engine.snapshot().await.unwrap().is_running);
    }

    #[tokio::test]
    async fn test_toggle_without_session_is_silent_noop() {
        let (engine, _dir) = engine_with(vec![]).await;
        assert_eq!(engine.toggle(T0).await, None);
        assert_eq!(engine.pause().await, None);
        assert_eq!(engine.resume(T0).await, None);
        assert_eq!(engine.stop_current_step().await, None);
        assert_eq!(engine.end_session(None).await, None);
    }

    #[tokio::test]
    async fn test_tick_advances_then_completes() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();

        // Step 0 (120s) runs out: policy advances to step 1 (180s)
        engine.tick_active(T0 + 120_000).await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.current_step_index, 1);
        assert!(snapshot.is_last_step);
        assert_eq!(snapshot.step_remaining_sec, 180);
        assert_eq!(snapshot.overall_remaining_sec, 180);

        // Step 1 runs out: last step, policy ends the session
        engine.tick_active(T0 + 300_000).await;
        assert!(engine.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_paused_pass_emits_no_progress() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let dir = tempfile::tempdir().unwrap();
        let store = RecipeStore::load(dir.path()).await.unwrap();
        store.upsert(recipe).await.unwrap();
        let events = Arc::new(EventBus::new(100));
        let engine = SessionEngine::new(store, events.clone());

        engine.start_session(recipe_id, T0).await.unwrap();
        engine.pause().await;

        let mut rx = events.subscribe();
        engine.tick_active(T0 + 1_000).await;
        engine.tick_active(T0 + 2_000).await;
        assert!(rx.try_recv().is_err(), "paused passes must stay silent");

        // A running pass emits again
        engine.resume(T0 + 3_000).await;
        let mut rx = events.subscribe();
        engine.tick_active(T0 + 4_000).await;
        assert!(matches!(
            rx.try_recv(),
            Ok(SessionEvent::SessionProgress { .. })
        ));
    }

    #[tokio::test]
    async fn test_paused_session_does_not_advance() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();
        engine.pause().await;

        engine.tick_active(T0 + 600_000).await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.current_step_index, 0);
        assert_eq!(snapshot.step_remaining_sec, 120);
    }

    #[tokio::test]
    async fn test_stop_step_transitions_on_next_pass() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();

        assert_eq!(engine.stop_current_step().await, Some(0));
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.step_remaining_sec, 0);
        assert_eq!(snapshot.overall_remaining_sec, 180);

        engine.tick_active(T0 + 1_000).await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.current_step_index, 1);
        assert_eq!(snapshot.step_remaining_sec, 180);
    }

    #[tokio::test]
    async fn test_stop_step_while_paused_still_transitions() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();
        engine.pause().await;
        engine.stop_current_step().await;

        // The zero-remaining observation fires even while paused
        engine.tick_active(T0 + 1_000).await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.current_step_index, 1);
        // advance_step forces the session back to running
        assert!(snapshot.is_running);
    }

    #[tokio::test]
    async fn test_end_session_explicit() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();

        assert_eq!(engine.end_session(None).await, Some(recipe_id));
        assert!(engine.snapshot().await.is_none());
        // Idempotent: a second end is a no-op
        assert_eq!(engine.end_session(Some(recipe_id)).await, None);
    }

    #[tokio::test]
    async fn test_progress_snapshot_percentages() {
        let recipe = two_step_recipe();
        let recipe_id = recipe.id;
        let (engine, _dir) = engine_with(vec![recipe]).await;
        engine.start_session(recipe_id, T0).await.unwrap();

        engine.tick_active(T0 + 30_000).await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.step_remaining_sec, 90);
        assert_eq!(snapshot.step_remaining_clock, "01:30");
        assert_eq!(snapshot.step_progress_percent, 25);
        assert_eq!(snapshot.overall_progress_percent, 10);
    }
}
