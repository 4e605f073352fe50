//! Event types and EventBus for Simmer
//!
//! The session daemon broadcasts `SessionEvent`s over a tokio broadcast
//! channel; SSE clients (full session view, mini-player) subscribe through
//! the same bus, so every surface observes the same state transitions.

use crate::recipe::RecipeStep;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Shared session read model
///
/// One snapshot per accounting pass, composed from `SessionData` plus the
/// recipe by the session engine. Both the full session view and the
/// mini-player render from this struct (directly or via `SessionProgress`
/// events), which is what guarantees they never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub recipe_id: Uuid,
    pub recipe_title: String,
    pub current_step_index: usize,
    pub step_count: usize,
    /// Current step, None once the index has run past the last step
    /// (completed, awaiting finalization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<RecipeStep>,
    pub is_running: bool,
    pub is_last_step: bool,
    pub step_duration_sec: u32,
    pub step_remaining_sec: u32,
    pub step_remaining_clock: String,
    pub step_progress_percent: u8,
    pub total_duration_sec: u32,
    pub overall_remaining_sec: u32,
    pub overall_remaining_clock: String,
    pub overall_progress_percent: u8,
}

/// Simmer event types
///
/// Broadcast via [`EventBus`] and serialized for SSE transmission with the
/// variant name as the SSE event name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A cooking session was started for a recipe
    SessionStarted {
        recipe_id: Uuid,
        total_duration_sec: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session paused or resumed
    SessionStateChanged {
        recipe_id: Uuid,
        running: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Step timer expired (or was stopped) and the session moved to the
    /// next step
    StepAdvanced {
        recipe_id: Uuid,
        /// Index of the step the session advanced to
        step_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Current step was ended early by the user
    StepStopped {
        recipe_id: Uuid,
        step_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session was finalized and removed from the registry
    SessionEnded {
        recipe_id: Uuid,
        /// True when the last step ran to zero, false for an explicit end
        completed: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Periodic progress update (one per accounting pass while a session
    /// exists)
    SessionProgress {
        snapshot: SessionSnapshot,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Recipe list changed (save, favorite toggle, or delete)
    RecipesChanged {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted { .. } => "SessionStarted",
            SessionEvent::SessionStateChanged { .. } => "SessionStateChanged",
            SessionEvent::StepAdvanced { .. } => "StepAdvanced",
            SessionEvent::StepStopped { .. } => "StepStopped",
            SessionEvent::SessionEnded { .. } => "SessionEnded",
            SessionEvent::SessionProgress { .. } => "SessionProgress",
            SessionEvent::RecipesChanged { .. } => "RecipesChanged",
        }
    }
}

/// One-to-many event broadcaster
///
/// Thin wrapper over `tokio::sync::broadcast`; emitting with no subscribers
/// is not an error for lossy callers.
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the subscriber count, or an error when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscribers case
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
