//! REST + SSE API for the session daemon
//!
//! All UI surfaces (full cook view, mini-player, recipe browser) talk to
//! these endpoints; none of them hold session state of their own.

pub mod handlers;
pub mod sse;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::session::SessionEngine;
use crate::store::RecipeStore;
use simmer_common::events::EventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppContext {
    /// Session engine
    pub engine: Arc<SessionEngine>,
    /// Recipe store
    pub store: RecipeStore,
    /// Event broadcast bus
    pub events: Arc<EventBus>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))

        // API v1 routes
        .nest("/api/v1", Router::new()
            // Recipe catalog endpoints
            .route("/recipes", get(handlers::list_recipes))
            .route("/recipes", post(handlers::upsert_recipe))
            .route("/recipes/:recipe_id", get(handlers::get_recipe))
            .route("/recipes/:recipe_id", delete(handlers::delete_recipe))
            .route("/recipes/:recipe_id/favorite", post(handlers::set_favorite))

            // Session control endpoints
            .route("/session", get(handlers::get_session))
            .route("/session/start", post(handlers::start_session))
            .route("/session/pause", post(handlers::pause_session))
            .route("/session/resume", post(handlers::resume_session))
            .route("/session/toggle", post(handlers::toggle_session))
            .route("/session/stop-step", post(handlers::stop_current_step))
            .route("/session/end", post(handlers::end_session))

            // SSE events
            .route("/events", get(sse::event_stream))
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Health check endpoint
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "simmer-sd",
        "version": env!("CARGO_PKG_VERSION"),
        "port": ctx.port,
    }))
}
