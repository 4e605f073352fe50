//! HTTP request handlers
//!
//! Implements the recipe catalog and session control endpoints. Session
//! control handlers that target "the active session" answer with a
//! `no-session` status instead of an error when none exists, so UI key
//! bindings can fire them unconditionally.

use crate::api::AppContext;
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use simmer_common::events::{SessionEvent, SessionSnapshot};
use simmer_common::recipe::Recipe;
use simmer_common::time;
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    recipe_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    recipe_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    session: Option<SessionSnapshot>,
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn status(value: &str) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: value.to_string(),
    })
}

fn error_response(e: &Error) -> ApiError {
    let code = match e {
        Error::RecipeNotFound(_) => StatusCode::NOT_FOUND,
        Error::SessionConflict { .. } => StatusCode::CONFLICT,
        Error::BadRequest(_) | Error::Common(simmer_common::Error::InvalidInput(_)) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, status(&format!("error: {}", e)))
}

// ============================================================================
// Recipe Catalog Endpoints
// ============================================================================

/// GET /recipes - List the full recipe catalog
pub async fn list_recipes(State(ctx): State<AppContext>) -> Json<RecipeListResponse> {
    let recipes = ctx.store.list().await;
    Json(RecipeListResponse { recipes })
}

/// GET /recipes/:recipe_id - Fetch a single recipe
pub async fn get_recipe(
    State(ctx): State<AppContext>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Recipe>, ApiError> {
    match ctx.store.get(recipe_id).await {
        Some(recipe) => Ok(Json(recipe)),
        None => Err(error_response(&Error::RecipeNotFound(recipe_id))),
    }
}

/// POST /recipes - Create or replace a recipe (keyed on its id)
pub async fn upsert_recipe(
    State(ctx): State<AppContext>,
    Json(recipe): Json<Recipe>,
) -> Result<Json<StatusResponse>, ApiError> {
    let recipe_id = recipe.id;
    match ctx.store.upsert(recipe).await {
        Ok(()) => {
            info!("Recipe {} saved", recipe_id);
            ctx.events.emit_lossy(SessionEvent::RecipesChanged {
                timestamp: time::now(),
            });
            Ok(status("ok"))
        }
        Err(e) => {
            error!("Failed to save recipe {}: {}", recipe_id, e);
            Err(error_response(&e))
        }
    }
}

/// POST /recipes/:recipe_id/favorite - Set the favorite flag
pub async fn set_favorite(
    State(ctx): State<AppContext>,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<FavoriteRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    match ctx.store.set_favorite(recipe_id, req.favorite).await {
        Ok(true) => {
            ctx.events.emit_lossy(SessionEvent::RecipesChanged {
                timestamp: time::now(),
            });
            Ok(status("ok"))
        }
        Ok(false) => Err(error_response(&Error::RecipeNotFound(recipe_id))),
        Err(e) => {
            error!("Failed to update favorite for {}: {}", recipe_id, e);
            Err(error_response(&e))
        }
    }
}

/// DELETE /recipes/:recipe_id - Remove a recipe
///
/// A session cooking this recipe is not torn down here; the next cadence
/// pass observes the missing recipe and ends it.
pub async fn delete_recipe(
    State(ctx): State<AppContext>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    match ctx.store.remove(recipe_id).await {
        Ok(true) => {
            info!("Recipe {} deleted", recipe_id);
            ctx.events.emit_lossy(SessionEvent::RecipesChanged {
                timestamp: time::now(),
            });
            Ok(status("ok"))
        }
        Ok(false) => Err(error_response(&Error::RecipeNotFound(recipe_id))),
        Err(e) => {
            error!("Failed to delete recipe {}: {}", recipe_id, e);
            Err(error_response(&e))
        }
    }
}

// ============================================================================
// Session Endpoints
// ============================================================================

/// GET /session - Read model for the active session (null when idle)
pub async fn get_session(State(ctx): State<AppContext>) -> Json<SessionResponse> {
    let session = ctx.engine.snapshot().await;
    Json(SessionResponse { session })
}

/// POST /session/start - Start cooking a recipe
pub async fn start_session(
    State(ctx): State<AppContext>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    match ctx.engine.start_session(req.recipe_id, time::now_ms()).await {
        Ok(snapshot) => Ok(Json(SessionResponse {
            session: Some(snapshot),
        })),
        Err(e) => {
            error!("Failed to start session for {}: {}", req.recipe_id, e);
            Err(error_response(&e))
        }
    }
}

/// POST /session/pause - Pause the active session
pub async fn pause_session(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    match ctx.engine.pause().await {
        Some(_) => status("paused"),
        None => status("no-session"),
    }
}

/// POST /session/resume - Resume the active session
pub async fn resume_session(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    match ctx.engine.resume(time::now_ms()).await {
        Some(_) => status("running"),
        None => status("no-session"),
    }
}

/// POST /session/toggle - Pause a running session, resume a paused one
pub async fn toggle_session(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    match ctx.engine.toggle(time::now_ms()).await {
        Some(true) => status("running"),
        Some(false) => status("paused"),
        None => status("no-session"),
    }
}

/// POST /session/stop-step - End the current step early
pub async fn stop_current_step(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    match ctx.engine.stop_current_step().await {
        Some(_) => status("stopped"),
        None => status("no-session"),
    }
}

/// POST /session/end - End a session (body optional, defaults to active)
pub async fn end_session(
    State(ctx): State<AppContext>,
    body: Option<Json<EndSessionRequest>>,
) -> Json<StatusResponse> {
    let recipe_id = body.and_then(|Json(req)| req.recipe_id);
    match ctx.engine.end_session(recipe_id).await {
        Some(_) => status("ended"),
        None => status("no-session"),
    }
}
