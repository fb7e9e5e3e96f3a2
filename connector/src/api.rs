//! Cookbook HTTP API: the caller-facing entity operations.
//!
//! Routes:
//! - `POST /api/entities/:type_tag` - create an entity from a record
//! - `PUT /api/entities/:type_tag` - update an entity from a record
//! - `GET /api/entities/:kind/:id` - fetch one entity as a record
//! - `DELETE /api/entities/:kind/:id` - delete one entity
//! - `GET /api/recipes/recent` - recently added recipes
//! - `GET /api/status` - polling source status
//!
//! Every operation runs through the shared [`Session`], so an expired token
//! is refreshed and the call retried once before an error reaches the caller.

use crate::connectors::cookbook::CookbookConnector;
use crate::scheduler::SourceStatus;
use crate::session::Session;
use crate::Connector;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use cookbook::{CookbookError, CookbookResult, EntityKind, GenericRecord};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Shared state for the API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub connector: Arc<CookbookConnector>,
    pub session: Arc<Session>,
    /// Present when the polling source is running
    pub status: Option<Arc<Mutex<SourceStatus>>>,
}

/// Response for `GET /api/status`.
#[derive(Serialize)]
pub struct StatusResponse {
    pub connector: String,
    pub polling: Option<SourceStatus>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ---------------------------------------------------------------------------
// Business logic (called from HTTP handlers and unit tests)
// ---------------------------------------------------------------------------

/// Creates the entity described by `payload`; returns the stored record.
pub async fn handle_create(
    state: &ApiState,
    type_tag: &str,
    payload: GenericRecord,
) -> CookbookResult<GenericRecord> {
    let record = state
        .session
        .run_with_reconnect(|credentials| {
            let dispatcher = state.connector.dispatcher(&credentials);
            let payload = payload.clone();
            async move { dispatcher.create(type_tag, payload).await }
        })
        .await?;
    info!(type_tag = %type_tag, id = ?record.get("id"), "Entity created");
    Ok(record)
}

/// Updates the entity described by `payload`; returns the stored record.
pub async fn handle_update(
    state: &ApiState,
    type_tag: &str,
    payload: GenericRecord,
) -> CookbookResult<GenericRecord> {
    let record = state
        .session
        .run_with_reconnect(|credentials| {
            let dispatcher = state.connector.dispatcher(&credentials);
            let payload = payload.clone();
            async move { dispatcher.update(type_tag, payload).await }
        })
        .await?;
    info!(type_tag = %type_tag, id = ?record.get("id"), "Entity updated");
    Ok(record)
}

pub async fn handle_get(state: &ApiState, kind: EntityKind, id: i64) -> CookbookResult<GenericRecord> {
    state
        .session
        .run_with_reconnect(|credentials| {
            let dispatcher = state.connector.dispatcher(&credentials);
            async move { dispatcher.fetch_by_id(kind, id).await }
        })
        .await
}

pub async fn handle_delete(state: &ApiState, kind: EntityKind, id: i64) -> CookbookResult<()> {
    state
        .session
        .run_with_reconnect(|credentials| {
            let dispatcher = state.connector.dispatcher(&credentials);
            async move { dispatcher.delete(kind, id).await }
        })
        .await?;
    info!(kind = %kind, id = id, "Entity deleted");
    Ok(())
}

pub async fn handle_recent(state: &ApiState) -> CookbookResult<Vec<GenericRecord>> {
    state
        .session
        .run_with_reconnect(|credentials| {
            let connector = Arc::clone(&state.connector);
            async move { connector.fetch(&credentials).await }
        })
        .await
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

async fn post_entity(
    State(state): State<Arc<ApiState>>,
    Path(type_tag): Path<String>,
    Json(payload): Json<GenericRecord>,
) -> Result<(StatusCode, Json<GenericRecord>), AppError> {
    let record = handle_create(&state, &type_tag, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn put_entity(
    State(state): State<Arc<ApiState>>,
    Path(type_tag): Path<String>,
    Json(payload): Json<GenericRecord>,
) -> Result<Json<GenericRecord>, AppError> {
    let record = handle_update(&state, &type_tag, payload).await?;
    Ok(Json(record))
}

async fn get_entity(
    State(state): State<Arc<ApiState>>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<GenericRecord>, AppError> {
    let kind: EntityKind = kind.parse()?;
    let record = handle_get(&state, kind, id).await?;
    Ok(Json(record))
}

async fn delete_entity(
    State(state): State<Arc<ApiState>>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<StatusCode, AppError> {
    let kind: EntityKind = kind.parse()?;
    handle_delete(&state, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_recent(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<GenericRecord>>, AppError> {
    Ok(Json(handle_recent(&state).await?))
}

async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    let polling = match &state.status {
        Some(status) => Some(status.lock().await.clone()),
        None => None,
    };
    Json(StatusResponse {
        connector: state.connector.name().to_string(),
        polling,
    })
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

struct AppError(CookbookError);

impl From<CookbookError> for AppError {
    fn from(e: CookbookError) -> Self {
        AppError(e)
    }
}

/// HTTP status reported to the caller for a domain error.
pub fn status_for(error: &CookbookError) -> StatusCode {
    match error {
        CookbookError::UnknownEntityKind(_) | CookbookError::InvalidEntity { .. } => {
            StatusCode::BAD_REQUEST
        }
        CookbookError::EntityNotFound(_) => StatusCode::NOT_FOUND,
        CookbookError::SessionExpired(_) | CookbookError::InvalidToken(_) => {
            StatusCode::UNAUTHORIZED
        }
        CookbookError::RemoteFetchFailed { .. } | CookbookError::Api { .. } => {
            StatusCode::BAD_GATEWAY
        }
        CookbookError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!(error = %self.0, "Cookbook request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/entities/:type_tag", post(post_entity).put(put_entity))
        .route(
            "/api/entities/:kind/:id",
            get(get_entity).delete(delete_entity),
        )
        .route("/api/recipes/recent", get(get_recent))
        .route("/api/status", get(get_status))
        .with_state(Arc::new(state))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
