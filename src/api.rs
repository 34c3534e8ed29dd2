//! HTTP API — health, version, metrics, and todo CRUD.
//!
//! Endpoints:
//!   GET    /healthz    — 200 `ok`, for load balancer health checks
//!   GET    /version    — JSON string of the service version
//!   GET    /metrics    — `{requests, total_todos}`
//!   GET    /todos      — every todo
//!   POST   /todos      — create from `{title}`
//!   GET    /todos/{id} — one todo
//!   PUT    /todos/{id} — partial update from `{title?, completed?}`
//!   DELETE /todos/{id} — remove, 204 on success
//!
//! Every request passes through `track`, which counts it before routing and
//! writes one access log line once the response is ready.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::{ApiError, StoreError};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::payload;
use crate::store::{Todo, TodoStore};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state for all endpoints.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    pub metrics: Arc<Metrics>,
    /// Reject malformed bodies and ids instead of reading them leniently.
    pub strict: bool,
}

impl AppState {
    pub fn new(strict: bool) -> Self {
        Self {
            store: Arc::new(TodoStore::new()),
            metrics: Arc::new(Metrics::new()),
            strict,
        }
    }
}

/// Build the router with request counting and access logging applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/version", get(version))
        .route("/metrics", get(metrics))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), track))
        .with_state(state)
}

async fn track(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.metrics.inc();

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let resp = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = resp.status().as_u16(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "request"
    );
    resp
}

// ─── Service endpoints ───────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn version() -> Json<&'static str> {
    Json(VERSION)
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    let total = state.store.count();
    Json(state.metrics.snapshot(total))
}

async fn not_found() -> ApiError {
    ApiError::Store(StoreError::NotFound)
}

// ─── Todos ───────────────────────────────────────────────────────────────────

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.store.list())
}

async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let body = payload::parse_body(&body, state.strict)?;
    let title = payload::create_title(&body)?;
    let todo = state.store.create(&title)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Resolve the `{id}` segment. A segment axum cannot decode (e.g. invalid
/// UTF-8 after percent-decoding) is treated like any other non-numeric id.
fn todo_id(path: Result<Path<String>, PathRejection>, strict: bool) -> Result<u64, ApiError> {
    match path {
        Ok(Path(segment)) => payload::parse_id(&segment, strict),
        Err(_) if strict => Err(ApiError::InvalidId),
        Err(_) => Ok(0),
    }
}

async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path, state.strict)?;
    Ok(Json(state.store.get(id)?))
}

async fn update_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path, state.strict)?;
    let body = payload::parse_body(&body, state.strict)?;
    let patch = payload::update_patch(&body, state.strict)?;
    Ok(Json(state.store.update(id, patch)?))
}

async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = todo_id(path, state.strict)?;
    state.store.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
