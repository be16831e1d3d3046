//! # RPC Server (C8)
//!
//! The HTTP surface: agent card, `/a2a/execute`, `/a2a/cancel`, `/health`,
//! and the legacy webhook shim. Auth is checked here and only here (spec
//! §4.7) — skills never see caller identity.

pub mod auth;
pub mod health;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AgentConfig;
use crate::peer::PeerRegistry;
use crate::skill::SkillRegistry;
use crate::task_store::TaskStore;

const EXECUTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a request handler needs; built once at startup and cloned
/// (cheaply — every field is an `Arc`/pool handle) into each request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SkillRegistry>,
    pub config: Arc<AgentConfig>,
    pub task_store: Arc<dyn TaskStore>,
    pub peers: Arc<PeerRegistry>,
    pub db_pool: PgPool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("skills_registered", &self.registry.len())
            .field("agent_url", &self.config.agent_url)
            .finish()
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<_> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/.well-known/agent.json", get(agent_card))
        .route("/a2a/execute", post(execute))
        .route("/a2a/cancel", post(cancel))
        .route("/health", get(health_check))
        .route("/api/webhook/change-notification", post(legacy_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(EXECUTE_TIMEOUT))
        .layer(cors)
        .with_state(state)
}

async fn agent_card(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "name": "impact-agent",
        "description": "Dependency-aware impact-analysis orchestrator",
        "version": env!("CARGO_PKG_VERSION"),
        "url": state.config.agent_url,
        "capabilities": {
            "streaming": false,
            "multimodal": false,
            "authentication": "required_for_mutations",
        },
        "skills": state.registry.render_for_agent_card(),
        "metadata": {
            "skills_registered": state.registry.len(),
        },
    }))
}

async fn execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(skill_id) = body.get("skill_id").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"success": false, "error": "missing skill_id"})),
        );
    };
    let input = body.get("input").cloned().unwrap_or_else(|| serde_json::json!({}));

    dispatch(&state, skill_id, input, &headers).await
}

async fn legacy_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    dispatch(&state, "receive_change_notification", body, &headers).await
}

/// Shared by `/a2a/execute` and the legacy webhook shim, which differ
/// only in how the skill id and input are derived from the request body.
async fn dispatch(
    state: &AppState,
    skill_id: &str,
    input: Value,
    headers: &HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(skill) = state.registry.get(skill_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"success": false, "error": format!("unknown skill_id: {skill_id}")})),
        );
    };

    if state.registry.is_protected(skill_id) {
        let provided = auth::extract_bearer_token(headers);
        let authorized = provided
            .map(|token| auth::verify_token(token, &state.config.auth_token))
            .unwrap_or(false);
        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"success": false, "error": "unauthorized"})),
            );
        }
    }

    let result = skill.execute(input).await;
    (StatusCode::OK, Json(result))
}

async fn cancel(Json(body): Json<Value>) -> Json<Value> {
    // Cooperative and advisory only: no in-flight task is actually
    // cancelled (spec §4.7/§9). Workers observe no cancellation signal.
    let task_id = body.get("task_id").cloned().unwrap_or(Value::Null);
    Json(serde_json::json!({
        "success": true,
        "message": "cancellation requested",
        "task_id": task_id,
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let body = health::build_health_response(
        &state.registry,
        state.task_store.as_ref(),
        &state.peers,
        &state.db_pool,
    )
    .await;
    Json(body)
}
