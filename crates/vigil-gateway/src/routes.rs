//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::{Instrument, info};
use vigil_approval::{ApprovalToken, RequestId};
use vigil_runtime::{AgentRuntime, TurnOutput};
use vigil_telemetry::RequestContext;

use crate::api::{
    ApiError, ApproveRequest, ApproveResponse, ChatRequest, ExecuteRequest, ExecuteResponse,
};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The runtime every request goes through.
    pub runtime: Arc<AgentRuntime>,
}

impl AppState {
    /// Wrap a runtime.
    #[must_use]
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnOutput>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "message must not be empty"));
    }

    let ctx = RequestContext::new("gateway").with_operation("chat");
    let output = state
        .runtime
        .run_turn(&req.message)
        .instrument(ctx.span())
        .await
        .map_err(|e| ApiError::from_turn(&e))?;

    info!(
        request_id = %ctx.short_id(),
        provider = %output.provider,
        steps = output.steps,
        stop = ?output.stop,
        elapsed_ms = ctx.elapsed_ms(),
        "Chat turn finished"
    );
    Ok(Json(output))
}

pub(crate) async fn approve(
    State(state): State<AppState>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<ApproveResponse>, ApiError> {
    let request_id = RequestId::new(req.request_id.trim());
    let grant = state
        .runtime
        .approvals()
        .grant(&request_id)
        .map_err(|e| ApiError::from_grant(&e))?;

    Ok(Json(ApproveResponse {
        status: "granted".to_string(),
        approval_token: grant.token.as_str().to_string(),
        expires_in: grant.expires_in.as_secs(),
    }))
}

pub(crate) async fn execute(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let ctx = RequestContext::new("gateway").with_operation("execute");
    let token = ApprovalToken::new(req.approval_token);
    let output = state
        .runtime
        .execute_approved(&req.command, &token, req.cwd.as_deref())
        .instrument(ctx.span())
        .await
        .map_err(|e| ApiError::from_execute(&e))?;

    Ok(Json(ExecuteResponse {
        success: true,
        output: Some(output),
        error: None,
    }))
}
