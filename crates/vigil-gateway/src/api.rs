//! Request and response bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;
use vigil_approval::ApprovalError;
use vigil_runtime::RuntimeError;

/// `POST /api/chat` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

/// `POST /api/approve` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// Id from an `approval_required` artifact.
    pub request_id: String,
}

/// `POST /api/approve` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveResponse {
    /// Always `"granted"`.
    pub status: String,
    /// Single-use token for `/api/execute`.
    pub approval_token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

/// `POST /api/execute` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// The exact command that was approved.
    pub command: String,
    /// Token from `/api/approve`.
    pub approval_token: String,
    /// Root-relative working directory.
    #[serde(default)]
    pub cwd: Option<String>,
}

/// `POST /api/execute` body, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    /// Whether the command ran and exited zero.
    pub success: bool,
    /// Captured output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A non-success response. Logged when converted.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// Map a failed chat turn: configuration 503, anything else 502.
    pub(crate) fn from_turn(err: &RuntimeError) -> Self {
        let status = if err.is_configuration() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::BAD_GATEWAY
        };
        Self::new(status, err.to_string())
    }

    /// Map a failed grant. Every grant failure looks like an unknown id.
    pub(crate) fn from_grant(err: &ApprovalError) -> Self {
        match err {
            ApprovalError::Storage(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            _ => Self::new(StatusCode::NOT_FOUND, err.to_string()),
        }
    }

    /// Map a failed execution: refused token 403, anything else 500 with
    /// whatever output was captured.
    pub(crate) fn from_execute(err: &RuntimeError) -> Self {
        let (status, output) = match err {
            RuntimeError::Tool(tool) if tool.is_permission_denied() => (StatusCode::FORBIDDEN, None),
            RuntimeError::Tool(tool) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(tool.partial_output().unwrap_or_default().to_string()),
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, Some(String::new())),
        };
        let body = ExecuteResponse {
            success: false,
            output,
            error: Some(err.to_string()),
        };
        Self {
            status,
            body: serde_json::to_value(body).unwrap_or_else(|_| json!({ "success": false })),
        }
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(status = %self.status, body = %self.body, "Request failed");
        (self.status, Json(self.body)).into_response()
    }
}
