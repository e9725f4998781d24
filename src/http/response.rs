//! Response envelope
//!
//! Every JSON response has the shape
//! `{"status": bool, "resp_code": "...", "data": ..., "error": "..."}`
//! with `data` only on success and `error` only on failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::GrantError;

pub const SUCCESS: &str = "SUCCESS";
pub const CREATED: &str = "CREATED";
pub const BINDING_ERROR: &str = "BINDING_ERROR";
pub const RATE_LIMITED: &str = "RATE_LIMITED";

/// JSON response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub resp_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(resp_code: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: true,
            resp_code: resp_code.into(),
            data,
            error: None,
        }
    }

    /// Attach an HTTP status and turn into a response
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl ApiResponse<()> {
    pub fn failure(resp_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: false,
            resp_code: resp_code.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// 200 with a payload
pub fn ok<T: Serialize>(data: T) -> Response {
    ApiResponse::success(SUCCESS, Some(data)).with_status(StatusCode::OK)
}

/// 200 with no payload and an explicit code
pub fn ok_code(resp_code: &str) -> Response {
    ApiResponse::<()>::success(resp_code, None).with_status(StatusCode::OK)
}

/// Malformed request body or query
pub fn bad_request(reason: impl std::fmt::Display) -> Response {
    ApiResponse::failure(BINDING_ERROR, format!("error parsing request: {}", reason))
        .with_status(StatusCode::BAD_REQUEST)
}

impl GrantError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GrantError::DistributorNotFound(_)
            | GrantError::ParentDistributorNotFound(_)
            | GrantError::RegionNotFound(_) => StatusCode::NOT_FOUND,
            GrantError::DistributorExists(_) | GrantError::InvalidContract(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GrantError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        ApiResponse::failure(self.code(), self.to_string()).with_status(status)
    }
}
