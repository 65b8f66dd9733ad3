//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gem_core::CoreError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(e) => match e {
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found".to_string()),
                // Upstream failures keep upstream's status; the URL stays in the log
                CoreError::Proxy(proxy) => {
                    warn!("Upstream failure: {}", proxy);
                    let status = StatusCode::from_u16(proxy.status_code())
                        .unwrap_or(StatusCode::BAD_GATEWAY);
                    (status, format!("Upstream request failed: {}", status))
                }
                CoreError::Storage(_) => {
                    error!("Storage failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
        };

        (status, message).into_response()
    }
}
