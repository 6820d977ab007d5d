//! HTTP error mapping.
//!
//! The client sees a stable, minimal `{"error": message}` body plus a
//! status code; the full `FL_ERR_` detail goes to the operator log only.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forkline_types::ForklineError;
use serde_json::json;
use tracing::{debug, error};

/// Wrapper turning core errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub ForklineError);

impl From<ForklineError> for ApiError {
    fn from(err: ForklineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ForklineError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ForklineError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            ForklineError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "too many requests, try again later".to_string(),
            ),
            ForklineError::OrderNotFound(_) => {
                (StatusCode::NOT_FOUND, "order not found".to_string())
            }
            // The one error that names internals: callers need both
            // statuses to understand a rejected move.
            ForklineError::InvalidTransition { from, to } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("invalid transition: {from} -> {to}"),
            ),
            ForklineError::TransitionConflict(_) => (
                StatusCode::CONFLICT,
                "order was modified concurrently, retry".to_string(),
            ),
            ForklineError::InvalidInput { reason } => (StatusCode::BAD_REQUEST, reason.clone()),
            ForklineError::Upstream { .. }
            | ForklineError::Internal(_)
            | ForklineError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            debug!(error = %self.0, status = %status, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// A stable client-facing error body at an explicit status code, for
/// provider failures that never map through [`ForklineError`].
pub fn client_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkline_types::{OrderId, OrderStatus};

    #[test]
    fn status_code_mapping() {
        let cases = [
            (ForklineError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ForklineError::OrderNotFound(OrderId::new()),
                StatusCode::NOT_FOUND,
            ),
            (
                ForklineError::InvalidTransition {
                    from: OrderStatus::Preparing,
                    to: OrderStatus::Confirmed,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ForklineError::TransitionConflict(OrderId::new()),
                StatusCode::CONFLICT,
            ),
            (
                ForklineError::upstream("db down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
