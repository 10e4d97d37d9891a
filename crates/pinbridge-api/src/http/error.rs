//! Application error type mapping to HTTP status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use pinbridge_types::error::RegistrationError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Registration(RegistrationError),
}

impl From<RegistrationError> for AppError {
    fn from(e: RegistrationError) -> Self {
        AppError::Registration(e)
    }
}

impl AppError {
    /// Only a malformed identifier is the client's fault; a lookup that
    /// finds nothing is reported like any other store failure.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Registration(RegistrationError::InvalidIdentifier(_)) => StatusCode::BAD_REQUEST,
            AppError::Registration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let AppError::Registration(e) = self;

        if status.is_server_error() {
            tracing::error!(error = %e, "Request failed");
        }

        (status, Json(json!({ "error": e.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RegistrationError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST),
            (RegistrationError::UserNotFound(Uuid::nil()), StatusCode::INTERNAL_SERVER_ERROR),
            (RegistrationError::StorageUnavailable("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (RegistrationError::SessionNotFound(Uuid::nil()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }
}
