//! HTTP mapping for application errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::utils::errors::{ChurchHubError, ImportError};

impl ChurchHubError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChurchHubError::Import(ImportError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ChurchHubError::Import(ImportError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ChurchHubError::Import(_) | ChurchHubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChurchHubError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ChurchHubError::MemberNotFound { .. }
            | ChurchHubError::GroupNotFound { .. }
            | ChurchHubError::EventNotFound { .. }
            | ChurchHubError::DonationNotFound { .. }
            | ChurchHubError::ImportJobNotFound { .. }
            | ChurchHubError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ChurchHubError::Conflict(_) => StatusCode::CONFLICT,
            ChurchHubError::Database(_) if self.is_unique_violation() => StatusCode::CONFLICT,
            ChurchHubError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ChurchHubError::ServiceUnavailable(_) | ChurchHubError::Redis(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChurchHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self, severity = %self.severity(), "Request failed");
            "Internal server error".to_string()
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ChurchHubError::MemberNotFound { member_id: 1 }.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ChurchHubError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ChurchHubError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ChurchHubError::Import(ImportError::TooLarge { max_bytes: 10 }).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ChurchHubError::Import(ImportError::EmptyFile).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ChurchHubError::Config("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ChurchHubError::InvalidInput("bad date".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Invalid input: bad date");
    }
}
