//! Error handling
//!
//! Detector failures are mapped by their [`ErrorClass`] tag, so a client
//! input error can never be reported as an internal fault.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nbaiot_detector_core::{DetectorError, ErrorClass};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Inference pipeline errors
    Detector(DetectorError),

    // Request body rejected before reaching the detector
    Rejection { status: StatusCode, message: String },

    // Multipart upload without a `file` field
    MissingUpload,

    // Generic errors
    InternalError(String),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Detector(err) => match err.class() {
                ErrorClass::ClientInput => (StatusCode::BAD_REQUEST, err.to_string()),
                ErrorClass::NotReady => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
                ErrorClass::Internal => {
                    tracing::error!("Prediction error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An unexpected server error occurred during prediction".to_string(),
                    )
                }
            },
            AppError::Rejection { status, message } => (*status, message.clone()),
            AppError::MissingUpload => (
                StatusCode::BAD_REQUEST,
                "No file uploaded. Send the CSV file in a multipart field named `file`.".to_string(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_message();

        let body = Json(json!({
            "detail": detail,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<DetectorError> for AppError {
    fn from(err: DetectorError) -> Self {
        AppError::Detector(err)
    }
}

/// Schema violations in the JSON body (e.g. a string where a number is
/// expected) keep axum's status, 422 for typed-data errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejection {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Rejection {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Rejection {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        let err = AppError::from(DetectorError::EmptyInput);
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "CSV file is empty.");
    }

    #[test]
    fn test_not_ready_is_service_unavailable() {
        let (status, _) = AppError::from(DetectorError::NotReady).status_and_message();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_faults_do_not_leak_detail() {
        let err = AppError::from(DetectorError::Inference("row 3 is NaN".into()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("NaN"));
    }
}
