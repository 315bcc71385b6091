use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plant_scan_common::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlantScanError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Gemini API key is not set. Run `plant-scan config --set-api-key YOUR_KEY` or set GEMINI_API_KEY")]
    MissingApiKey,

    #[error("No file uploaded")]
    MissingUpload,

    #[error("Uploaded file is not a supported image: {0}")]
    InvalidUpload(String),

    #[error("No analysis data provided")]
    MissingResults,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Image load error: {0}")]
    ImageLoad(String),

    #[error("Image fetch error: {0}")]
    ImageFetch(String),

    #[error("API call error: {0}")]
    ApiCall(String),

    #[error("API response parse error: {0}")]
    ApiParse(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    #[error("PDF generation error: {0}")]
    PdfGeneration(String),

    #[error(transparent)]
    Common(#[from] plant_scan_common::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlantScanError>;

impl PlantScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlantScanError::MissingUpload
            | PlantScanError::InvalidUpload(_)
            | PlantScanError::MissingResults
            | PlantScanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PlantScanError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// クライアント起因のエラーか
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for PlantScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "rejected request");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        for err in [
            PlantScanError::MissingUpload,
            PlantScanError::InvalidUpload("text/plain".into()),
            PlantScanError::MissingResults,
            PlantScanError::InvalidRequest("bad json".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{:?}", err);
            assert!(err.is_client_error());
        }
        assert_eq!(
            PlantScanError::PayloadTooLarge("10 MiB".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_server_errors_map_to_500() {
        for err in [
            PlantScanError::ApiCall("quota exceeded".into()),
            PlantScanError::Timeout { operation: "analysis", seconds: 3 },
            PlantScanError::PdfGeneration("font".into()),
            PlantScanError::MissingApiKey,
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{:?}", err);
        }
    }

    #[test]
    fn test_timeout_message() {
        let err = PlantScanError::Timeout { operation: "analysis", seconds: 120 };
        assert_eq!(err.to_string(), "analysis timed out after 120s");
    }
}
