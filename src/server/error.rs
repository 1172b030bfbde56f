//! API error type and its JSON response conversion.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde::Serialize;
use tracing::error;

use crate::extract::ExtractionError;

/// Errors returned by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Field required: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("Extraction failed: {0}")]
    Extraction(String),
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body, `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingField(_) | ApiError::Extraction(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Multipart(e) => e.status(),
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        counter!("pdfplayground.total_errors").increment(1);
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(message) => {
                error!(error = %message, "Internal error while handling request");
                "Internal server error".to_string()
            }
            ApiError::Multipart(e) => e.body_text(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Timeout(secs) => ApiError::Timeout(secs),
            ExtractionError::Panicked => ApiError::Internal(err.to_string()),
            other => ApiError::Extraction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let response = ApiError::BadRequest("Only PDF files are supported".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["detail"], "Only PDF files are supported");
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response = ApiError::Internal("db password leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["detail"], "Internal server error");
    }

    #[test]
    fn extraction_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(ExtractionError::Timeout(300)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(ExtractionError::Panicked).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let parsing = ApiError::from(ExtractionError::PdfParsing("bad xref".into()));
        assert_eq!(parsing.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            parsing.to_string(),
            "Extraction failed: PDF parsing failed: bad xref"
        );
    }

    #[test]
    fn missing_field_names_field() {
        assert_eq!(
            ApiError::MissingField("file").to_string(),
            "Field required: file"
        );
    }
}
