use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use metrics::counter;
use tracing::{debug, info};

use crate::extract::ExtractionResult;
use crate::models::{Catalog, ModelId, model_names};
use crate::server::dto::{
    FileInfo, HealthResponse, ModelsResponse, RootResponse, UploadResponse,
};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::utils::{bytes_to_mb, utc_timestamp};

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "pdf-extraction-api";

/// Root endpoint, a minimal liveness check
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "healthy",
        message: "PDF Extraction Playground API",
        timestamp: utc_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint for load balancer health status checking
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: utc_timestamp(),
        models_available: ModelId::ALL.to_vec(),
    })
}

/// List available extraction models with their capabilities
pub async fn models() -> Json<ModelsResponse> {
    Json(ModelsResponse { models: Catalog })
}

/// Validate an uploaded PDF without extracting it
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let upload = form.validate(state.max_file_size_bytes(), state.max_file_size_mb)?;
    let size_bytes = upload.bytes.len() as u64;
    // Output debugging information
    info!(
        filename = %upload.filename,
        size_kb = %format!("{:.2}", size_bytes as f64 / 1024.0),
        model = %upload.model,
        "Received PDF"
    );
    counter!("pdfplayground.total_uploads").increment(1);
    Ok(Json(UploadResponse {
        status: "success",
        message: "PDF uploaded and validated successfully",
        file_info: FileInfo {
            filename: upload.filename,
            size_bytes,
            size_mb: bytes_to_mb(size_bytes),
            model_selected: upload.model,
        },
        next_steps: "File ready for extraction. Call /extract endpoint.",
    }))
}

/// Extract the content of an uploaded PDF with the selected model
pub async fn extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let upload = form.validate(state.max_file_size_bytes(), state.max_file_size_mb)?;
    // Output debugging information
    info!(
        filename = %upload.filename,
        model = %upload.model,
        "Starting extraction"
    );
    let result = state
        .pool
        .extract(upload.model, upload.bytes, upload.filename)
        .await?;
    Ok(Json(result))
}

/// Raw multipart fields of an upload request
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    model: Option<String>,
}

/// An upload that passed validation
#[derive(Debug)]
struct ValidatedUpload {
    filename: String,
    bytes: Bytes,
    model: ModelId,
}

impl UploadForm {
    /// Collect the `file` and `model` fields, ignoring any others
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    // A plain form value in the file slot is not a file
                    let Some(filename) = field.file_name().map(str::to_string) else {
                        return Err(ApiError::MissingField("file"));
                    };
                    let bytes = field.bytes().await?;
                    form.file = Some((filename, bytes));
                }
                "model" => {
                    form.model = Some(field.text().await?);
                }
                other => {
                    debug!(field = other, "Ignoring unexpected multipart field");
                }
            }
        }
        Ok(form)
    }

    /// Check file presence, type, size and model, in that order
    fn validate(self, max_bytes: u64, max_mb: u64) -> Result<ValidatedUpload, ApiError> {
        let (filename, bytes) = self.file.ok_or(ApiError::MissingField("file"))?;
        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ApiError::BadRequest(
                "Only PDF files are supported".to_string(),
            ));
        }
        if bytes.len() as u64 > max_bytes {
            return Err(ApiError::BadRequest(format!(
                "File size exceeds maximum allowed size of {:.1}MB",
                max_mb as f64
            )));
        }
        let model = match self.model {
            Some(name) => name.parse::<ModelId>().map_err(|_| {
                ApiError::BadRequest(format!("Invalid model. Choose from: {}", model_names()))
            })?,
            None => ModelId::default(),
        };
        Ok(ValidatedUpload {
            filename,
            bytes,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(filename: &str, size: usize, model: Option<&str>) -> UploadForm {
        UploadForm {
            file: Some((filename.to_string(), Bytes::from(vec![0u8; size]))),
            model: model.map(str::to_string),
        }
    }

    fn detail(err: ApiError) -> String {
        err.to_string()
    }

    #[test]
    fn accepts_pdf_with_default_model() {
        let upload = form("paper.pdf", 10, None).validate(100, 1).unwrap();
        assert_eq!(upload.filename, "paper.pdf");
        assert_eq!(upload.model, ModelId::Docling);
        assert_eq!(upload.bytes.len(), 10);
    }

    #[test]
    fn accepts_uppercase_extension() {
        let upload = form("SCAN.PDF", 1, Some("surya")).validate(100, 1).unwrap();
        assert_eq!(upload.model, ModelId::Surya);
    }

    #[test]
    fn missing_file_is_reported_first() {
        let err = UploadForm {
            file: None,
            model: Some("bogus".into()),
        }
        .validate(100, 1)
        .unwrap_err();
        assert!(matches!(err, ApiError::MissingField("file")));
    }

    #[test]
    fn rejects_non_pdf_before_size_and_model() {
        let err = form("notes.txt", 1_000, Some("bogus"))
            .validate(100, 1)
            .unwrap_err();
        assert_eq!(detail(err), "Only PDF files are supported");
    }

    #[test]
    fn rejects_oversized_file_before_model() {
        let err = form("big.pdf", 101, Some("bogus"))
            .validate(100, 50)
            .unwrap_err();
        assert_eq!(
            detail(err),
            "File size exceeds maximum allowed size of 50.0MB"
        );
    }

    #[test]
    fn accepts_file_at_exact_limit() {
        assert!(form("edge.pdf", 100, None).validate(100, 1).is_ok());
    }

    #[test]
    fn rejects_unknown_model() {
        let err = form("a.pdf", 1, Some("tesseract"))
            .validate(100, 1)
            .unwrap_err();
        assert_eq!(
            detail(err),
            "Invalid model. Choose from: docling, surya, mineru"
        );
    }

    #[test]
    fn rejects_empty_model() {
        assert!(form("a.pdf", 1, Some("")).validate(100, 1).is_err());
    }
}
