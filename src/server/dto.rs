//! Response bodies for the HTTP endpoints.

use serde::Serialize;

use crate::models::{Catalog, ModelId};

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub models_available: Vec<ModelId>,
}

/// Body of `GET /models`
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Catalog,
}

/// Details of a validated upload
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub model_selected: ModelId,
}

/// Body of `POST /upload`
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub file_info: FileInfo,
    pub next_steps: &'static str,
}
