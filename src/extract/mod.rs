//! Document extraction: element model, engine dispatch and text-layer fallback.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::models::ModelId;
use crate::utils::duration_ms;

mod pool;
mod text_layer;

pub use pool::ExtractionPool;
pub use text_layer::TextLayerEngine;

/// Model name reported when the text-layer fallback produced the result
pub const FALLBACK_MODEL: &str = "text_layer_fallback";

/// Errors raised while extracting a document
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
    #[error("{engine} engine failed: {message}")]
    Engine { engine: String, message: String },
    #[error("extraction task panicked")]
    Panicked,
    #[error("extraction timed out after {0}s")]
    Timeout(u64),
}

/// Spatial coordinates of an extracted region
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub page: u32,
}

/// Kind of a document element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Title,
    Header,
    Paragraph,
    Table,
    Figure,
    List,
    Caption,
}

impl ElementKind {
    /// Map an engine label onto an element kind, defaulting to paragraph
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "title" => ElementKind::Title,
            "heading" => ElementKind::Header,
            "table" => ElementKind::Table,
            "figure" => ElementKind::Figure,
            "list" => ElementKind::List,
            "caption" => ElementKind::Caption,
            _ => ElementKind::Paragraph,
        }
    }
}

/// A single extracted document element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub content: String,
    pub bbox: Option<BoundingBox>,
    pub page: u32,
    pub confidence: Option<f64>,
}

impl ExtractedElement {
    pub fn new(kind: ElementKind, content: impl Into<String>, page: u32) -> Self {
        Self {
            kind,
            content: content.into(),
            bbox: None,
            page,
            confidence: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Element counts for an extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_elements: usize,
    pub titles: usize,
    pub headers: usize,
    pub paragraphs: usize,
    pub tables: usize,
    pub figures: usize,
    pub lists: usize,
    pub total_pages: u32,
}

/// Extra details about an extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMetadata {
    pub total_pages: u32,
    pub total_elements: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The response body of a completed extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub status: &'static str,
    pub model: String,
    pub filename: String,
    pub markdown: String,
    pub elements: Vec<ExtractedElement>,
    pub statistics: Statistics,
    pub processing_time_ms: f64,
    pub metadata: ExtractionMetadata,
}

/// Raw output of an engine before statistics and timing are attached
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub elements: Vec<ExtractedElement>,
    /// Page count known to the engine, when it differs from the element pages
    pub total_pages: Option<u32>,
    /// Markdown rendered by the engine itself
    pub markdown: Option<String>,
}

/// A document extraction backend
pub trait Engine: Send + Sync {
    /// Name of the engine used in logs
    fn name(&self) -> &str;

    /// Extract elements from the PDF bytes
    fn extract(&self, pdf_bytes: &[u8], filename: &str) -> Result<Extraction, ExtractionError>;
}

/// Render elements as markdown
pub fn generate_markdown(elements: &[ExtractedElement]) -> String {
    elements
        .iter()
        .map(|e| match e.kind {
            ElementKind::Title => format!("# {}\n", e.content),
            ElementKind::Header => format!("## {}\n", e.content),
            ElementKind::Paragraph => format!("{}\n", e.content),
            ElementKind::List => format!("- {}\n", e.content),
            ElementKind::Table => format!("\n{}\n", e.content),
            ElementKind::Figure => format!("![Figure]({})\n", e.content),
            ElementKind::Caption => format!("*{}*\n", e.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Count elements by kind
pub fn calculate_stats(elements: &[ExtractedElement]) -> Statistics {
    let mut stats = Statistics {
        total_elements: elements.len(),
        total_pages: elements.iter().map(|e| e.page).max().unwrap_or(1),
        ..Default::default()
    };
    for element in elements {
        match element.kind {
            ElementKind::Title => stats.titles += 1,
            ElementKind::Header => stats.headers += 1,
            ElementKind::Paragraph => stats.paragraphs += 1,
            ElementKind::Table => stats.tables += 1,
            ElementKind::Figure => stats.figures += 1,
            ElementKind::List => stats.lists += 1,
            ElementKind::Caption => {}
        }
    }
    stats
}

/// Dispatches documents to the engine registered for each model
#[derive(Clone)]
pub struct Extractor {
    engines: HashMap<ModelId, Arc<dyn Engine>>,
    fallback: Arc<dyn Engine>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create an extractor with no model engines and the text-layer fallback
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
            fallback: Arc::new(TextLayerEngine),
        }
    }

    /// Register the engine serving a model
    pub fn with_engine(mut self, model: ModelId, engine: Arc<dyn Engine>) -> Self {
        self.engines.insert(model, engine);
        self
    }

    /// Replace the fallback engine
    pub fn with_fallback(mut self, engine: Arc<dyn Engine>) -> Self {
        self.fallback = engine;
        self
    }

    /// Extract a document with the engine for `model`, falling back to the text layer
    pub fn extract(
        &self,
        model: ModelId,
        pdf_bytes: &[u8],
        filename: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        // Start the measurement timer
        let start_time = Instant::now();
        // Try the engine registered for this model
        if let Some(engine) = self.engines.get(&model) {
            debug!(model = %model, engine = engine.name(), filename, "Running extraction engine");
            match engine.extract(pdf_bytes, filename) {
                Ok(extraction) => {
                    return Ok(build_result(
                        model.as_str(),
                        filename,
                        extraction,
                        start_time,
                        None,
                    ));
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Extraction engine failed, using fallback");
                }
            }
        } else {
            info!(model = %model, "No engine registered for model, using fallback");
        }
        // Fall back to the document text layer
        metrics::counter!("pdfplayground.total_fallbacks").increment(1);
        let extraction = self.fallback.extract(pdf_bytes, filename)?;
        Ok(build_result(
            FALLBACK_MODEL,
            filename,
            extraction,
            start_time,
            Some(format!("Fallback extraction used ({model} unavailable)")),
        ))
    }
}

fn build_result(
    model: &str,
    filename: &str,
    extraction: Extraction,
    start_time: Instant,
    note: Option<String>,
) -> ExtractionResult {
    let Extraction {
        elements,
        total_pages,
        markdown,
    } = extraction;
    let mut statistics = calculate_stats(&elements);
    if let Some(pages) = total_pages {
        statistics.total_pages = pages;
    }
    let markdown = markdown.unwrap_or_else(|| generate_markdown(&elements));
    let metadata = ExtractionMetadata {
        total_pages: statistics.total_pages,
        total_elements: elements.len(),
        note,
    };
    info!(
        model,
        filename,
        total_elements = elements.len(),
        total_pages = statistics.total_pages,
        "Extraction completed"
    );
    ExtractionResult {
        status: "success",
        model: model.to_string(),
        filename: filename.to_string(),
        markdown,
        elements,
        statistics,
        processing_time_ms: duration_ms(start_time.elapsed()),
        metadata,
    }
}
