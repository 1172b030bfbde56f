use tracing::debug;

use super::{ElementKind, Engine, ExtractedElement, Extraction, ExtractionError};

/// Extracts the embedded text layer of a digital PDF, one paragraph per page.
///
/// Produces no bounding boxes. Scanned documents without a text layer yield
/// no elements but still report their page count.
pub struct TextLayerEngine;

impl Engine for TextLayerEngine {
    fn name(&self) -> &str {
        "text_layer"
    }

    fn extract(&self, pdf_bytes: &[u8], filename: &str) -> Result<Extraction, ExtractionError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

        let total_pages = page_texts.len() as u32;
        let mut elements = Vec::new();
        let mut markdown_parts = Vec::new();

        for (page_num, text) in (1u32..).zip(page_texts.iter()) {
            let content = text.trim();
            if content.is_empty() {
                continue;
            }
            elements.push(ExtractedElement::new(ElementKind::Paragraph, content, page_num));
            markdown_parts.push(format!("## Page {page_num}\n\n{text}\n"));
        }

        debug!(
            filename,
            total_pages,
            text_pages = elements.len(),
            "Extracted PDF text layer"
        );

        Ok(Extraction {
            elements,
            total_pages: Some(total_pages),
            markdown: Some(markdown_parts.join("\n")),
        })
    }
}
