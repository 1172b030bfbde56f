use axum::body::Bytes;
use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info};

use super::{ExtractionError, ExtractionResult, Extractor};
use crate::models::ModelId;

/// Runs extractions on the blocking thread pool with a concurrency cap and a deadline
#[derive(Clone)]
pub struct ExtractionPool {
    extractor: Extractor,
    permits: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    timeout: Duration,
}

/// An extraction holding a slot, released when dropped even if the engine panics
struct ActiveExtraction {
    active: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl ActiveExtraction {
    fn start(active: Arc<AtomicUsize>, permit: OwnedSemaphorePermit) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        gauge!("pdfplayground.active_extractions").increment(1.0);
        Self {
            active,
            _permit: permit,
        }
    }
}

impl Drop for ActiveExtraction {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        gauge!("pdfplayground.active_extractions").decrement(1.0);
    }
}

impl ExtractionPool {
    pub fn new(extractor: Extractor, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            extractor,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            active: Arc::new(AtomicUsize::new(0)),
            timeout,
        }
    }

    /// Number of extraction slots currently free
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Number of extractions currently running
    pub fn active_extractions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Extract a document, waiting for a free slot first
    pub async fn extract(
        &self,
        model: ModelId,
        pdf_bytes: Bytes,
        filename: String,
    ) -> Result<ExtractionResult, ExtractionError> {
        // Wait for a free extraction slot
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ExtractionError::Engine {
                engine: "pool".to_string(),
                message: e.to_string(),
            })?;
        // Output debugging information
        debug!(
            model = %model,
            filename = %filename,
            size_bytes = pdf_bytes.len(),
            "Extraction slot acquired"
        );
        let guard = ActiveExtraction::start(self.active.clone(), permit);
        counter!("pdfplayground.total_extractions").increment(1);
        // Start the measurement timer
        let start_time = Instant::now();
        // The guard moves into the task so the slot stays taken until the work ends
        let extractor = self.extractor.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            extractor.extract(model, &pdf_bytes, &filename)
        });
        // Wait for the extraction to complete or time out
        let outcome = tokio::time::timeout(self.timeout, task).await;
        let duration = start_time.elapsed();
        histogram!("pdfplayground.extraction_duration_ms").record(duration.as_millis() as f64);
        match outcome {
            Ok(Ok(result)) => {
                if result.is_ok() {
                    info!(
                        model = %model,
                        duration_ms = duration.as_millis(),
                        "Extraction succeeded"
                    );
                }
                result
            }
            Ok(Err(e)) => {
                error!(model = %model, error = %e, "Extraction task failed");
                Err(ExtractionError::Panicked)
            }
            Err(_) => {
                error!(
                    model = %model,
                    timeout_secs = self.timeout.as_secs(),
                    "Extraction timed out"
                );
                Err(ExtractionError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}
