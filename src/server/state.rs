use std::time::Duration;

use crate::extract::{ExtractionPool, Extractor};
use crate::server::ServerConfig;
use crate::utils::BYTES_PER_MB;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub pool: ExtractionPool,
    /// Largest accepted upload in megabytes
    pub max_file_size_mb: u64,
}

impl AppState {
    /// Build the handler state from the server configuration
    pub fn from_config(config: &ServerConfig, extractor: Extractor) -> Self {
        Self {
            pool: ExtractionPool::new(
                extractor,
                config.max_concurrent_extractions,
                Duration::from_secs(config.extract_timeout_secs),
            ),
            max_file_size_mb: config.max_file_size_mb,
        }
    }

    /// Largest accepted upload in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }
}
