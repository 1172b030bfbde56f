use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pdfplayground")]
#[command(about = "PDF Extraction Playground API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Deployment environment, selects the log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Human-readable log output
    #[default]
    Development,
    /// JSON log output
    Production,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the extraction API server
    Start {
        /// The HTTP server bind address (host:port)
        #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8000")]
        bind_address: String,
        /// The deployment environment
        #[arg(long, env = "ENV", value_enum, default_value_t = Environment::Development)]
        env: Environment,
        /// The default log level when RUST_LOG is not set
        #[arg(long, env = "LOG_LEVEL", default_value = "info")]
        log_level: String,
        /// The maximum accepted upload size in megabytes
        #[arg(long, env = "MAX_FILE_SIZE_MB", default_value_t = 50)]
        max_file_size_mb: u64,
        /// Requests per second allowed for each client
        #[arg(long, env = "RATE_LIMIT_RPS", default_value_t = 20)]
        rate_limit_rps: u32,
        /// Burst size allowed for each client
        #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = 40)]
        rate_limit_burst: u32,
        /// The number of extractions allowed to run at once
        #[arg(long, env = "MAX_CONCURRENT_EXTRACTIONS", default_value_t = 10)]
        max_concurrent_extractions: usize,
        /// Seconds before a running extraction is abandoned
        #[arg(long, env = "EXTRACT_TIMEOUT_SECS", default_value_t = 300)]
        extract_timeout_secs: u64,
    },
}
