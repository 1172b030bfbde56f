use anyhow::Result;
use clap::Parser;
use pdfplayground::cli;
use pdfplayground::server::{self, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = cli::Cli::parse();
    // Run the specified command
    match cli.command {
        cli::Commands::Start {
            bind_address,
            env,
            log_level,
            max_file_size_mb,
            rate_limit_rps,
            rate_limit_burst,
            max_concurrent_extractions,
            extract_timeout_secs,
        } => {
            // Create the server config
            let config = ServerConfig {
                bind_address,
                env,
                log_level,
                max_file_size_mb,
                rate_limit_rps,
                rate_limit_burst,
                max_concurrent_extractions,
                extract_timeout_secs,
            };
            server::start_server(config).await
        }
    }
}
