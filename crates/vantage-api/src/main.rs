//! `vantage-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use anyhow::Result;

use vantage_api::config::Config;
use vantage_api::server::Server;
use vantage_core::observability::{init_logging, LogFormat};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(choose_log_format(&config));

    let server = Server::with_memory_stores(config.clone());

    if config.debug {
        let admin = server.state().seed_admin().await?;
        tracing::warn!(
            uuid = %admin.uuid,
            "Debug mode: seeded administrator; authenticate with the X-User-Id header"
        );
    }

    server.serve().await
}
