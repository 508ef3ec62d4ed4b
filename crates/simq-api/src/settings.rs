//! # Server Settings
//!
//! Command-line and environment configuration for the server binary.

use clap::Parser;

/// Runtime settings for the simq server.
#[derive(Debug, Clone, Parser)]
#[command(name = "simq-api", about = "Simulation job orchestration service")]
pub struct Settings {
    /// Port the HTTP server binds to.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Base URL of the artifact store.
    #[arg(long, env = "TDS_URL", default_value = "http://data-service:8000")]
    pub artifact_store_url: String,

    /// Basic-auth username for the artifact store.
    #[arg(long, env = "TDS_USER")]
    pub artifact_store_user: Option<String>,

    /// Basic-auth password for the artifact store.
    #[arg(long, env = "TDS_PASSWORD")]
    pub artifact_store_password: Option<String>,

    /// Run against an in-memory artifact store instead of HTTP.
    #[arg(long, env = "SIMQ_STANDALONE")]
    pub standalone: bool,
}
