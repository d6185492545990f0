//! Practice Server
//!
//! Runs the interview-practice backend as a standalone HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dsa_practice::api::{self, AppState};
use dsa_practice::config::{GeminiConfig, SandboxConfig};
use dsa_practice::gemini::GeminiClient;
use dsa_practice::sandbox::DockerSandbox;

#[derive(Parser, Debug)]
#[command(name = "practice-server")]
#[command(about = "AI-assisted coding interview practice backend")]
struct Args {
    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "PRACTICE_HOST")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 8080, env = "PRACTICE_PORT")]
    port: u16,

    /// Memory limit for sandboxed submission runs
    #[arg(long, default_value = "512m", env = "SANDBOX_MEMORY_LIMIT")]
    sandbox_memory: String,

    /// CPU limit for sandboxed submission runs (1.0 = one core)
    #[arg(long, default_value_t = 1.0, env = "SANDBOX_CPU_LIMIT")]
    sandbox_cpus: f64,

    /// Wall-clock timeout for sandboxed submission runs, in seconds
    #[arg(long, default_value_t = 10, env = "SANDBOX_TIMEOUT_SECS")]
    sandbox_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let gemini_config = GeminiConfig::from_env()
        .context("GEMINI_API_KEY is not set; refusing to start without a credential")?;
    let gemini = GeminiClient::new(gemini_config)?;

    let sandbox_config = SandboxConfig {
        memory_limit: args.sandbox_memory.clone(),
        cpu_limit: args.sandbox_cpus,
        timeout_secs: args.sandbox_timeout_secs,
        ..Default::default()
    };
    let sandbox = DockerSandbox::new(sandbox_config)
        .await
        .context("Failed to connect to Docker; the sandbox requires a local daemon")?;

    let state = Arc::new(AppState {
        gemini,
        executor: Box::new(sandbox),
    });

    let addr = format!("{}:{}", args.host, args.port);
    info!(host = %args.host, port = args.port, "Starting practice server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, api::router(state))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
