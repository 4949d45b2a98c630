mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use arbiter_common::config::JudgeConfig;
use arbiter_judge::{Judge, JavacCompiler};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

const DEFAULT_BIND: &str = "0.0.0.0:3000";

pub struct AppState {
    pub judge: Judge<JavacCompiler>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if std::env::var("ARBITER_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Arbiter API booting...");

    let config = JudgeConfig::load_default().context("Failed to load judge configuration")?;
    info!(
        javac = %config.javac_path,
        java = %config.java_path,
        test_timeout_ms = config.test_timeout_ms,
        max_parallel_tests = config.max_parallel_tests,
        "Judge configured"
    );

    let state = Arc::new(AppState {
        judge: Judge::javac(&config),
    });

    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    let addr = std::env::var("ARBITER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);
    info!("Ready to judge submissions");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
