use clap::Parser;
use facetfence_core::RobotsTxtPolicy;
use facetfence_service::{build_router, ServiceConfig, ServiceState, DEFAULT_MAX_BODY_BYTES};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "facetfence_service=info,facetfence::intake=info,info";

#[derive(Debug, Parser)]
#[command(name = "facetfenced", version, about = "FacetFence policy and intake REST service")]
struct Cli {
    /// REST socket address to bind, e.g. 127.0.0.1:8095
    #[arg(long, default_value = "127.0.0.1:8095", env = "FACETFENCE_LISTEN")]
    listen: SocketAddr,
    /// Maximum accepted request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "FACETFENCE_MAX_BODY_BYTES")]
    max_body_bytes: usize,
    /// robots.txt disallow rule to publish; repeat or comma-separate.
    /// Defaults to `/search` and `/*?utm_*`.
    #[arg(long = "robots-disallow", env = "FACETFENCE_ROBOTS_DISALLOW", value_delimiter = ',')]
    robots_disallow: Vec<String>,
    /// Emit log lines as JSON.
    #[arg(long, default_value_t = false, env = "FACETFENCE_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let robots = if cli.robots_disallow.is_empty() {
        RobotsTxtPolicy::default()
    } else {
        RobotsTxtPolicy::new(cli.robots_disallow)
    };
    let config = ServiceConfig {
        max_body_bytes: cli.max_body_bytes,
        robots,
    };
    let state = ServiceState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("facetfence-service REST listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
