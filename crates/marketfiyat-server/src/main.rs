mod auth;
mod server;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use crate::auth::{require_bearer_auth, AuthState};
use crate::server::PriceMcpServer;

#[derive(Debug, Parser)]
#[command(name = "marketfiyat-server")]
#[command(about = "MCP server aggregating grocery prices across nearby stores")]
struct Cli {
    /// Listen host for the SSE transport.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Listen port for the SSE transport.
    #[arg(long, env = "MCP_SERVER_PORT", default_value_t = 8071)]
    port: u16,
    /// Transport to serve: `sse` (network, authenticated) or `stdio`.
    #[arg(long, value_enum, default_value = "sse")]
    transport: Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Sse,
    Stdio,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = marketfiyat_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout belongs to the stdio transport; logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // One upstream client for the whole process; every tool invocation shares
    // its connection pool.
    let api = Arc::new(marketfiyat_client::MarketApiClient::new(
        &config.nearest_url,
        &config.search_url,
        config.request_timeout_secs,
        config.search_page_size,
    )?);
    let service = PriceMcpServer::new(Arc::clone(&api));

    match cli.transport {
        Transport::Stdio => run_stdio(service).await?,
        Transport::Sse => {
            let auth = AuthState::from_config(&config)?;
            run_sse(service, auth, &cli.host, cli.port).await?;
        }
    }

    // Last owner of the upstream client; dropping it closes the connection
    // pool exactly once, whichever transport just exited.
    drop(api);
    tracing::info!("shutdown complete");
    Ok(())
}

async fn run_stdio(service: PriceMcpServer) -> anyhow::Result<()> {
    tracing::info!("starting MCP server on stdio transport");
    let running = service
        .serve(stdio())
        .await
        .context("failed to start stdio transport")?;
    running.waiting().await?;
    Ok(())
}

async fn run_sse(
    service: PriceMcpServer,
    auth: AuthState,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    use rmcp::transport::sse_server::{SseServer, SseServerConfig};
    use tokio_util::sync::CancellationToken;

    let addr: std::net::SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let sse_config = SseServerConfig {
        bind: addr,
        sse_path: "/sse".to_string(),
        post_path: "/message".to_string(),
        ct: CancellationToken::new(),
        sse_keep_alive: None,
    };

    let (sse_server, router) = SseServer::new(sse_config);
    // Token verification runs before any MCP handling.
    let auth_enabled = auth.enabled();
    let router = router.layer(axum::middleware::from_fn_with_state(
        auth,
        require_bearer_auth,
    ));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, auth = auth_enabled, "starting MCP server on SSE transport");

    let ct = sse_server.config.ct.clone();
    let shutdown_ct = ct.child_token();
    let http = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_ct.cancelled().await;
    });
    tokio::spawn(async move {
        if let Err(e) = http.await {
            tracing::error!(error = %e, "sse http server terminated");
        }
    });

    let service_ct = sse_server.with_service(move || service.clone());

    shutdown_signal().await;
    service_ct.cancel();
    ct.cancel();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
