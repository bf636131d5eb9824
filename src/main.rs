//! Server bootstrap: logging, configuration, state, router, serve.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use portcullis::{router, seed_admin, AppConfig, AppState, InMemoryUserStore, SecureRouter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logging, filter from the environment
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,portcullis=debug".into()),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();

    let store = Arc::new(InMemoryUserStore::new());
    seed_admin(store.as_ref(), &config.admin_password)?;

    let state = AppState::new(config, store)?;

    let app = router(state)
        .with_security_headers()
        .with_rate_limiting(100, 20)
        .with_request_timeout(Duration::from_secs(30))
        .with_body_limit(1024 * 1024)
        .with_cors_and_tracing();

    info!(address = %bind_addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
