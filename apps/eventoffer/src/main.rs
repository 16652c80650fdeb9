use anyhow::Context;
use tracing::{info, warn};

use eventoffer_core::bootstrap::bootstrap_from_env;
use eventoffer_router::app_router;
use eventoffer_storage::db::redact_dsn;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("eventoffer failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let boot = bootstrap_from_env().await?;
    let global = &boot.state.global;
    info!(
        host = %global.host,
        port = global.port,
        dsn = %redact_dsn(&global.dsn),
        require_auth = global.require_auth,
        realm = %global.auth.realm,
        "config loaded"
    );

    let bind = format!("{}:{}", global.host, global.port);
    let app = app_router(boot.state.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(addr = %bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    info!("shut down");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eventoffer=info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
