use tracing::{info, warn};

use findit_api::{AppConfig, AppState};
use findit_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "findit_server=debug,findit_api=debug,findit_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let config = AppConfig::from_env();
    info!(
        db = %config.db_path.display(),
        static_dir = %config.static_dir.display(),
        upload_dir = %config.upload_dir.display(),
        "Loaded configuration"
    );
    if config.uses_dev_secret() {
        warn!("FINDIT_SECRET_KEY is unset; session cookies are signed with the development key");
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Init database and seed reference data before accepting requests
    let db = Database::open(&config.db_path)?;
    db.seed(config.seed_samples)?;

    let addr = config.bind_addr();
    let app = findit_api::router(AppState::new(db, config));

    info!("Findit listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
