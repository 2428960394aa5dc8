//! Freight desk server

use std::io::ErrorKind;
use std::sync::Arc;

use freight_desk::api::{build_router, AppState};
use freight_desk::config::{AppConfig, ServerConfig};
use freight_desk::database::Database;
use freight_desk::errors::FreightDeskError;
use freight_desk::fetchers::Fetchers;
use freight_desk::scheduler;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), FreightDeskError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let db = Database::connect(&config.database).await?;
    let fetchers = Fetchers::new(&db, &config.sources);

    let _background = if config.schedule.enabled {
        scheduler::spawn_fetch_cycles(fetchers.clone(), config.schedule.interval)
    } else if config.sources.use_mock_data {
        vec![scheduler::seed_mock_data(fetchers.clone())]
    } else {
        Vec::new()
    };

    let app = build_router(Arc::new(AppState::new(db, fetchers))).layer(TraceLayer::new_for_http());

    let listener = bind(&config.server).await?;
    info!("Freight desk listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
            }
        })
        .await?;

    Ok(())
}

/// Bind the primary port, or the backup port when the primary is taken
async fn bind(server: &ServerConfig) -> Result<TcpListener, FreightDeskError> {
    match TcpListener::bind((server.host.as_str(), server.port)).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == ErrorKind::AddrInUse => {
            warn!(
                "Port {} is in use, trying port {}",
                server.port, server.backup_port
            );
            Ok(TcpListener::bind((server.host.as_str(), server.backup_port)).await?)
        }
        Err(e) => Err(e.into()),
    }
}
