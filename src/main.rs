//! FacilityHub Console — realtime notification and chat delivery client.
//!
//! Main entry point: loads configuration, wires the REST collaborators and
//! the broker connection into a session feed, and runs until interrupted.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use facilityhub_api::{ApiClient, HttpChatApi, HttpNotificationApi};
use facilityhub_core::config::AppConfig;
use facilityhub_core::error::AppError;
use facilityhub_core::types::UserId;
use facilityhub_entity::session::{Role, Session};
use facilityhub_realtime::{ConnectionManager, PresenceMap};
use facilityhub_sync::{ChatSynchronizer, NotificationAggregator, SessionFeed};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Console error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("FACILITYHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    let env = std::env::var("FACILITYHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let mut config = AppConfig::load(&config_path)
        .map_err(|e| AppError::configuration(format!("Config load error: {}", e)))?;

    let env_config_path = format!("config/{}.toml", env);
    if std::path::Path::new(&env_config_path).exists() {
        let env_config = AppConfig::load(&env_config_path)
            .map_err(|e| AppError::configuration(format!("Env config load error: {}", e)))?;
        config.merge(env_config);
    }

    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FacilityHub console v{}", env!("CARGO_PKG_VERSION"));

    let session = Session::new(
        UserId::new(config.session.user_id),
        config.session.name.clone(),
        Role::new(config.session.role.clone()),
    );

    // REST collaborators share one HTTP client.
    let client = ApiClient::new(&config.api)?;
    let notifications = Arc::new(NotificationAggregator::new(Arc::new(
        HttpNotificationApi::new(client.clone()),
    )));
    let chat = Arc::new(ChatSynchronizer::new(
        Arc::new(HttpChatApi::new(client.clone())),
        client.page_size,
    ));
    let presence = Arc::new(PresenceMap::new());

    // A broker that is down means no realtime updates, not a dead console.
    let manager = ConnectionManager::new(config.broker.clone());
    let feed = match manager.open(&session).await {
        Ok(connection) => Some(
            SessionFeed::attach(
                Arc::new(connection),
                Arc::clone(&notifications),
                Arc::clone(&chat),
                Arc::clone(&presence),
                session.clone(),
            )
            .await?,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Broker unreachable, running without realtime updates");
            if let Err(e) = notifications.refresh().await {
                tracing::warn!(error = %e, "Initial notification fetch failed");
            }
            if let Err(e) = chat.refresh_rooms().await {
                tracing::warn!(error = %e, "Initial room list fetch failed");
            }
            None
        }
    };

    tracing::info!(
        unread_notifications = notifications.unread_count(&session).await,
        unread_messages = chat.unread_total().await,
        "FacilityHub console running"
    );

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, disconnecting...");

    if let Some(feed) = feed {
        feed.shutdown().await;
    }

    tracing::info!("FacilityHub console shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
