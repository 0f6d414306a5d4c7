use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cooktips::app::identity::IdentityService;
use cooktips::config::{AppConfig, StoreBackend};
use cooktips::domain::{tip::Tip, user::UserProfile};
use cooktips::infra::{db::Db, documents::PgDocumentStore};
use cooktips::{http, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let identity = IdentityService::new(config.paseto_access_key, config.access_ttl_minutes);

    let state = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let db = Db::connect(&config, database_url).await?;
            db.migrate().await?;
            AppState {
                tips: Arc::new(PgDocumentStore::<Tip>::new(db.clone())),
                users: Arc::new(PgDocumentStore::<UserProfile>::new(db)),
                identity,
                admin_token: config.admin_token.clone(),
            }
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            AppState::in_memory(identity, config.admin_token.clone())
        }
    };

    if state.admin_token.is_none() {
        tracing::info!("ADMIN_TOKEN not set; featured flag cannot be changed");
    }

    let app: Router = http::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
