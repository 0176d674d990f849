use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use folio::app::{self, AppState};
use folio::config::AppConfig;
use folio::db::contact_repository::MongoContactRepository;
use folio::db::repository::MongoCollectionRepository;

/// Portfolio backend: collection admin and contact intake API.
#[derive(Debug, Parser)]
#[command(name = "folio", version)]
struct Args {
    /// Optional configuration file; environment variables take precedence.
    #[arg(long, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing::info!("Starting folio server...");

    // Connect to MongoDB. The driver connects lazily: an unreachable store
    // surfaces as 503s and a failing health probe, not a startup error.
    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_url)
        .await
        .context("Invalid MongoDB connection string")?;
    let mongo_db = mongo_client.database(&config.db_name);

    tracing::info!("Using MongoDB database '{}'", config.db_name);

    let app_state = AppState {
        collection_repo: Arc::new(MongoCollectionRepository::new(&mongo_db)),
        contact_repo: Arc::new(MongoContactRepository::new(
            &mongo_db,
            &config.contact_collection,
        )),
        contact_collection: config.contact_collection.clone(),
        trust_proxy_headers: config.trust_proxy_headers,
    };

    let app = app::router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(config.cors_layer()?),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
