use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mogu::api::{create_router, AppState};
use mogu::config::Config;
use mogu::db::Database;
use mogu::deals::{SearchApiClient, TextSearch};

#[derive(Parser)]
#[command(name = "mogu")]
#[command(about = "Personal dining-decision assistant")]
struct Args {
    /// Refresh the deals cache on startup instead of waiting for it to
    /// go stale
    #[arg(long)]
    refresh_deals: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mogu=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let db = Database::new(&config.database).await?;

    let search: Arc<dyn TextSearch> = Arc::new(SearchApiClient::new(&config.deals));
    if !search.is_available() {
        tracing::warn!(
            "Search provider not configured - deal listings will fall back to generic search links"
        );
    }

    let state = AppState::new(config.clone(), db, search);

    if args.refresh_deals {
        tracing::info!("Refreshing deals cache...");
        match state.deals.fetch_latest_deals(true).await {
            Ok((entries, _)) => tracing::info!("Deals cache refreshed: {} entries", entries.len()),
            Err(e) => tracing::error!("Deals refresh failed: {}", e),
        }
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Mogu starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
