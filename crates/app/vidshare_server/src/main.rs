//! vidshare API server binary.
//!
//! Connects to PostgreSQL (or runs on an in-memory store with
//! `--in-memory`), applies migrations and serves the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use vidshare_api::config::ApiConfig;
use vidshare_api::{AppState, router};
use vidshare_core::auth::TokenService;
use vidshare_core::media::{CloudinaryConfig, CloudinaryStore, DiskMediaStore, MediaStore};
use vidshare_core::store::{MemoryStore, PgStore, UserStore};

/// CLI arguments for the API server. Unset values fall back to the
/// environment (see `ApiConfig::from_env`).
#[derive(Parser, Debug)]
#[command(name = "vidshare_server", about = "vidshare HTTP API server")]
struct Args {
    /// Address to listen on, e.g. `0.0.0.0:8000`.
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Directory for uploaded media when Cloudinary is not configured.
    #[arg(long, env = "MEDIA_DIR", default_value = "media")]
    media_dir: PathBuf,

    /// Public base URL under which `--media-dir` is served.
    #[arg(long, env = "MEDIA_BASE_URL")]
    media_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vidshare_api=debug,vidshare_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    let store: Arc<dyn UserStore> = if args.in_memory {
        warn!("using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        info!(
            max_connections = args.max_connections,
            "connecting to PostgreSQL"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!("running database migrations");
        vidshare_api::migrate(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    let media: Arc<dyn MediaStore> = match CloudinaryConfig::from_env() {
        Some(cloudinary) => {
            info!(cloud = %cloudinary.cloud_name, "uploading media to Cloudinary");
            Arc::new(CloudinaryStore::new(reqwest::Client::new(), cloudinary))
        }
        None => {
            let base_url = args
                .media_base_url
                .unwrap_or_else(|| format!("http://{}/media", config.bind_addr));
            info!(dir = %args.media_dir.display(), %base_url, "storing media on disk");
            config.media_dir = Some(args.media_dir.clone());
            Arc::new(DiskMediaStore::new(args.media_dir, base_url))
        }
    };

    if !config.cookie_secure {
        warn!("auth cookies are sent without the Secure attribute");
    }

    let tokens = TokenService::new(store.clone(), config.tokens.clone())?;
    let state = AppState {
        store,
        tokens,
        media,
        config: config.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
