use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use artifacta_api::auth::{FirebaseVerifier, IdentityVerifier};
use artifacta_api::config::AppConfig;
use artifacta_api::database::{ArtifactStore, MemoryStore, MongoStore};
use artifacta_api::state::AppState;

#[derive(Parser)]
#[command(name = "artifacta-api")]
#[command(about = "REST API for the Artifacta historical artifact catalogue")]
#[command(version)]
struct Cli {
    #[arg(long, short, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Keep artifacts in process memory instead of MongoDB")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_URI, FB_SERVICE_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!("Starting Artifacta API in {:?} mode", config.environment);

    let store: Arc<dyn ArtifactStore> = if cli.in_memory {
        tracing::warn!("Using in-memory artifact store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let uri = config
            .database
            .uri
            .as_deref()
            .context("DB_URI must be set unless --in-memory is given")?;
        Arc::new(
            MongoStore::connect(uri, &config.database)
                .await
                .context("failed to configure MongoDB client")?,
        )
    };

    let project_id = config
        .identity
        .project_id
        .clone()
        .context("FB_SERVICE_KEY or FIREBASE_PROJECT_ID must be set")?;
    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(FirebaseVerifier::new(project_id, config.identity.jwks_url.clone()));

    let app = artifacta_api::app(AppState::new(store, verifier), &config.security);

    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Artifacts is running on port {}", port);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
