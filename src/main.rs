//! Docflow server

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use docflow::blob::LocalBlobStore;
use docflow::config::AppConfig;
use docflow::expiration::ExpirationScheduler;
use docflow::identity::{IdentityProvider, SessionIdentity};
use docflow::store::Store;
use docflow::{api, db, telemetry, AppState};

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "Document approval workflow server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server and the expiration scheduler
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one expiration sweep and exit
    Sweep,
    /// Issue a session token for an existing user
    IssueToken {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load().context("invalid configuration")?;

    telemetry::init(&config.log_filter)?;

    let pool = db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    db::migrate(&pool).await.context("failed to run migrations")?;
    let store = Store::new(pool);

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, store).await
        }
        Command::Sweep => {
            let scheduler = ExpirationScheduler::new(store, config.expiration);
            let report = scheduler.sweep_once(chrono::Utc::now()).await?;
            println!(
                "examined={} expired={} skipped={} failed={}",
                report.examined, report.expired, report.skipped, report.failed
            );
            Ok(())
        }
        Command::IssueToken { email } => {
            let user = store
                .find_user_by_email(&email)
                .await?
                .with_context(|| format!("no user with email {}", email))?;
            let token = SessionIdentity::new(store).issue(user.id).await?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, store: Store) -> anyhow::Result<()> {
    let blobs = LocalBlobStore::new(&config.upload_dir);
    tokio::fs::create_dir_all(blobs.root())
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let state = AppState::new(store.clone(), Arc::new(blobs));
    state
        .accounts
        .seed_super_admin(&config.seed.email, &config.seed.full_name)
        .await?;

    let scheduler = ExpirationScheduler::new(store, config.expiration.clone()).spawn();

    let app = api::router(state, &config.upload_dir);
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down");
    scheduler.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
