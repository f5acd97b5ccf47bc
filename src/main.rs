use std::{path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use echowatch::{
    config::AppConfig,
    http_server::{self, ApiState},
    mailer::smtp::SmtpMailer,
    persistence::{sqlite::SqliteAlertRepository, traits::AlertRepository},
    scheduler::{runner::AlertRunner, Scheduler},
    search::elastic::ElasticContentSearch,
};
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the alert monitoring daemon.
    Run,
    /// Executes a single tick for one alert and exits.
    Tick(TickArgs),
}

#[derive(Args)]
struct TickArgs {
    /// The alert to run one tick for.
    #[arg(long)]
    alert_id: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = AppConfig::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => run_daemon(config).await?,
        Commands::Tick(args) => run_single_tick(config, args.alert_id).await?,
    }

    Ok(())
}

/// Wires the repository and ports into a runner.
async fn build_runner(
    config: &AppConfig,
) -> Result<(Arc<SqliteAlertRepository>, Arc<AlertRunner>), Box<dyn std::error::Error>> {
    tracing::debug!("Initializing alert repository...");
    let repo = Arc::new(SqliteAlertRepository::new(&config.database_url).await?);
    repo.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    let search = Arc::new(ElasticContentSearch::new(&config.search)?);
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);

    let runner = Arc::new(AlertRunner::new(
        Arc::clone(&repo) as Arc<dyn AlertRepository>,
        search,
        mailer,
        config.external_call_timeout,
    ));
    Ok((repo, runner))
}

async fn run_daemon(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (repo, runner) = build_runner(&config).await?;

    let scheduler =
        Scheduler::new(Arc::clone(&repo) as Arc<dyn AlertRepository>, runner);

    let armed = scheduler.bootstrap().await?;
    tracing::info!(armed, "Scheduler bootstrapped, monitoring started.");

    if config.server.enabled {
        let state = ApiState {
            repo: Arc::clone(&repo) as Arc<dyn AlertRepository>,
            scheduler: scheduler.clone(),
        };
        let listen_address = config.server.listen_address.clone();
        tokio::spawn(async move {
            http_server::run_server(&listen_address, state).await;
        });
    }

    wait_for_shutdown_signal().await;

    // Graceful shutdown: stop scheduling new ticks, then flush the store. An
    // in-flight tick may still complete; the shutdown timeout bounds the
    // wait.
    tracing::info!("Shutting down...");
    scheduler.shutdown();

    let cleanup = async {
        if let Err(e) = repo.flush().await {
            tracing::error!(error = %e, "Failed to flush pending writes, but continuing cleanup.");
        }
        repo.close().await;
    };
    if tokio::time::timeout(config.shutdown_timeout, cleanup).await.is_err() {
        tracing::warn!(
            "Cleanup did not complete within the timeout of {:?}. Continuing shutdown.",
            config.shutdown_timeout
        );
    }

    tracing::info!("Shutdown complete.");
    Ok(())
}

async fn run_single_tick(
    config: AppConfig,
    alert_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_repo, runner) = build_runner(&config).await?;
    let outcome = runner.run_tick(alert_id).await;
    tracing::info!(alert_id, ?outcome, "Tick finished.");
    Ok(())
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM.
async fn wait_for_shutdown_signal() {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to register SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
        _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
    }
}
