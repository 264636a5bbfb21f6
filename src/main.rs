use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use failtrack::{AppState, TrackerConfig, build_router};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "failtrack")]
#[command(about = "Track and triage test failures from CSV exports")]
struct Cli {
    #[command(flatten)]
    config: TrackerConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web view (default)
    Serve,
    /// Print catalog statistics and the ingest report, then exit
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.config;
    config.validate().context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Summary => summary(&config),
    }
}

async fn serve(config: TrackerConfig) -> Result<()> {
    let catalog = config.load_catalog();
    let stats = catalog.stats();
    info!(
        csv = %config.csv_path.display(),
        state = %config.state_path.display(),
        schema = config.schema_policy.as_str(),
        total = stats.total,
        addressed = stats.addressed,
        "failure catalog loaded"
    );

    let app = build_router(AppState::new(catalog, config.page_size));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "failtrack started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn summary(config: &TrackerConfig) -> Result<()> {
    let catalog = config.load_catalog();
    let stats = catalog.stats();
    let report = catalog.ingest_report();

    println!("CSV file:          {}", config.csv_path.display());
    println!("Persistence file:  {}", config.state_path.display());
    println!("Rows read:         {}", report.rows_read);
    println!("Rows skipped:      {}", report.skipped());
    println!("Noise filtered:    {}", report.noise_filtered);
    println!("Duplicates merged: {}", report.superseded);
    println!("Total errors:      {}", stats.total);
    println!("Addressed:         {}", stats.addressed);
    println!("Unaddressed:       {}", stats.unaddressed);
    println!("Progress:          {}%", stats.progress_percent);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("failtrack=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
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
}
