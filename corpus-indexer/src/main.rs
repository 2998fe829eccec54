use clap::Parser;
use tracing::{error, info};

use corpus_indexer::api;
use corpus_indexer::config::Ingest;
use corpus_indexer::telemetry::init_tracing;
use corpus_indexer::{Cli, Dependencies, IndexerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);
    let config = IndexerConfig::try_from(cli)?;

    let parallelism = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    info!(parallelism = parallelism, "Available parallelism");

    let deps = Dependencies::new(&config)?;
    if let Some(ingest) = deps.ingest {
        tokio::spawn(run_ingest(ingest));
    }

    let app = api::router(deps.engine);
    let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;
    info!("Listening on {}", config.listen_url()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Run ingestion to completion. Failures are logged; the API keeps serving
/// whatever was indexed.
async fn run_ingest(mut ingest: Ingest) {
    match ingest.driver.run(ingest.source).await {
        Ok(stats) => info!(
            total_indexed = stats.total_indexed,
            started_at = %stats.started_at,
            "Ingestion finished"
        ),
        Err(e) => error!(error = %e, state = ?ingest.driver.state(), "Ingestion failed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
