use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use booth_ledger::{Ledger, LoadPolicy, StatsStore};
use booth_prover::MockProver;
use booth_server::{logger, router, AppState};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "booth-server", about = "Invisible voting booth backend.")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Where the ledger persists its state.
    #[arg(long, default_value = "stats.json")]
    stats_file: PathBuf,

    /// Fail startup if the persisted state is present but unparseable,
    /// instead of starting from a fresh zero state.
    #[arg(long)]
    strict_load: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::setup_logger();
    let args = Args::parse();

    let policy = if args.strict_load {
        LoadPolicy::Strict
    } else {
        LoadPolicy::Lenient
    };

    let prover = Arc::new(MockProver::new());
    let ledger = Arc::new(Ledger::open(
        StatsStore::new(&args.stats_file),
        Box::new(Arc::clone(&prover)),
        policy,
    )?);

    let state = AppState {
        ledger: Arc::clone(&ledger),
        prover,
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!(port = args.port, "invisible voting booth live");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Final flush so shutdown is an explicit lifecycle step, not an ambient
    // side effect of the last submission.
    ledger.flush()?;
    info!("ledger flushed, shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
}
