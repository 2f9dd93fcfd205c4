//! asset-sweeper
//!
//! Recovers ERC-721 tokens from a compromised account by submitting, every
//! block, a relay bundle of one sponsor funding transfer followed by every
//! token transfer.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────┐  heights   ┌──────────────┐  plan/sign  ┌──────────┐
//!   │ watcher  │──────────▶│ orchestrator │────────────▶│  bundle  │
//!   │ (poll)   │   mpsc     │  (serial)    │             └──────────┘
//!   └────┬─────┘            └──┬────────┬──┘
//!        │                     │        │ simulate / send
//!        ▼                     ▼        ▼
//!   ┌──────────┐         ┌──────────┐ ┌──────────┐
//!   │ node RPC │◀────────│resolution│ │  relay   │
//!   └──────────┘ nonces, └──────────┘ └──────────┘
//!                blocks
//! ```
//!
//! # Exit codes
//! - 0: bundle included
//! - 1: missing or invalid configuration, nonce conflict, fatal error
//! - 130: stopped by a signal

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use serde::Serialize;

use asset_sweeper::config::{self, SweepConfig};
use asset_sweeper::lifecycle::signals::spawn_signal_handler;
use asset_sweeper::lifecycle::startup::{
    build_orchestrator, check_chain, run_sweep, LiveOrchestrator,
};
use asset_sweeper::lifecycle::Shutdown;
use asset_sweeper::observability::{logging, metrics};
use asset_sweeper::sweep::{BundlePlan, SimulationVerdict, SweepExit};

#[derive(Parser)]
#[command(name = "asset-sweeper")]
#[command(
    about = "Recover assets from a compromised account with atomic relay bundles",
    long_about = None
)]
struct Cli {
    /// TOML configuration file; compiled-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the node RPC URL.
    #[arg(long)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Submit a bundle every block until it is included (default)
    Run,
    /// Print the bundle for the next block without signing or sending it
    Plan,
    /// Sign and simulate the bundle for the next block once, without sending
    Simulate,
}

#[derive(Serialize)]
struct PlanView {
    observed_block: u64,
    sponsor: Address,
    compromised: Address,
    receiver: Address,
    sponsor_balance: U256,
    max_transfer_cost: U256,
    bundle: BundlePlan,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = |name: &str| std::env::var(name).ok();
    let (secrets, mut config) = match config::load_inputs(cli.config.as_deref(), env) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = cli.rpc_url {
        config.rpc.url = url;
    }

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!("asset-sweeper v{} starting", env!("CARGO_PKG_VERSION"));

    let orchestrator = match build_orchestrator(&config, &secrets) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&orchestrator, &config).await,
        Commands::Plan => plan(&orchestrator).await,
        Commands::Simulate => simulate(&orchestrator).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    orchestrator: &LiveOrchestrator,
    config: &SweepConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let signals = spawn_signal_handler(shutdown.clone());
    let poll_interval = Duration::from_millis(config.rpc.poll_interval_ms);

    let exit = run_sweep(orchestrator, poll_interval, &shutdown).await;
    signals.abort();

    let code = match exit? {
        SweepExit::Included { block } => {
            tracing::info!(block = block, "Assets recovered");
            ExitCode::SUCCESS
        }
        SweepExit::NonceConflict => ExitCode::FAILURE,
        SweepExit::Shutdown => {
            tracing::info!("Shutdown complete");
            ExitCode::from(130)
        }
        SweepExit::StreamClosed => {
            tracing::error!("Block stream closed");
            ExitCode::FAILURE
        }
    };
    Ok(code)
}

async fn plan(orchestrator: &LiveOrchestrator) -> Result<ExitCode, Box<dyn std::error::Error>> {
    check_chain(orchestrator.chain()).await?;

    let chain = orchestrator.chain();
    let observed_block = chain.get_block_number().await?;
    let bundle = orchestrator.plan_bundle(observed_block).await?;
    let sponsor_balance = chain.get_balance(orchestrator.sponsor().address()).await?;

    let view = PlanView {
        observed_block,
        sponsor: orchestrator.sponsor().address(),
        compromised: orchestrator.compromised().address(),
        receiver: orchestrator.sweep_plan().receiver,
        sponsor_balance,
        max_transfer_cost: orchestrator.sweep_plan().max_transfer_cost(),
        bundle,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(ExitCode::SUCCESS)
}

async fn simulate(orchestrator: &LiveOrchestrator) -> Result<ExitCode, Box<dyn std::error::Error>> {
    check_chain(orchestrator.chain()).await?;

    let observed_block = orchestrator.chain().get_block_number().await?;
    let bundle = orchestrator.build_bundle(observed_block).await?;

    match orchestrator.simulate(&bundle).await? {
        SimulationVerdict::Passed(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        SimulationVerdict::Rejected(reason) => {
            tracing::error!(reason = %reason, "Simulation error");
            Ok(ExitCode::FAILURE)
        }
    }
}
