//! PokeChain client binary.
//!
//! Composition root that assembles:
//! 1. Wallet provider: HTTP JSON-RPC node from `WALLET_RPC_URL` (optional)
//! 2. EVM game client: contracts and network from `POKECHAIN_*` variables
//! 3. Game client facade: session, state mirror and action guard
//!
//! # Examples
//!
//! ```bash
//! WALLET_RPC_URL=http://127.0.0.1:8545 pokechain profile
//! pokechain mint 4
//! pokechain train start 4 2
//! ```

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use console::style;

use client_blockchain_evm::{EvmConfig, HttpWalletProvider};
use client_core::ClientConfig;
use pokechain_client::{Client, Command, logging};

/// PokeChain wallet client
#[derive(Parser)]
#[command(name = "pokechain")]
#[command(about = "Mint, train and trade PokeChain Pokemon from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    // Load .env file if it exists (wallet and contract settings)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(err) = run(cli.command).await {
        eprintln!("{} {:#}", style("✗").red().bold(), err);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let _guard = logging::setup_logging()?;

    let evm_config = EvmConfig::from_env()
        .map_err(|e| anyhow!(e))
        .context("Invalid POKECHAIN configuration")?;
    tracing::info!(
        "Target network: {} ({:#x})",
        evm_config.network.chain_name,
        evm_config.chain_id()
    );

    // One-shot commands refresh explicitly; a background follower would race them.
    let config = ClientConfig {
        follow_wallet: false,
        ..ClientConfig::from_env()
    };
    let mut builder = Client::builder().evm(evm_config).config(config);

    match HttpWalletProvider::from_env()
        .await
        .context("Failed to reach the wallet RPC node")?
    {
        Some(provider) => {
            tracing::info!("Wallet provider connected on chain {:#x}", provider.active_chain());
            builder = builder.provider(provider);
        }
        None => {
            tracing::warn!("WALLET_RPC_URL not set. Continuing without a wallet provider.");
        }
    }

    let mut client = builder.build()?;
    client.start().await;

    tracing::debug!("Executing {:?}", command);
    client.execute(command).await
}
