//! Terminal commands.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use serde_json::json;

use client_blockchain_core::{ActionReceipt, short_address};
use client_core::MirrorState;
use game_core::{STARTERS, training_ground};

use crate::Client;
use crate::render::{creature_line, market_line, training_label};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the wallet session and target network
    Status,

    /// Show owned Pokemon and items
    Profile {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List marketplace items and prices
    Market,

    /// Mint a starter Pokemon (1 Bulbasaur, 4 Charmander, 7 Squirtle)
    Mint { id: u64 },

    /// Training commands
    #[command(subcommand)]
    Train(TrainCommand),

    /// Buy a marketplace item
    Buy {
        item: u64,
        #[arg(default_value_t = 1)]
        amount: u64,
    },

    /// Deploy-time contract linkage (owner only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TrainCommand {
    /// Send a Pokemon to a training ground
    Start { id: u64, ground: u64 },

    /// Collect the XP of a finished training session
    Complete { id: u64 },

    /// Show the XP a Pokemon would hold if training completed now
    Xp { id: u64 },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Point the game contract at the PokeCoin token
    LinkPokecoin { token: Address },

    /// Grant minting rights to an address
    AddMinter { minter: Address },
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

impl Client {
    pub async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Status => {
                self.status();
                Ok(())
            }
            Command::Profile { json } => self.profile(json).await,
            Command::Market => {
                self.market().await;
                Ok(())
            }
            Command::Mint { id } => self.mint(id).await,
            Command::Train(train) => self.train(train).await,
            Command::Buy { item, amount } => self.buy(item, amount).await,
            Command::Admin(admin) => self.admin(admin).await,
        }
    }

    fn status(&self) {
        let state = self.game().session_state();
        let network = self.network();

        println!("{}", style("PokeChain").yellow().bold());
        match state.address {
            Some(address) => println!("  {} {}", style("Account:").bold(), style(address).cyan()),
            None => println!("  {} {}", style("Account:").bold(), style("not connected").dim()),
        }

        let target = network.chain_id();
        match state.chain_id {
            Some(id) if id == target => println!(
                "  {} {:#x} {}",
                style("Chain:").bold(),
                id,
                style("(matches)").green()
            ),
            Some(id) => println!(
                "  {} {:#x} {}",
                style("Chain:").bold(),
                id,
                style(format!("(switches to {target:#x} on next action)")).yellow()
            ),
            None => println!("  {} {}", style("Chain:").bold(), style("unknown").dim()),
        }
        println!(
            "  {} {} ({:#x})",
            style("Network:").bold(),
            network.chain_name,
            target
        );

        if let Some(error) = state.error {
            println!("  {} {}", style("✗").red().bold(), error);
        }
    }

    async fn profile(&self, as_json: bool) -> Result<()> {
        let owner = self.ensure_connected().await?;
        let snapshot = match self.game().mirror_state() {
            MirrorState::Ready(snapshot) if snapshot.owner == owner => snapshot,
            _ => self
                .game()
                .refresh()
                .await
                .context("Failed to load game state")?,
        };

        if as_json {
            let value = json!({
                "owner": snapshot.owner,
                "isNewUser": snapshot.is_new_user,
                "creatures": snapshot.creatures,
                "items": snapshot.items,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        println!(
            "{} {}",
            style("Trainer").yellow().bold(),
            style(short_address(&snapshot.owner)).cyan()
        );

        if snapshot.is_new_user {
            println!("  {}", style("No starter Pokemon yet. Choose one:").dim());
            for starter in &STARTERS {
                println!(
                    "    {} {} ({})",
                    style(format!("pokechain mint {}", starter.id)).bold(),
                    starter.name,
                    starter.kind
                );
            }
        }

        let now = now();
        for creature in &snapshot.creatures {
            println!("  {} {}", style("→").cyan(), creature_line(creature));
            println!("    {}", style(training_label(creature, now)).dim());
            if creature.is_training {
                match self.game().training_xp(creature.id).await {
                    Ok(xp) => println!("    {}", style(format!("{xp} XP if completed now")).dim()),
                    Err(err) => tracing::warn!("Error projecting XP for {}: {}", creature.id, err),
                }
            }
        }

        if !snapshot.items.is_empty() {
            println!("{}", style("Items").yellow().bold());
            for item in &snapshot.items {
                println!("  {} {} x{}", style("→").cyan(), item.name, item.amount);
            }
        }

        Ok(())
    }

    async fn market(&self) {
        let items = self.game().market_items().await;
        if items.is_empty() {
            println!("{}", style("Marketplace unavailable").dim());
            return;
        }

        println!("{}", style("Marketplace").yellow().bold());
        for item in &items {
            println!("  {} {}", style("→").cyan(), market_line(item));
        }
    }

    async fn mint(&self, id: u64) -> Result<()> {
        self.ensure_connected().await?;
        let minted = self.game().mint_starter(id).await?;

        println!(
            "{} Minted Pokemon #{} to {}",
            style("✓").green().bold(),
            minted.token_id,
            short_address(&minted.minted_to)
        );
        self.print_receipt(&minted.receipt);
        Ok(())
    }

    async fn train(&self, command: TrainCommand) -> Result<()> {
        match command {
            TrainCommand::Start { id, ground } => {
                self.ensure_connected().await?;
                let receipt = self.game().start_training(id, ground).await?;
                let ground_name = training_ground(ground).map_or("training ground", |g| g.name);
                println!(
                    "{} Pokemon #{} started training at {}",
                    style("✓").green().bold(),
                    id,
                    ground_name
                );
                self.print_receipt(&receipt);
            }
            TrainCommand::Complete { id } => {
                self.ensure_connected().await?;
                let completed = self.game().complete_training(id).await?;
                println!(
                    "{} Training complete: Pokemon #{} gained {} XP",
                    style("✓").green().bold(),
                    id,
                    completed.xp_gained
                );
                self.print_receipt(&completed.receipt);
            }
            TrainCommand::Xp { id } => {
                let xp = self.game().training_xp(id).await?;
                println!("Pokemon #{} would hold {} XP if training completed now", id, xp);
            }
        }
        Ok(())
    }

    async fn buy(&self, item: u64, amount: u64) -> Result<()> {
        self.ensure_connected().await?;
        let receipt = self.game().purchase_item(item, amount).await?;
        println!(
            "{} Bought {} of item #{}",
            style("✓").green().bold(),
            amount,
            item
        );
        self.print_receipt(&receipt);
        Ok(())
    }

    async fn admin(&self, command: AdminCommand) -> Result<()> {
        self.ensure_connected().await?;
        let (receipt, message) = match command {
            AdminCommand::LinkPokecoin { token } => (
                self.game().link_pokecoin(token).await?,
                format!("Linked PokeCoin contract {token}"),
            ),
            AdminCommand::AddMinter { minter } => (
                self.game().add_minter(minter).await?,
                format!("Granted minting rights to {minter}"),
            ),
        };
        println!("{} {}", style("✓").green().bold(), message);
        self.print_receipt(&receipt);
        Ok(())
    }

    fn print_receipt(&self, receipt: &ActionReceipt) {
        println!(
            "  {}",
            style(format!(
                "tx {} in block {} (gas {})",
                receipt.transaction_hash, receipt.block_number, receipt.gas_used
            ))
            .dim()
        );
        if let Some(link) = self.explorer_link(&receipt.transaction_hash) {
            println!("  {}", style(link).dim());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("pokechain").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn buy_defaults_to_one() {
        assert_eq!(parse(&["buy", "2"]), Command::Buy { item: 2, amount: 1 });
        assert_eq!(parse(&["buy", "2", "5"]), Command::Buy { item: 2, amount: 5 });
    }

    #[test]
    fn nested_subcommands() {
        assert_eq!(
            parse(&["train", "start", "4", "2"]),
            Command::Train(TrainCommand::Start { id: 4, ground: 2 })
        );
        let token: Address = "0x8f119cd256a0FfFeed643E830ADCD9767a1d517F".parse().unwrap();
        assert_eq!(
            parse(&["admin", "link-pokecoin", "0x8f119cd256a0FfFeed643E830ADCD9767a1d517F"]),
            Command::Admin(AdminCommand::LinkPokecoin { token })
        );
    }

    #[test]
    fn malformed_address_is_rejected() {
        let parsed = Cli::try_parse_from(["pokechain", "admin", "add-minter", "0x1234"]);
        assert!(parsed.is_err());
    }
}
