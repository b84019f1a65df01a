//! EVM network and contract configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, U64, address};
use client_blockchain_core::{ActionKind, BlockchainConfig, NetworkDescriptor};

/// Deployed PokemonNFT contract on Linea Sepolia.
pub const DEFAULT_POKEMON_CONTRACT: Address = address!("8f119cd256a0FfFeed643E830ADCD9767a1d517F");

/// Which contract entry point settles a training session.
///
/// Deployed revisions of the game contract disagree: older ones expose
/// `completeTraining(id)`, newer ones `endTraining(id, groundId)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrainingCompletionCall {
    #[default]
    Complete,
    End,
}

impl FromStr for TrainingCompletionCall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" | "completetraining" => Ok(Self::Complete),
            "end" | "endtraining" => Ok(Self::End),
            other => Err(format!(
                "Invalid completion call: {other}. Must be complete or end"
            )),
        }
    }
}

/// Block confirmations awaited per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmations {
    pub mint: u64,
    pub training: u64,
    pub purchase: u64,
    pub linkage: u64,
}

impl Default for Confirmations {
    fn default() -> Self {
        Self {
            mint: 1,
            training: 2,
            purchase: 1,
            linkage: 5,
        }
    }
}

impl Confirmations {
    pub fn for_action(&self, action: ActionKind) -> u64 {
        match action {
            ActionKind::MintStarter => self.mint,
            ActionKind::StartTraining | ActionKind::CompleteTraining => self.training,
            ActionKind::PurchaseItem => self.purchase,
            ActionKind::LinkPokeCoin | ActionKind::AddMinter => self.linkage,
        }
    }
}

/// EVM-specific configuration.
#[derive(Debug, Clone)]
pub struct EvmConfig {
    /// Network the wallet must be on; registered with the wallet if unknown
    pub network: NetworkDescriptor,

    /// Address of the PokemonNFT contract
    pub pokemon_contract: Address,

    /// Address of the marketplace contract (optional, not deployed everywhere)
    pub marketplace_contract: Option<Address>,

    pub confirmations: Confirmations,

    /// Delay between receipt / block number polls
    pub poll_interval: Duration,

    pub completion_call: TrainingCompletionCall,
}

impl Default for EvmConfig {
    fn default() -> Self {
        Self {
            network: NetworkDescriptor::linea_sepolia(),
            pokemon_contract: DEFAULT_POKEMON_CONTRACT,
            marketplace_contract: None,
            confirmations: Confirmations::default(),
            poll_interval: Duration::from_millis(2_000),
            completion_call: TrainingCompletionCall::default(),
        }
    }
}

impl EvmConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `POKECHAIN_CHAIN_ID` - Target chain id, decimal or `0x` hex (default: 59141)
    /// - `POKECHAIN_RPC_URL` - RPC URL registered with the wallet
    /// - `POKECHAIN_EXPLORER_URL` - Block explorer URL registered with the wallet
    /// - `POKECHAIN_POKEMON_CONTRACT` - PokemonNFT address
    /// - `POKECHAIN_MARKETPLACE_CONTRACT` - Marketplace address
    /// - `POKECHAIN_CONFIRMATIONS_{MINT,TRAINING,PURCHASE,LINKAGE}`
    /// - `POKECHAIN_POLL_INTERVAL_MS` (default: 2000)
    /// - `POKECHAIN_COMPLETION_CALL` - `complete` or `end` (default: complete)
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("POKECHAIN_CHAIN_ID") {
            let chain_id = parse_chain_id(&raw)?;
            config.network.chain_id = U64::from(chain_id);
        }
        if let Ok(url) = env::var("POKECHAIN_RPC_URL") {
            config.network.rpc_urls = vec![url];
        }
        if let Ok(url) = env::var("POKECHAIN_EXPLORER_URL") {
            config.network.block_explorer_urls = vec![url];
        }

        if let Ok(raw) = env::var("POKECHAIN_POKEMON_CONTRACT") {
            config.pokemon_contract = parse_address("POKECHAIN_POKEMON_CONTRACT", &raw)?;
        }
        if let Ok(raw) = env::var("POKECHAIN_MARKETPLACE_CONTRACT") {
            config.marketplace_contract =
                Some(parse_address("POKECHAIN_MARKETPLACE_CONTRACT", &raw)?);
        }

        if let Some(n) = read_env::<u64>("POKECHAIN_CONFIRMATIONS_MINT") {
            config.confirmations.mint = n;
        }
        if let Some(n) = read_env::<u64>("POKECHAIN_CONFIRMATIONS_TRAINING") {
            config.confirmations.training = n;
        }
        if let Some(n) = read_env::<u64>("POKECHAIN_CONFIRMATIONS_PURCHASE") {
            config.confirmations.purchase = n;
        }
        if let Some(n) = read_env::<u64>("POKECHAIN_CONFIRMATIONS_LINKAGE") {
            config.confirmations.linkage = n;
        }

        if let Some(ms) = read_env::<u64>("POKECHAIN_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }

        if let Ok(raw) = env::var("POKECHAIN_COMPLETION_CALL") {
            config.completion_call = raw.parse()?;
        }

        Ok(config)
    }

    pub fn with_marketplace(mut self, address: Address) -> Self {
        self.marketplace_contract = Some(address);
        self
    }

    pub fn with_completion_call(mut self, call: TrainingCompletionCall) -> Self {
        self.completion_call = call;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }
}

impl BlockchainConfig for EvmConfig {
    fn network_name(&self) -> &str {
        &self.network.chain_name
    }

    fn rpc_url(&self) -> &str {
        self.network.rpc_url().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), String> {
        let url = self.rpc_url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!("Invalid RPC URL format: {}", url));
        }

        if self.chain_id() == 0 {
            return Err("Chain id must be greater than 0".to_string());
        }

        if self.pokemon_contract == Address::ZERO {
            return Err("PokemonNFT contract address cannot be zero".to_string());
        }

        if self.marketplace_contract == Some(Address::ZERO) {
            return Err("Marketplace contract address cannot be zero".to_string());
        }

        let c = &self.confirmations;
        if [c.mint, c.training, c.purchase, c.linkage].contains(&0) {
            return Err("Confirmation counts must be at least 1".to_string());
        }

        Ok(())
    }
}

fn parse_chain_id(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| format!("Invalid POKECHAIN_CHAIN_ID {raw}: {e}"))
}

fn parse_address(key: &str, raw: &str) -> Result<Address, String> {
    raw.trim()
        .parse()
        .map_err(|e| format!("Invalid {key} {raw}: {e}"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_linea_sepolia() {
        let config = EvmConfig::default();
        assert_eq!(config.chain_id(), 0xE705);
        assert_eq!(config.rpc_url(), "https://rpc.sepolia.linea.build");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn confirmation_counts_per_action() {
        let c = Confirmations::default();
        assert_eq!(c.for_action(ActionKind::MintStarter), 1);
        assert_eq!(c.for_action(ActionKind::PurchaseItem), 1);
        assert_eq!(c.for_action(ActionKind::StartTraining), 2);
        assert_eq!(c.for_action(ActionKind::CompleteTraining), 2);
        assert_eq!(c.for_action(ActionKind::LinkPokeCoin), 5);
        assert_eq!(c.for_action(ActionKind::AddMinter), 5);
    }

    #[test]
    fn chain_id_accepts_hex_and_decimal() {
        assert_eq!(parse_chain_id("0xE705"), Ok(59141));
        assert_eq!(parse_chain_id("59141"), Ok(59141));
        assert!(parse_chain_id("linea").is_err());
    }

    #[test]
    fn completion_call_parses() {
        assert_eq!(
            "complete".parse::<TrainingCompletionCall>(),
            Ok(TrainingCompletionCall::Complete)
        );
        assert_eq!(
            "END".parse::<TrainingCompletionCall>(),
            Ok(TrainingCompletionCall::End)
        );
        assert!("finish".parse::<TrainingCompletionCall>().is_err());
    }

    #[test]
    fn validate_rejects_zero_confirmations() {
        let mut config = EvmConfig::default();
        config.confirmations.training = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = EvmConfig::default();
        config.network.rpc_urls = vec!["ws://localhost".into()];
        assert!(config.validate().is_err());
    }
}
