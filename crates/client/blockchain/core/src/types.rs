//! Common types for wallet and contract interactions.

use std::fmt;

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Native currency of a network, as registered with a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Network descriptor in the shape `wallet_addEthereumChain` expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// Hex quantity on the wire (`"0xe705"`).
    pub chain_id: U64,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

impl NetworkDescriptor {
    pub fn chain_id(&self) -> u64 {
        self.chain_id.to::<u64>()
    }

    /// First RPC URL, if any.
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    /// Linea Sepolia, the network the game contract is deployed on.
    pub fn linea_sepolia() -> Self {
        Self {
            chain_id: U64::from(59141u64),
            chain_name: "Linea Sepolia".to_string(),
            rpc_urls: vec!["https://rpc.sepolia.linea.build".to_string()],
            block_explorer_urls: vec!["https://sepolia.lineascan.build".to_string()],
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        }
    }
}

/// Transaction or call request (`eth_call`, `eth_estimateGas`, `eth_sendTransaction`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

impl TransactionRequest {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas = Some(U64::from(gas));
        self
    }

    /// First four bytes of the calldata.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4)?.try_into().ok()
    }
}

/// Event log entry attached to a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Confirmed record of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: U64,
    /// 1 on success, 0 on revert.
    pub status: U64,
    pub gas_used: U64,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        !self.status.is_zero()
    }

    pub fn block_number(&self) -> u64 {
        self.block_number.to::<u64>()
    }

    /// Condensed form handed to callers once the action is settled.
    pub fn summary(&self) -> ActionReceipt {
        ActionReceipt {
            transaction_hash: self.transaction_hash,
            block_number: self.block_number(),
            gas_used: self.gas_used.saturating_to::<u64>(),
        }
    }
}

/// Notification pushed by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderNotification {
    /// New authorized account list; empty means the wallet disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// Live subscription to provider notifications.
///
/// Dropping the subscription unsubscribes.
pub struct ProviderSubscription {
    rx: broadcast::Receiver<ProviderNotification>,
}

impl ProviderSubscription {
    pub fn new(rx: broadcast::Receiver<ProviderNotification>) -> Self {
        Self { rx }
    }

    /// Next notification, or `None` once the provider is gone.
    ///
    /// Lagged notifications are skipped; only the latest state matters to
    /// subscribers.
    pub async fn next(&mut self) -> Option<ProviderNotification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Provider subscription lagged, skipped {} notifications", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Kind of user action submitted through the action pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    MintStarter,
    StartTraining,
    CompleteTraining,
    PurchaseItem,
    LinkPokeCoin,
    AddMinter,
}

impl ActionKind {
    /// Verb phrase used in "Failed to ..." messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MintStarter => "mint starter Pokemon",
            Self::StartTraining => "start training",
            Self::CompleteTraining => "complete training",
            Self::PurchaseItem => "purchase item",
            Self::LinkPokeCoin => "link PokeCoin contract",
            Self::AddMinter => "add minter",
        }
    }

    pub const fn insufficient_funds_message(&self) -> &'static str {
        match self {
            Self::StartTraining | Self::CompleteTraining => {
                "Insufficient PokeCoin balance for training"
            }
            Self::PurchaseItem => "Insufficient balance to purchase this item",
            Self::MintStarter | Self::LinkPokeCoin | Self::AddMinter => {
                "Insufficient balance to pay for gas"
            }
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Settled transaction summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Result of a starter mint, decoded from the `TransferSingle` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintReceipt {
    pub receipt: ActionReceipt,
    pub token_id: u64,
    pub minted_to: Address,
}

/// Result of a completed training, decoded from `TrainingCompleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingReceipt {
    pub receipt: ActionReceipt,
    pub xp_gained: u64,
}

/// `0x1234...abcd` display form of an address.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Blockchain-specific configuration.
///
/// This is a trait to allow different chains to provide their own config types.
pub trait BlockchainConfig: Send + Sync {
    /// Human-readable network name (e.g., "linea-sepolia")
    fn network_name(&self) -> &str;

    /// RPC endpoint URL registered with the wallet
    fn rpc_url(&self) -> &str;

    /// Validate configuration (URLs, addresses, confirmation counts)
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use serde_json::json;

    #[test]
    fn network_descriptor_serializes_for_add_chain() {
        let value = serde_json::to_value(NetworkDescriptor::linea_sepolia()).unwrap();
        assert_eq!(value["chainId"], json!("0xe705"));
        assert_eq!(value["chainName"], json!("Linea Sepolia"));
        assert_eq!(value["nativeCurrency"]["symbol"], json!("ETH"));
        assert_eq!(value["nativeCurrency"]["decimals"], json!(18));
        assert_eq!(value["rpcUrls"][0], json!("https://rpc.sepolia.linea.build"));
    }

    #[test]
    fn receipt_parses_rpc_json() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber": "0x10",
            "status": "0x0",
            "gasUsed": "0x5208",
            "cumulativeGasUsed": "0x5208",
            "logs": []
        }))
        .unwrap();

        assert!(!receipt.succeeded());
        assert_eq!(receipt.block_number(), 16);
        assert_eq!(receipt.summary().gas_used, 21_000);
    }

    #[test]
    fn request_omits_unset_fields() {
        let to = address!("8f119cd256a0FfFeed643E830ADCD9767a1d517F");
        let request = TransactionRequest::new(to, vec![0xde, 0xad, 0xbe, 0xef, 0x01]);
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("from").is_none());
        assert!(value.get("gas").is_none());
        assert_eq!(value["data"], json!("0xdeadbeef01"));
        assert_eq!(request.selector(), Some([0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let addr = address!("1234567890123456789012345678901234567890");
        assert_eq!(short_address(&addr), "0x1234...7890");
    }
}
