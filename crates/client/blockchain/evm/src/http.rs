//! Wallet provider backed by a JSON-RPC node over HTTP.
//!
//! Stands in for a browser-injected wallet when running natively. Wallet-only
//! methods are answered locally:
//! - `eth_chainId`, `wallet_switchEthereumChain`, `wallet_addEthereumChain`
//!   against an in-memory network registry
//! - `eth_accounts` / `eth_requestAccounts` from the configured account, or
//!   the node's unlocked accounts
//!
//! Everything else, including `eth_sendTransaction`, is forwarded to the
//! active network's RPC endpoint, so signing is delegated to the node.

use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast;

use client_blockchain_core::{
    NativeCurrency, NetworkDescriptor, ProviderError, ProviderNotification, ProviderSubscription,
    WalletProvider,
};

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

struct Registry {
    networks: HashMap<u64, NetworkDescriptor>,
    active: u64,
}

/// HTTP JSON-RPC wallet provider.
pub struct HttpWalletProvider {
    http_client: reqwest::Client,
    registry: Mutex<Registry>,
    account: Option<Address>,
    next_id: AtomicU64,
    notifications: broadcast::Sender<ProviderNotification>,
}

impl HttpWalletProvider {
    /// Provider whose active network is `network`.
    pub fn new(network: NetworkDescriptor, account: Option<Address>) -> Self {
        let (notifications, _) = broadcast::channel(16);
        let active = network.chain_id();
        Self {
            http_client: reqwest::Client::new(),
            registry: Mutex::new(Registry {
                networks: HashMap::from([(active, network)]),
                active,
            }),
            account,
            next_id: AtomicU64::new(1),
            notifications,
        }
    }

    /// Connect to `rpc_url`, asking the node for its chain id.
    pub async fn connect(rpc_url: &str, account: Option<Address>) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::new();
        let chain_id: U64 = serde_json::from_value(
            post(&http_client, rpc_url, 0, "eth_chainId", json!([])).await?,
        )
        .map_err(|e| ProviderError::internal(format!("malformed eth_chainId response: {e}")))?;
        let chain_id = chain_id.to::<u64>();

        tracing::info!("Wallet RPC {} reports chain {:#x}", rpc_url, chain_id);
        let network = NetworkDescriptor {
            chain_id: U64::from(chain_id),
            chain_name: format!("chain-{chain_id}"),
            rpc_urls: vec![rpc_url.to_string()],
            block_explorer_urls: Vec::new(),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        };

        let mut provider = Self::new(network, account);
        provider.http_client = http_client;
        Ok(provider)
    }

    /// Load from environment variables.
    ///
    /// - `WALLET_RPC_URL` - Node endpoint; unset means no wallet is available
    /// - `WALLET_ACCOUNT` - Account to act as (default: the node's first account)
    pub async fn from_env() -> Result<Option<Self>, ProviderError> {
        let Ok(rpc_url) = env::var("WALLET_RPC_URL") else {
            return Ok(None);
        };

        let account = match env::var("WALLET_ACCOUNT") {
            Ok(raw) => Some(raw.trim().parse::<Address>().map_err(|e| {
                ProviderError::invalid_params(format!("Invalid WALLET_ACCOUNT {raw}: {e}"))
            })?),
            Err(_) => None,
        };

        Self::connect(&rpc_url, account).await.map(Some)
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn active_chain(&self) -> u64 {
        self.registry().active
    }

    fn active_rpc_url(&self) -> Result<String, ProviderError> {
        let registry = self.registry();
        registry
            .networks
            .get(&registry.active)
            .and_then(|network| network.rpc_url())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::internal("active network has no RPC URL"))
    }

    fn handle_switch(&self, params: &Value) -> Result<Value, ProviderError> {
        let requested: U64 = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| ProviderError::invalid_params("expected [{ chainId }]"))?;
        let chain_id = requested.to::<u64>();

        let mut registry = self.registry();
        if !registry.networks.contains_key(&chain_id) {
            return Err(ProviderError::unrecognized_chain(chain_id));
        }
        if registry.active != chain_id {
            registry.active = chain_id;
            drop(registry);
            tracing::info!("Switched wallet to chain {:#x}", chain_id);
            let _ = self
                .notifications
                .send(ProviderNotification::ChainChanged(chain_id));
        }
        Ok(Value::Null)
    }

    fn handle_add_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let network: NetworkDescriptor = params
            .get(0)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| ProviderError::invalid_params("expected [network descriptor]"))?;
        if network.rpc_url().is_none() {
            return Err(ProviderError::invalid_params("rpcUrls must not be empty"));
        }

        tracing::info!(
            "Registered chain {:#x} ({})",
            network.chain_id(),
            network.chain_name
        );
        self.registry()
            .networks
            .insert(network.chain_id(), network);
        Ok(Value::Null)
    }

    async fn local_accounts(&self) -> Result<Value, ProviderError> {
        match self.account {
            Some(account) => Ok(json!([account])),
            None => self.forward("eth_accounts", json!([])).await,
        }
    }

    async fn forward(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let url = self.active_rpc_url()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        post(&self.http_client, &url, id, method, params).await
    }
}

async fn post(
    http_client: &reqwest::Client,
    url: &str,
    id: u64,
    method: &str,
    params: Value,
) -> Result<Value, ProviderError> {
    tracing::debug!("RPC {} -> {}", method, url);

    let request = RpcRequest {
        jsonrpc: "2.0",
        id,
        method,
        params,
    };
    let response = http_client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|e| ProviderError::internal(format!("RPC request {method} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::internal(format!(
            "RPC {method} failed with status {status}: {error_text}"
        )));
    }

    let body: RpcResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::internal(format!("malformed {method} response: {e}")))?;
    rpc_result(body)
}

fn rpc_result(body: RpcResponse) -> Result<Value, ProviderError> {
    match body.error {
        Some(err) => Err(err),
        None => Ok(body.result.unwrap_or(Value::Null)),
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match method {
            "eth_chainId" => Ok(json!(U64::from(self.active_chain()))),
            "wallet_switchEthereumChain" => self.handle_switch(&params),
            "wallet_addEthereumChain" => self.handle_add_chain(&params),
            "eth_accounts" | "eth_requestAccounts" => self.local_accounts().await,
            _ => self.forward(method, params).await,
        }
    }

    fn subscribe(&self) -> ProviderSubscription {
        ProviderSubscription::new(self.notifications.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use client_blockchain_core::ProviderExt;

    fn local() -> NetworkDescriptor {
        NetworkDescriptor {
            chain_id: U64::from(31337u64),
            chain_name: "Local".into(),
            rpc_urls: vec!["http://127.0.0.1:8545".into()],
            block_explorer_urls: Vec::new(),
            native_currency: NativeCurrency {
                name: "Ether".into(),
                symbol: "ETH".into(),
                decimals: 18,
            },
        }
    }

    #[tokio::test]
    async fn unknown_chain_reports_4902_until_added() {
        let account = address!("00000000000000000000000000000000000a11ce");
        let wallet = HttpWalletProvider::new(local(), Some(account));
        let mut subscription = wallet.subscribe();

        let err = wallet.switch_chain(59141).await.unwrap_err();
        assert_eq!(err.code, ProviderError::UNRECOGNIZED_CHAIN);

        wallet
            .add_chain(&NetworkDescriptor::linea_sepolia())
            .await
            .unwrap();
        wallet.switch_chain(59141).await.unwrap();

        assert_eq!(wallet.chain_id().await.unwrap(), 59141);
        assert_eq!(
            wallet.active_rpc_url().unwrap(),
            "https://rpc.sepolia.linea.build"
        );
        assert_eq!(
            subscription.next().await,
            Some(ProviderNotification::ChainChanged(59141))
        );
    }

    #[tokio::test]
    async fn configured_account_is_served_locally() {
        let account = address!("00000000000000000000000000000000000a11ce");
        let wallet = HttpWalletProvider::new(local(), Some(account));

        assert_eq!(wallet.request_accounts().await.unwrap(), vec![account]);
        assert_eq!(wallet.accounts().await.unwrap(), vec![account]);
    }

    #[test]
    fn rpc_errors_keep_code_and_message() {
        let body: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "insufficient funds for gas", "data": null }
        }))
        .unwrap();

        let err = rpc_result(body).unwrap_err();
        assert_eq!(err.code, -32000);
        assert!(err.is_insufficient_funds());
    }

    #[test]
    fn null_result_is_pending() {
        let body: RpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1, "result": null })).unwrap();
        assert_eq!(rpc_result(body).unwrap(), Value::Null);
    }
}
