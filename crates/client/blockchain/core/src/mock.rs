//! Mock wallet provider for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, B256, Bytes, U64, keccak256};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use crate::error::ProviderError;
use crate::traits::WalletProvider;
use crate::types::{
    Log, NetworkDescriptor, ProviderNotification, ProviderSubscription, TransactionReceipt,
    TransactionRequest,
};

type CallHandler = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, ProviderError> + Send + Sync>;

/// Mock wallet provider for testing without a network.
///
/// Simulates a browser wallet in-memory: account authorization, a registry of
/// known chains, scripted `eth_call` responses keyed by contract and selector,
/// and instantly mined transactions. Every `eth_blockNumber` query mines one
/// more block so confirmation waits terminate.
pub struct MockWalletProvider {
    state: Mutex<MockState>,
    notifications: broadcast::Sender<ProviderNotification>,
}

struct MockState {
    accounts: Vec<Address>,
    authorized: bool,
    reject_requests: bool,
    active_chain: u64,
    registered_chains: HashSet<u64>,
    switch_error: Option<ProviderError>,
    add_chain_error: Option<ProviderError>,
    calls: HashMap<(Address, [u8; 4]), CallHandler>,
    gas_estimate: Result<u64, ProviderError>,
    send_error: Option<ProviderError>,
    receipt_status: u64,
    receipt_logs: Vec<Log>,
    receipts: HashMap<B256, TransactionReceipt>,
    block_number: u64,
    sent: Vec<TransactionRequest>,
    methods: Vec<String>,
}

impl MockWalletProvider {
    /// A wallet on `chain_id` with no authorized accounts.
    pub fn new(chain_id: u64) -> Self {
        let (notifications, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(MockState {
                accounts: Vec::new(),
                authorized: false,
                reject_requests: false,
                active_chain: chain_id,
                registered_chains: HashSet::from([chain_id]),
                switch_error: None,
                add_chain_error: None,
                calls: HashMap::new(),
                gas_estimate: Ok(100_000),
                send_error: None,
                receipt_status: 1,
                receipt_logs: Vec::new(),
                receipts: HashMap::new(),
                block_number: 100,
                sent: Vec::new(),
                methods: Vec::new(),
            }),
            notifications,
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an account the wallet can hand out.
    pub fn with_account(self, account: Address) -> Self {
        self.state().accounts.push(account);
        self
    }

    /// Treat the origin as already authorized (`eth_accounts` returns accounts).
    pub fn authorized(self) -> Self {
        self.state().authorized = true;
        self
    }

    pub fn with_registered_chain(self, chain_id: u64) -> Self {
        self.state().registered_chains.insert(chain_id);
        self
    }

    /// Make `eth_requestAccounts` and `eth_sendTransaction` fail as if the user
    /// clicked "reject".
    pub fn reject_requests(&self) {
        self.state().reject_requests = true;
    }

    pub fn fail_switch(&self, err: ProviderError) {
        self.state().switch_error = Some(err);
    }

    /// Make `wallet_addEthereumChain` fail; the chain stays unregistered.
    pub fn fail_add_chain(&self, err: ProviderError) {
        self.state().add_chain_error = Some(err);
    }

    /// Script the return data of `eth_call` to `to` with `selector`.
    pub fn on_call<F>(&self, to: Address, selector: [u8; 4], handler: F)
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, ProviderError> + Send + Sync + 'static,
    {
        self.state().calls.insert((to, selector), Arc::new(handler));
    }

    pub fn set_gas_estimate(&self, estimate: Result<u64, ProviderError>) {
        self.state().gas_estimate = estimate;
    }

    pub fn fail_send(&self, err: ProviderError) {
        self.state().send_error = Some(err);
    }

    /// Status and logs of receipts for transactions sent from now on.
    pub fn set_receipt(&self, status: u64, logs: Vec<Log>) {
        let mut state = self.state();
        state.receipt_status = status;
        state.receipt_logs = logs;
    }

    /// Replace the account list and notify subscribers.
    pub fn change_accounts(&self, accounts: Vec<Address>) {
        self.state().accounts = accounts.clone();
        let _ = self
            .notifications
            .send(ProviderNotification::AccountsChanged(accounts));
    }

    pub fn emit(&self, notification: ProviderNotification) {
        let _ = self.notifications.send(notification);
    }

    pub fn active_chain(&self) -> u64 {
        self.state().active_chain
    }

    pub fn is_registered(&self, chain_id: u64) -> bool {
        self.state().registered_chains.contains(&chain_id)
    }

    /// Methods requested so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state().methods.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.state().methods.iter().filter(|m| *m == method).count()
    }

    /// Transactions submitted via `eth_sendTransaction`.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    fn handle(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state();
        state.methods.push(method.to_string());

        match method {
            "eth_requestAccounts" => {
                if state.reject_requests {
                    return Err(ProviderError::user_rejected());
                }
                state.authorized = true;
                Ok(json!(state.accounts))
            }
            "eth_accounts" => {
                if state.authorized {
                    Ok(json!(state.accounts))
                } else {
                    Ok(json!([]))
                }
            }
            "eth_chainId" => Ok(json!(U64::from(state.active_chain))),
            "wallet_switchEthereumChain" => {
                if let Some(err) = state.switch_error.clone() {
                    return Err(err);
                }
                let requested: U64 = param(params, 0, "chainId")?;
                let chain_id = requested.to::<u64>();
                if !state.registered_chains.contains(&chain_id) {
                    return Err(ProviderError::unrecognized_chain(chain_id));
                }
                if state.active_chain != chain_id {
                    state.active_chain = chain_id;
                    let _ = self
                        .notifications
                        .send(ProviderNotification::ChainChanged(chain_id));
                }
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                if let Some(err) = state.add_chain_error.clone() {
                    return Err(err);
                }
                let network: NetworkDescriptor = param(params, 0, "")?;
                state.registered_chains.insert(network.chain_id());
                Ok(Value::Null)
            }
            "eth_call" => {
                let tx: TransactionRequest = param(params, 0, "")?;
                let selector = tx
                    .selector()
                    .ok_or_else(|| ProviderError::invalid_params("calldata too short"))?;
                let handler = state
                    .calls
                    .get(&(tx.to, selector))
                    .cloned()
                    .ok_or_else(|| ProviderError::new(ProviderError::SERVER, "execution reverted"))?;
                drop(state);
                let output = handler(&tx.data)?;
                Ok(json!(Bytes::from(output)))
            }
            "eth_estimateGas" => state.gas_estimate.clone().map(|gas| json!(U64::from(gas))),
            "eth_sendTransaction" => {
                if state.reject_requests {
                    return Err(ProviderError::user_rejected());
                }
                if let Some(err) = state.send_error.clone() {
                    return Err(err);
                }
                let tx: TransactionRequest = param(params, 0, "")?;
                state.sent.push(tx);
                let hash = keccak256((state.sent.len() as u64).to_be_bytes());
                let receipt = TransactionReceipt {
                    transaction_hash: hash,
                    block_number: U64::from(state.block_number),
                    status: U64::from(state.receipt_status),
                    gas_used: U64::from(21_000u64),
                    logs: state.receipt_logs.clone(),
                };
                state.receipts.insert(hash, receipt);
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = param(params, 0, "")?;
                Ok(json!(state.receipts.get(&hash)))
            }
            "eth_blockNumber" => {
                state.block_number += 1;
                Ok(json!(U64::from(state.block_number)))
            }
            other => Err(ProviderError::unsupported_method(other)),
        }
    }
}

/// Extract `params[index]` (or `params[index][field]`) as `T`.
fn param<T: serde::de::DeserializeOwned>(
    params: &Value,
    index: usize,
    field: &str,
) -> Result<T, ProviderError> {
    let mut value = params
        .get(index)
        .ok_or_else(|| ProviderError::invalid_params(format!("missing param {index}")))?;
    if !field.is_empty() {
        value = value
            .get(field)
            .ok_or_else(|| ProviderError::invalid_params(format!("missing field {field}")))?;
    }
    serde_json::from_value(value.clone()).map_err(|e| ProviderError::invalid_params(e.to_string()))
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.handle(method, &params)
    }

    fn subscribe(&self) -> ProviderSubscription {
        ProviderSubscription::new(self.notifications.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ProviderExt;
    use alloy_primitives::address;

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    #[tokio::test]
    async fn test_mock_wallet_provider() {
        let wallet = MockWalletProvider::new(1).with_account(ALICE);

        // Not authorized yet
        assert!(wallet.accounts().await.unwrap().is_empty());

        // Authorize
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![ALICE]);
        assert_eq!(wallet.accounts().await.unwrap(), vec![ALICE]);
        assert_eq!(wallet.chain_id().await.unwrap(), 1);

        // Unknown chain
        let err = wallet.switch_chain(59141).await.unwrap_err();
        assert!(err.is_unrecognized_chain());

        // Register and switch
        let mut subscription = wallet.subscribe();
        wallet.add_chain(&NetworkDescriptor::linea_sepolia()).await.unwrap();
        wallet.switch_chain(59141).await.unwrap();
        assert_eq!(wallet.active_chain(), 59141);
        assert_eq!(
            subscription.next().await,
            Some(ProviderNotification::ChainChanged(59141))
        );

        // Send and mine
        let to = address!("8f119cd256a0FfFeed643E830ADCD9767a1d517F");
        let hash = wallet
            .send_transaction(&TransactionRequest::new(to, vec![1, 2, 3, 4]).from(ALICE))
            .await
            .unwrap();
        let receipt = wallet.transaction_receipt(hash).await.unwrap().unwrap();
        assert!(receipt.succeeded());
        assert!(wallet.block_number().await.unwrap() > receipt.block_number());
        assert_eq!(wallet.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn rejected_connection_reports_user_rejection() {
        let wallet = MockWalletProvider::new(1).with_account(ALICE);
        wallet.reject_requests();

        let err = wallet.request_accounts().await.unwrap_err();
        assert!(err.is_user_rejected());
    }

    #[tokio::test]
    async fn scripted_calls_are_keyed_by_selector() {
        let wallet = MockWalletProvider::new(1);
        let to = address!("8f119cd256a0FfFeed643E830ADCD9767a1d517F");
        wallet.on_call(to, [0xaa, 0xbb, 0xcc, 0xdd], |data| Ok(data[4..].to_vec()));

        let out = wallet
            .call(&TransactionRequest::new(to, vec![0xaa, 0xbb, 0xcc, 0xdd, 0x07]))
            .await
            .unwrap();
        assert_eq!(out.as_ref(), &[0x07]);

        let err = wallet
            .call(&TransactionRequest::new(to, vec![0, 0, 0, 0]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ProviderError::SERVER);
    }
}
