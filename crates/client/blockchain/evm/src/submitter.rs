//! Transaction submission pipeline.
//!
//! Shared by every signed action:
//! 1. Estimate gas for the exact call and pad it by 20% (floor)
//! 2. Send with the padded limit
//! 3. Poll until the receipt is buried under the action's confirmation count
//! 4. Reject reverted receipts
//!
//! Event decoding happens afterwards against the confirmed receipt.

use std::time::Duration;

use alloy_primitives::{Address, B256};
use alloy_sol_types::SolEvent;

use client_blockchain_core::{
    ActionKind, ChainError, ProviderExt, TransactionReceipt, TransactionRequest, WalletProvider,
};

use crate::config::{Confirmations, EvmConfig};
use crate::gateway::ContractHandle;

/// Gas limit from an estimate: `floor(estimate * 1.2)`.
///
/// Computed in 128-bit integers so no estimate can overflow or round up.
pub fn pad_gas(estimate: u64) -> u64 {
    let padded = u128::from(estimate) * 120 / 100;
    u64::try_from(padded).unwrap_or(u64::MAX)
}

/// Submits transactions and waits for their confirmation.
#[derive(Debug, Clone)]
pub struct ActionSubmitter {
    confirmations: Confirmations,
    poll_interval: Duration,
}

impl ActionSubmitter {
    pub fn new(confirmations: Confirmations, poll_interval: Duration) -> Self {
        Self {
            confirmations,
            poll_interval,
        }
    }

    pub fn from_config(config: &EvmConfig) -> Self {
        Self::new(config.confirmations, config.poll_interval)
    }

    pub fn confirmations(&self) -> &Confirmations {
        &self.confirmations
    }

    /// Run the pipeline for `tx` and return the confirmed, successful receipt.
    ///
    /// There is no timeout: a transaction that never mines keeps this future
    /// pending. Dropping it stops tracking but cannot cancel the transaction.
    pub async fn submit(
        &self,
        handle: &ContractHandle,
        action: ActionKind,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, ChainError> {
        let translate = |err| ChainError::from_action(action, err);

        let estimate = handle.estimate_gas(&tx).await.map_err(translate)?;
        let gas_limit = pad_gas(estimate);
        tracing::debug!(
            "Gas estimate for {}: {} (limit {})",
            action,
            estimate,
            gas_limit
        );

        let hash = handle.send(&tx.gas_limit(gas_limit)).await.map_err(translate)?;
        tracing::info!("Submitted {} transaction {}", action, hash);

        let required = self.confirmations.for_action(action);
        let receipt = self
            .wait_for_confirmations(handle.provider(), action, hash, required)
            .await?;

        if !receipt.succeeded() {
            tracing::warn!("{} transaction {} reverted", action, hash);
            return Err(ChainError::TransactionFailed {
                transaction_hash: hash,
            });
        }

        tracing::info!(
            "{} confirmed in block {} ({} confirmations)",
            action,
            receipt.block_number(),
            required
        );
        Ok(receipt)
    }

    /// Poll until `hash` is mined and `confirmations` blocks deep (the
    /// inclusion block counts as the first).
    pub async fn wait_for_confirmations(
        &self,
        provider: &dyn WalletProvider,
        action: ActionKind,
        hash: B256,
        confirmations: u64,
    ) -> Result<TransactionReceipt, ChainError> {
        let translate = |err| ChainError::from_action(action, err);

        let receipt = loop {
            match provider.transaction_receipt(hash).await.map_err(translate)? {
                Some(receipt) => break receipt,
                None => tokio::time::sleep(self.poll_interval).await,
            }
        };

        let target = receipt
            .block_number()
            .saturating_add(confirmations.saturating_sub(1));
        loop {
            let current = provider.block_number().await.map_err(translate)?;
            if current >= target {
                return Ok(receipt);
            }
            tracing::trace!("Waiting for block {} (at {})", target, current);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// First log emitted by `contract` that decodes as `E` and satisfies `accept`.
///
/// Logs with a matching topic that fail to decode are skipped.
pub fn find_event<E, F>(receipt: &TransactionReceipt, contract: Address, accept: F) -> Option<E>
where
    E: SolEvent,
    F: Fn(&E) -> bool,
{
    receipt
        .logs
        .iter()
        .filter(|log| log.address == contract)
        .filter(|log| log.topics.first() == Some(&E::SIGNATURE_HASH))
        .filter_map(
            |log| match E::decode_raw_log(log.topics.iter().copied(), &log.data, true) {
                Ok(event) => Some(event),
                Err(err) => {
                    tracing::warn!("Failed to parse {} log: {}", E::SIGNATURE, err);
                    None
                }
            },
        )
        .find(|event| accept(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::IPokemonNFT;
    use alloy_primitives::{U256, address};
    use client_blockchain_core::Log;

    const CONTRACT: Address = address!("8f119cd256a0FfFeed643E830ADCD9767a1d517F");

    #[test]
    fn gas_padding_is_floor_of_one_point_two() {
        assert_eq!(pad_gas(100_000), 120_000);
        assert_eq!(pad_gas(21_001), 25_201);
        assert_eq!(pad_gas(1), 1);
        assert_eq!(pad_gas(4), 4);
        assert_eq!(pad_gas(5), 6);
        assert_eq!(pad_gas(0), 0);
        assert_eq!(pad_gas(u64::MAX), u64::MAX);
    }

    #[test]
    fn gas_padding_matches_reference_for_many_values() {
        for g in (0..10_000u64).step_by(7) {
            assert_eq!(pad_gas(g), g * 6 / 5);
        }
    }

    fn completed_log(contract: Address, pokemon: u64, xp: u64) -> Log {
        let event = IPokemonNFT::TrainingCompleted {
            pokemonId: U256::from(pokemon),
            trainer: address!("00000000000000000000000000000000000a11ce"),
            xpGained: U256::from(xp),
        };
        let data = event.encode_log_data();
        Log {
            address: contract,
            topics: data.topics().to_vec(),
            data: data.data,
        }
    }

    fn receipt(logs: Vec<Log>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::ZERO,
            block_number: alloy_primitives::U64::from(10u64),
            status: alloy_primitives::U64::from(1u64),
            gas_used: alloy_primitives::U64::from(50_000u64),
            logs,
        }
    }

    #[test]
    fn finds_first_matching_event() {
        let receipt = receipt(vec![
            completed_log(CONTRACT, 4, 30),
            completed_log(CONTRACT, 7, 50),
        ]);

        let event: IPokemonNFT::TrainingCompleted =
            find_event(&receipt, CONTRACT, |_| true).unwrap();
        assert_eq!(event.xpGained, U256::from(30));

        let event: IPokemonNFT::TrainingCompleted =
            find_event(&receipt, CONTRACT, |e: &IPokemonNFT::TrainingCompleted| {
                e.pokemonId == U256::from(7)
            })
            .unwrap();
        assert_eq!(event.xpGained, U256::from(50));
    }

    #[test]
    fn ignores_logs_from_other_contracts() {
        let other = address!("0000000000000000000000000000000000000bad");
        let receipt = receipt(vec![completed_log(other, 4, 30)]);

        let event: Option<IPokemonNFT::TrainingCompleted> =
            find_event(&receipt, CONTRACT, |_| true);
        assert!(event.is_none());
    }

    #[test]
    fn ignores_other_events() {
        let receipt = receipt(vec![completed_log(CONTRACT, 4, 30)]);
        let event: Option<IPokemonNFT::TransferSingle> = find_event(&receipt, CONTRACT, |_| true);
        assert!(event.is_none());
    }
}
