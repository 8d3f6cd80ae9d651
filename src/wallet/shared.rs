//! Shared wallet handle
//!
//! Serializes concurrent callers: every operation takes the write lock for its
//! whole duration, so each runs to completion before the next begins.

use crate::core::Address;
use crate::multisig::{EventRecord, MultisigError};
use crate::treasury::CallRecord;
use crate::wallet::MultisigWallet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock, RwLockReadGuard};

/// Cloneable handle to a wallet shared between tasks
#[derive(Clone, Debug)]
pub struct SharedWallet {
    inner: Arc<RwLock<MultisigWallet>>,
}

impl SharedWallet {
    pub fn new(wallet: MultisigWallet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(wallet)),
        }
    }

    /// Read access for queries
    pub async fn read(&self) -> RwLockReadGuard<'_, MultisigWallet> {
        self.inner.read().await
    }

    pub async fn deposit(&self, sender: Address, amount: u128) -> Result<u128, MultisigError> {
        self.inner.write().await.deposit(sender, amount)
    }

    pub async fn submit_transaction(
        &self,
        caller: Address,
        target: Address,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<usize, MultisigError> {
        self.inner
            .write()
            .await
            .submit_transaction(caller, target, value, payload)
    }

    pub async fn confirm_transaction(
        &self,
        caller: Address,
        index: usize,
    ) -> Result<(), MultisigError> {
        self.inner.write().await.confirm_transaction(caller, index)
    }

    pub async fn revoke_confirmation(
        &self,
        caller: Address,
        index: usize,
    ) -> Result<(), MultisigError> {
        self.inner.write().await.revoke_confirmation(caller, index)
    }

    pub async fn execute_transaction(
        &self,
        caller: Address,
        index: usize,
    ) -> Result<CallRecord, MultisigError> {
        self.inner.write().await.execute_transaction(caller, index)
    }

    /// Subscribe to wallet events
    pub async fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.inner.read().await.subscribe()
    }

    /// Owned copy of the current state
    pub async fn snapshot(&self) -> MultisigWallet {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Vec<Address> {
        (1..=4u8).map(|b| Address::new([b; 20])).collect()
    }

    #[tokio::test]
    async fn test_concurrent_execution_runs_once() {
        let owners = owners();
        let shared = SharedWallet::new(MultisigWallet::new(owners.clone(), 2).unwrap());
        shared.deposit(owners[3], 1_000).await.unwrap();

        let index = shared
            .submit_transaction(owners[0], owners[3], 400, vec![])
            .await
            .unwrap();
        shared.confirm_transaction(owners[1], index).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            for owner in owners.clone() {
                let wallet = shared.clone();
                handles.push(tokio::spawn(async move {
                    wallet.execute_transaction(owner, index).await
                }));
            }
        }

        let mut successes = 0;
        let mut already_executed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(MultisigError::AlreadyExecuted(_)) => already_executed += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(already_executed, 31);

        let state = shared.read().await;
        assert_eq!(state.balance(), 600);
        assert_eq!(state.treasury().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_confirmations_counted_once() {
        let owners = owners();
        let shared = SharedWallet::new(MultisigWallet::new(owners.clone(), 4).unwrap());
        let index = shared
            .submit_transaction(owners[0], owners[1], 0, vec![])
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            for owner in owners.iter().skip(1).copied() {
                let wallet = shared.clone();
                handles.push(tokio::spawn(async move {
                    wallet.confirm_transaction(owner, index).await
                }));
            }
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 3);
        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.transaction(index).unwrap().num_confirmations(), 4);
    }

    #[tokio::test]
    async fn test_snapshot_does_not_notify_live_subscribers() {
        let owners = owners();
        let shared = SharedWallet::new(MultisigWallet::new(owners.clone(), 2).unwrap());
        let mut rx = shared.subscribe().await;

        let mut snapshot = shared.snapshot().await;
        snapshot
            .submit_transaction(owners[0], owners[1], 0, vec![])
            .unwrap();

        assert_eq!(snapshot.transaction_count(), 1);
        assert_eq!(shared.read().await.transaction_count(), 0);
        assert_eq!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty));
    }
}
