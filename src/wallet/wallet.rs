//! Multisig wallet
//!
//! Ties the owner registry, the transaction ledger, the treasury and the event
//! log together. Every operation names its caller explicitly and emits a
//! [`WalletEvent`] on success.

use crate::core::Address;
use crate::multisig::{
    EventLog, EventRecord, MultisigError, OwnerRegistry, Transaction, TransactionLedger,
    WalletEvent,
};
use crate::treasury::{CallExecutor, CallRecord, Treasury};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An M-of-N multisig wallet with its own funds
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigWallet {
    registry: OwnerRegistry,
    ledger: TransactionLedger,
    treasury: Treasury,
    events: EventLog,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MultisigWallet {
    /// Create a wallet for `owners` requiring `required` confirmations
    pub fn new(owners: Vec<Address>, required: usize) -> Result<Self, MultisigError> {
        let registry = OwnerRegistry::new(owners, required)?;
        log::info!(
            "Multisig wallet created: {} ({} owners)",
            registry.description(),
            registry.owner_count()
        );

        Ok(Self {
            registry,
            ledger: TransactionLedger::new(),
            treasury: Treasury::new(),
            events: EventLog::new(),
            created_at: Utc::now(),
        })
    }

    /// Credit `amount` to the wallet. Anyone may deposit.
    ///
    /// Returns the new balance.
    pub fn deposit(&mut self, sender: Address, amount: u128) -> Result<u128, MultisigError> {
        let receipt = self
            .treasury
            .deposit(sender, amount)
            .map_err(MultisigError::from)
            .map_err(|e| rejected("deposit", &sender, e))?;

        self.events.emit(WalletEvent::Deposit {
            sender,
            amount,
            balance: receipt.balance,
        });
        Ok(receipt.balance)
    }

    /// Propose a transaction; the caller's confirmation is recorded with it
    pub fn submit_transaction(
        &mut self,
        caller: Address,
        target: Address,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<usize, MultisigError> {
        let index = self
            .ledger
            .submit_transaction(&self.registry, &caller, target, value, payload.clone())
            .map_err(|e| rejected("submit", &caller, e))?;

        self.events.emit(WalletEvent::SubmitTransaction {
            owner: caller,
            index,
            target,
            value,
            payload,
        });
        Ok(index)
    }

    /// Confirm transaction `index`
    pub fn confirm_transaction(&mut self, caller: Address, index: usize) -> Result<(), MultisigError> {
        self.ledger
            .confirm_transaction(&self.registry, &caller, index)
            .map_err(|e| rejected("confirm", &caller, e))?;

        self.events
            .emit(WalletEvent::ConfirmTransaction { owner: caller, index });
        Ok(())
    }

    /// Revoke the caller's confirmation on transaction `index`
    pub fn revoke_confirmation(&mut self, caller: Address, index: usize) -> Result<(), MultisigError> {
        self.ledger
            .revoke_confirmation(&self.registry, &caller, index)
            .map_err(|e| rejected("revoke", &caller, e))?;

        self.events
            .emit(WalletEvent::RevokeConfirmation { owner: caller, index });
        Ok(())
    }

    /// Execute transaction `index`, paying from the wallet's own balance
    pub fn execute_transaction(
        &mut self,
        caller: Address,
        index: usize,
    ) -> Result<CallRecord, MultisigError> {
        let record = self
            .ledger
            .execute_transaction(&self.registry, &caller, index, &mut self.treasury)
            .map_err(|e| rejected("execute", &caller, e))?;

        self.events
            .emit(WalletEvent::ExecuteTransaction { owner: caller, index });
        Ok(record)
    }

    /// Execute transaction `index` through an external call capability
    pub fn execute_transaction_with(
        &mut self,
        caller: Address,
        index: usize,
        executor: &mut dyn CallExecutor,
    ) -> Result<CallRecord, MultisigError> {
        let record = self
            .ledger
            .execute_transaction(&self.registry, &caller, index, executor)
            .map_err(|e| rejected("execute", &caller, e))?;

        self.events
            .emit(WalletEvent::ExecuteTransaction { owner: caller, index });
        Ok(record)
    }

    /// Whether `address` is an owner
    pub fn is_owner(&self, address: &Address) -> bool {
        self.registry.is_owner(address)
    }

    /// The confirmation threshold
    pub fn num_confirmations_required(&self) -> usize {
        self.registry.num_confirmations_required()
    }

    /// Owners in construction order
    pub fn owners(&self) -> &[Address] {
        self.registry.owners()
    }

    /// Transaction at `index`
    pub fn transaction(&self, index: usize) -> Result<&Transaction, MultisigError> {
        self.ledger.transaction(index)
    }

    /// Whether `owner` currently confirms transaction `index`
    pub fn is_confirmed(&self, index: usize, owner: &Address) -> Result<bool, MultisigError> {
        self.ledger.is_confirmed(index, owner)
    }

    /// Number of submitted transactions
    pub fn transaction_count(&self) -> usize {
        self.ledger.transaction_count()
    }

    /// Spendable balance
    pub fn balance(&self) -> u128 {
        self.treasury.balance()
    }

    /// Description like "2-of-3"
    pub fn description(&self) -> String {
        self.registry.description()
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[EventRecord] {
        self.events.history()
    }

    /// Events touching transaction `index`
    pub fn events_for(&self, index: usize) -> Vec<&EventRecord> {
        self.events.for_transaction(index).collect()
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Check ledger and treasury invariants, e.g. after loading from disk
    pub fn verify_integrity(&self) -> Result<(), String> {
        self.ledger.verify_integrity(&self.registry)?;
        if !self.treasury.is_balanced() {
            return Err("treasury balance does not match deposits and payouts".to_string());
        }
        Ok(())
    }
}

fn rejected(operation: &str, caller: &Address, err: MultisigError) -> MultisigError {
    log::warn!("{} by {} rejected: {}", operation, caller, err);
    err
}
