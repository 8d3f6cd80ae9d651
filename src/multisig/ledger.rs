//! Transaction ledger
//!
//! Holds every proposed transaction in submission order and implements the
//! submit / confirm / revoke / execute lifecycle. Each operation authorizes the
//! caller against an [`OwnerRegistry`] and checks all preconditions before it
//! writes anything, so a failed call leaves the ledger untouched.

use crate::core::Address;
use crate::multisig::registry::{MultisigError, OwnerRegistry};
use crate::multisig::transaction::{Transaction, TransactionStatus};
use crate::treasury::{CallExecutor, CallRecord};
use serde::{Deserialize, Serialize};

/// Ordered collection of proposed transactions
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Propose a transaction
    ///
    /// The submitter's confirmation is recorded immediately, so a new
    /// transaction starts with one confirmation.
    pub fn submit_transaction(
        &mut self,
        registry: &OwnerRegistry,
        caller: &Address,
        target: Address,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<usize, MultisigError> {
        registry.require_owner(caller)?;

        let index = self.transactions.len();
        let mut tx = Transaction::new(index, *caller, target, value, payload);
        tx.add_confirmation(*caller);
        self.transactions.push(tx);

        Ok(index)
    }

    /// Add the caller's confirmation to transaction `index`
    pub fn confirm_transaction(
        &mut self,
        registry: &OwnerRegistry,
        caller: &Address,
        index: usize,
    ) -> Result<(), MultisigError> {
        registry.require_owner(caller)?;
        let tx = self.get_mut(index)?;

        if tx.executed {
            return Err(MultisigError::AlreadyExecuted(index));
        }
        if tx.is_confirmed_by(caller) {
            return Err(MultisigError::AlreadyConfirmed {
                index,
                owner: *caller,
            });
        }

        tx.add_confirmation(*caller);
        Ok(())
    }

    /// Withdraw the caller's confirmation from transaction `index`
    pub fn revoke_confirmation(
        &mut self,
        registry: &OwnerRegistry,
        caller: &Address,
        index: usize,
    ) -> Result<(), MultisigError> {
        registry.require_owner(caller)?;
        let tx = self.get_mut(index)?;

        if tx.executed {
            return Err(MultisigError::AlreadyExecuted(index));
        }
        if !tx.remove_confirmation(caller) {
            return Err(MultisigError::NotConfirmed {
                index,
                owner: *caller,
            });
        }

        Ok(())
    }

    /// Execute transaction `index` through `executor`
    ///
    /// The transaction is marked executed before the call is made. If the call
    /// fails the mark is rolled back and the error surfaces as `CallFailed`.
    pub fn execute_transaction(
        &mut self,
        registry: &OwnerRegistry,
        caller: &Address,
        index: usize,
        executor: &mut dyn CallExecutor,
    ) -> Result<CallRecord, MultisigError> {
        registry.require_owner(caller)?;
        let required = registry.num_confirmations_required();
        let tx = self.get_mut(index)?;

        if tx.executed {
            return Err(MultisigError::AlreadyExecuted(index));
        }
        let have = tx.num_confirmations();
        if have < required {
            return Err(MultisigError::InsufficientConfirmations {
                have,
                need: required,
            });
        }

        let previous_update = tx.updated_at;
        tx.mark_executed();

        match executor.call(index, &tx.target, tx.value, &tx.payload) {
            Ok(record) => Ok(record),
            Err(err) => {
                tx.rollback_execution(previous_update);
                Err(err.into())
            }
        }
    }

    /// Transaction at `index`
    pub fn transaction(&self, index: usize) -> Result<&Transaction, MultisigError> {
        self.transactions
            .get(index)
            .ok_or(MultisigError::TransactionNotFound(index))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Transaction, MultisigError> {
        self.transactions
            .get_mut(index)
            .ok_or(MultisigError::TransactionNotFound(index))
    }

    /// Whether `owner` currently confirms transaction `index`
    pub fn is_confirmed(&self, index: usize, owner: &Address) -> Result<bool, MultisigError> {
        Ok(self.transaction(index)?.is_confirmed_by(owner))
    }

    /// Owners confirming transaction `index`
    pub fn confirmations(&self, index: usize) -> Result<Vec<Address>, MultisigError> {
        Ok(self.transaction(index)?.confirmations().copied().collect())
    }

    /// Number of transactions ever submitted
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// All transactions in submission order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions not yet executed
    pub fn pending(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| !tx.executed)
    }

    /// Transactions with the given status under `registry`'s threshold
    pub fn with_status<'a>(
        &'a self,
        registry: &'a OwnerRegistry,
        status: TransactionStatus,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        let required = registry.num_confirmations_required();
        self.transactions
            .iter()
            .filter(move |tx| tx.status(required) == status)
    }

    /// Check the structural invariants against `registry`
    ///
    /// Used after loading persisted state.
    pub fn verify_integrity(&self, registry: &OwnerRegistry) -> Result<(), String> {
        for (position, tx) in self.transactions.iter().enumerate() {
            if tx.index != position {
                return Err(format!(
                    "transaction at position {} carries index {}",
                    position, tx.index
                ));
            }
            if let Some(stranger) = tx.confirmations().find(|a| !registry.is_owner(a)) {
                return Err(format!(
                    "transaction {} confirmed by non-owner {}",
                    position, stranger
                ));
            }
            if !registry.is_owner(&tx.submitter) {
                return Err(format!(
                    "transaction {} submitted by non-owner {}",
                    position, tx.submitter
                ));
            }
            if tx.executed != tx.executed_at.is_some() {
                return Err(format!(
                    "transaction {} has inconsistent execution state",
                    position
                ));
            }
            if tx.executed && !tx.has_quorum(registry.num_confirmations_required()) {
                return Err(format!(
                    "transaction {} executed with {} of {} confirmations",
                    position,
                    tx.num_confirmations(),
                    registry.num_confirmations_required()
                ));
            }
        }
        Ok(())
    }
}
