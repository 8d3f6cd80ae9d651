//! Proposed transactions
//!
//! A transaction is a `(target, value, payload)` action tracked together with
//! the set of owners currently confirming it and a one-shot executed flag.

use crate::core::Address;
use crate::crypto::sha256_hex;
use crate::treasury::hex_bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle status, derived from confirmations and the executed flag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Fewer confirmations than the threshold
    AwaitingConfirmations,
    /// Quorum reached, not yet executed
    Ready,
    /// Executed; terminal
    Executed,
}

/// A proposed action awaiting confirmations
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Position in the ledger, assigned at submission
    pub index: usize,
    /// Destination of the call or transfer
    pub target: Address,
    /// Amount to transfer, in base units
    pub value: u128,
    /// Opaque call data
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
    /// Set once, when execution succeeds
    pub executed: bool,
    /// Owners with an outstanding confirmation
    confirmed_by: BTreeSet<Address>,
    /// Owner that proposed the transaction
    pub submitter: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create an unconfirmed transaction
    pub fn new(
        index: usize,
        submitter: Address,
        target: Address,
        value: u128,
        payload: Vec<u8>,
    ) -> Self {
        let now = Utc::now();

        Self {
            index,
            target,
            value,
            payload,
            executed: false,
            confirmed_by: BTreeSet::new(),
            submitter,
            created_at: now,
            updated_at: now,
            executed_at: None,
        }
    }

    /// Number of outstanding confirmations
    pub fn num_confirmations(&self) -> usize {
        self.confirmed_by.len()
    }

    /// Whether `owner` currently confirms this transaction
    pub fn is_confirmed_by(&self, owner: &Address) -> bool {
        self.confirmed_by.contains(owner)
    }

    /// Confirming owners, in address order
    pub fn confirmations(&self) -> impl Iterator<Item = &Address> {
        self.confirmed_by.iter()
    }

    /// Record a confirmation. Returns false if `owner` had already confirmed.
    pub(crate) fn add_confirmation(&mut self, owner: Address) -> bool {
        let added = self.confirmed_by.insert(owner);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    /// Drop a confirmation. Returns false if `owner` had not confirmed.
    pub(crate) fn remove_confirmation(&mut self, owner: &Address) -> bool {
        let removed = self.confirmed_by.remove(owner);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Whether the confirmation count meets `required`
    pub fn has_quorum(&self, required: usize) -> bool {
        self.num_confirmations() >= required
    }

    /// Status relative to a threshold
    pub fn status(&self, required: usize) -> TransactionStatus {
        if self.executed {
            TransactionStatus::Executed
        } else if self.has_quorum(required) {
            TransactionStatus::Ready
        } else {
            TransactionStatus::AwaitingConfirmations
        }
    }

    pub(crate) fn mark_executed(&mut self) {
        let now = Utc::now();
        self.executed = true;
        self.executed_at = Some(now);
        self.updated_at = now;
    }

    /// Undo `mark_executed` after a failed call
    pub(crate) fn rollback_execution(&mut self, previous_update: DateTime<Utc>) {
        self.executed = false;
        self.executed_at = None;
        self.updated_at = previous_update;
    }

    /// Content digest over index, target, value and payload
    pub fn digest(&self) -> String {
        let mut data = Vec::with_capacity(8 + 20 + 16 + self.payload.len());
        data.extend_from_slice(&(self.index as u64).to_be_bytes());
        data.extend_from_slice(self.target.as_bytes());
        data.extend_from_slice(&self.value.to_be_bytes());
        data.extend_from_slice(&self.payload);
        sha256_hex(&data)
    }

    /// Payload as `0x`-prefixed hex
    pub fn payload_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn sample_tx() -> Transaction {
        Transaction::new(0, addr(1), addr(2), 50, vec![0xde, 0xad])
    }

    #[test]
    fn test_new_transaction_is_unconfirmed() {
        let tx = sample_tx();
        assert_eq!(tx.num_confirmations(), 0);
        assert!(!tx.executed);
        assert!(tx.executed_at.is_none());
        assert_eq!(tx.status(1), TransactionStatus::AwaitingConfirmations);
    }

    #[test]
    fn test_confirmation_set_semantics() {
        let mut tx = sample_tx();

        assert!(tx.add_confirmation(addr(1)));
        assert!(!tx.add_confirmation(addr(1)));
        assert_eq!(tx.num_confirmations(), 1);

        assert!(!tx.remove_confirmation(&addr(2)));
        assert_eq!(tx.num_confirmations(), 1);

        assert!(tx.remove_confirmation(&addr(1)));
        assert_eq!(tx.num_confirmations(), 0);
        assert!(!tx.is_confirmed_by(&addr(1)));
    }

    #[test]
    fn test_status_transitions() {
        let mut tx = sample_tx();
        tx.add_confirmation(addr(1));
        tx.add_confirmation(addr(3));
        assert_eq!(tx.status(2), TransactionStatus::Ready);
        assert_eq!(tx.status(3), TransactionStatus::AwaitingConfirmations);

        tx.mark_executed();
        assert_eq!(tx.status(3), TransactionStatus::Executed);
        assert!(tx.executed_at.is_some());
    }

    #[test]
    fn test_rollback_execution() {
        let mut tx = sample_tx();
        let before = tx.updated_at;
        tx.mark_executed();
        tx.rollback_execution(before);

        assert!(!tx.executed);
        assert!(tx.executed_at.is_none());
        assert_eq!(tx.updated_at, before);
    }

    #[test]
    fn test_digest_depends_on_content() {
        let a = sample_tx();
        let mut b = sample_tx();
        assert_eq!(a.digest(), b.digest());

        b.payload.push(0);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_serde_payload_as_hex() {
        let mut tx = sample_tx();
        tx.add_confirmation(addr(1));

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["payload"], "0xdead");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
