//! Wallet treasury
//!
//! Holds the pooled balance that deposits credit and executions spend.
//! Outgoing value is tracked per recipient so the books always balance.

use crate::core::Address;
use crate::treasury::executor::{CallError, CallExecutor, CallRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Deposit-side errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepositError {
    #[error("Value must be greater than 0")]
    ZeroValue,
    #[error("Balance overflow")]
    Overflow,
}

/// An accepted deposit
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepositReceipt {
    pub sender: Address,
    pub amount: u128,
    /// Pool balance after the deposit
    pub balance: u128,
    pub deposited_at: DateTime<Utc>,
}

/// Pooled funds of the wallet
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Treasury {
    balance: u128,
    total_deposited: u128,
    /// Value paid out by executed calls, by recipient
    payouts: BTreeMap<Address, u128>,
    /// Every successful outgoing call, in execution order
    calls: Vec<CallRecord>,
}

impl Treasury {
    /// Create an empty treasury
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit the pool. Anyone may deposit.
    pub fn deposit(&mut self, sender: Address, amount: u128) -> Result<DepositReceipt, DepositError> {
        if amount == 0 {
            return Err(DepositError::ZeroValue);
        }

        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(DepositError::Overflow)?;
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(DepositError::Overflow)?;

        self.balance = balance;
        self.total_deposited = total_deposited;

        Ok(DepositReceipt {
            sender,
            amount,
            balance,
            deposited_at: Utc::now(),
        })
    }

    /// Spendable balance
    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Sum of all deposits ever accepted
    pub fn total_deposited(&self) -> u128 {
        self.total_deposited
    }

    /// Value received by `recipient` through executed transactions
    pub fn paid_to(&self, recipient: &Address) -> u128 {
        self.payouts.get(recipient).copied().unwrap_or(0)
    }

    /// Sum of all payouts, `None` if it does not fit in a `u128`
    pub fn total_paid(&self) -> Option<u128> {
        self.payouts
            .values()
            .try_fold(0u128, |acc, value| acc.checked_add(*value))
    }

    /// Outgoing call history
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Deposits minus payouts must equal the balance
    pub fn is_balanced(&self) -> bool {
        self.total_paid()
            .and_then(|paid| self.total_deposited.checked_sub(paid))
            .is_some_and(|expected| expected == self.balance)
    }
}

impl CallExecutor for Treasury {
    fn call(
        &mut self,
        tx_index: usize,
        target: &Address,
        value: u128,
        payload: &[u8],
    ) -> Result<CallRecord, CallError> {
        if value > self.balance {
            return Err(CallError::InsufficientBalance {
                available: self.balance,
                required: value,
            });
        }

        self.balance -= value;
        *self.payouts.entry(*target).or_insert(0) += value;

        let record = CallRecord {
            tx_index,
            target: *target,
            value,
            payload: payload.to_vec(),
            called_at: Utc::now(),
        };
        self.calls.push(record.clone());

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ONE_ETHER;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_deposit_increases_balance() {
        let mut treasury = Treasury::new();
        let receipt = treasury.deposit(addr(1), ONE_ETHER).unwrap();

        assert_eq!(receipt.balance, ONE_ETHER);
        assert_eq!(treasury.balance(), ONE_ETHER);
        assert_eq!(treasury.total_deposited(), ONE_ETHER);
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut treasury = Treasury::new();
        assert_eq!(treasury.deposit(addr(1), 0), Err(DepositError::ZeroValue));
        assert_eq!(treasury.balance(), 0);
    }

    #[test]
    fn test_deposit_overflow_leaves_balance() {
        let mut treasury = Treasury::new();
        treasury.deposit(addr(1), u128::MAX).unwrap();
        assert_eq!(treasury.deposit(addr(1), 1), Err(DepositError::Overflow));
        assert_eq!(treasury.balance(), u128::MAX);
    }

    #[test]
    fn test_call_moves_value() {
        let mut treasury = Treasury::new();
        treasury.deposit(addr(1), 100).unwrap();

        let record = treasury.call(0, &addr(2), 40, b"\x01\x02").unwrap();
        assert_eq!(record.value, 40);
        assert_eq!(record.payload, vec![1, 2]);
        assert_eq!(treasury.balance(), 60);
        assert_eq!(treasury.paid_to(&addr(2)), 40);
        assert_eq!(treasury.calls().len(), 1);
        assert!(treasury.is_balanced());
    }

    #[test]
    fn test_call_with_insufficient_balance_has_no_effect() {
        let mut treasury = Treasury::new();
        treasury.deposit(addr(1), 10).unwrap();

        let result = treasury.call(0, &addr(2), 11, &[]);
        assert_eq!(
            result,
            Err(CallError::InsufficientBalance {
                available: 10,
                required: 11
            })
        );
        assert_eq!(treasury.balance(), 10);
        assert_eq!(treasury.paid_to(&addr(2)), 0);
        assert!(treasury.calls().is_empty());
    }

    #[test]
    fn test_zero_value_call_succeeds_on_empty_pool() {
        let mut treasury = Treasury::new();
        assert!(treasury.call(3, &addr(2), 0, &[]).is_ok());
        assert_eq!(treasury.calls()[0].tx_index, 3);
    }

    #[test]
    fn test_overflowing_payouts_are_unbalanced() {
        let mut treasury = Treasury::new();
        treasury.deposit(addr(1), 1).unwrap();

        let text = serde_json::to_string(&treasury).unwrap();
        let payouts = format!(
            r#""payouts":{{"{}":{},"{}":1}}"#,
            addr(2),
            u128::MAX,
            addr(3)
        );
        let text = text.replace(r#""payouts":{}"#, &payouts);
        assert!(text.contains(&payouts));
        let tampered: Treasury = serde_json::from_str(&text).unwrap();

        assert_eq!(tampered.total_paid(), None);
        assert!(!tampered.is_balanced());
    }
}
