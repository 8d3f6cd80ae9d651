//! External call capability
//!
//! Execution of an approved transaction hands `(target, value, payload)` to a
//! [`CallExecutor`]. The ledger only observes success or failure.

use crate::core::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a call executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: u128, required: u128 },
    #[error("Call rejected: {0}")]
    Rejected(String),
}

/// A completed external call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallRecord {
    /// Ledger index of the transaction that triggered the call
    pub tx_index: usize,
    pub target: Address,
    pub value: u128,
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
    pub called_at: DateTime<Utc>,
}

/// Capability that performs an outgoing call or transfer
///
/// Implementations must be all-or-nothing: on `Err` no effect of the call may
/// remain observable.
pub trait CallExecutor {
    fn call(
        &mut self,
        tx_index: usize,
        target: &Address,
        value: u128,
        payload: &[u8],
    ) -> Result<CallRecord, CallError>;
}

/// Serde adapter rendering byte vectors as `0x`-prefixed hex
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
