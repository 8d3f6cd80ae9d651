//! Multisig Wallet: M-of-N transaction approval in Rust
//!
//! This crate provides:
//! - An immutable owner registry with an M-of-N confirmation threshold
//! - A transaction ledger: submit, confirm, revoke and one-shot execute
//! - A treasury that pools deposits and pays out executed transactions
//! - Event notifications with history and live subscription
//! - JSON persistence with backups
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::core::{Address, ONE_ETHER};
//! use multisig_wallet::wallet::MultisigWallet;
//!
//! let (a, b, c) = (Address::new([1; 20]), Address::new([2; 20]), Address::new([3; 20]));
//! let mut wallet = MultisigWallet::new(vec![a, b, c], 2).unwrap();
//! wallet.deposit(c, ONE_ETHER).unwrap();
//!
//! // Submitting counts as the first confirmation
//! let index = wallet.submit_transaction(a, c, ONE_ETHER / 2, vec![]).unwrap();
//! wallet.confirm_transaction(b, index).unwrap();
//! wallet.execute_transaction(b, index).unwrap();
//!
//! assert_eq!(wallet.balance(), ONE_ETHER / 2);
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod multisig;
pub mod storage;
pub mod treasury;
pub mod wallet;

// Re-export commonly used types
pub use crate::core::{Address, ONE_ETHER};
pub use crypto::KeyPair;
pub use multisig::{
    MultisigError, OwnerRegistry, Transaction, TransactionLedger, TransactionStatus, WalletEvent,
};
pub use storage::{Storage, StorageConfig};
pub use treasury::{CallError, CallExecutor, CallRecord, Treasury};
pub use wallet::{MultisigWallet, SharedWallet};
