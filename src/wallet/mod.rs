//! Multisig wallet facade
//!
//! [`MultisigWallet`] owns the registry, ledger, treasury and event log;
//! [`SharedWallet`] hands it out to concurrent tasks.

pub mod shared;
pub mod wallet;

pub use shared::SharedWallet;
pub use wallet::MultisigWallet;
