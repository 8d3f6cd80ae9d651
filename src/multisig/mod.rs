//! Multi-signature transaction approval
//!
//! A fixed set of owners must reach an M-of-N quorum of confirmations before a
//! proposed transaction can execute, and each transaction executes at most
//! once.
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::core::Address;
//! use multisig_wallet::multisig::{OwnerRegistry, TransactionLedger};
//! use multisig_wallet::treasury::Treasury;
//!
//! let alice = Address::new([1; 20]);
//! let bob = Address::new([2; 20]);
//! let registry = OwnerRegistry::new(vec![alice, bob], 2).unwrap();
//! let mut ledger = TransactionLedger::new();
//! let mut treasury = Treasury::new();
//!
//! // Submitting counts as the first confirmation
//! let index = ledger.submit_transaction(&registry, &alice, bob, 0, vec![]).unwrap();
//! ledger.confirm_transaction(&registry, &bob, index).unwrap();
//! ledger.execute_transaction(&registry, &bob, index, &mut treasury).unwrap();
//!
//! assert!(ledger.transaction(index).unwrap().executed);
//! ```

pub mod events;
pub mod ledger;
pub mod registry;
pub mod transaction;

pub use events::{EventBroadcaster, EventLog, EventRecord, WalletEvent};
pub use ledger::TransactionLedger;
pub use registry::{MultisigError, OwnerRegistry, RegistryConfig};
pub use transaction::{Transaction, TransactionStatus};
