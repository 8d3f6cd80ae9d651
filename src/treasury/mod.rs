//! Funding and outgoing calls
//!
//! The treasury pools deposited value and acts as the default
//! [`CallExecutor`] used when an approved transaction executes.

pub mod executor;
pub mod treasury;

pub use executor::{hex_bytes, CallError, CallExecutor, CallRecord};
pub use treasury::{DepositError, DepositReceipt, Treasury};
