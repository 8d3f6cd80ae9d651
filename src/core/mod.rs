//! Core value types
//!
//! - Account addresses
//! - Value amounts and denominations

pub mod address;
pub mod amount;

pub use address::{Address, AddressError, ADDRESS_LEN};
pub use amount::{format_ether, parse_amount, AmountError, ONE_ETHER, ONE_GWEI};
