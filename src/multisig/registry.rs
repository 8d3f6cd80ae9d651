//! Owner registry
//!
//! The fixed set of owners and the confirmation threshold (M of N). Both are
//! validated once at construction and never change afterwards.

use crate::core::Address;
use crate::treasury::{CallError, DepositError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors related to multisig operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Not the owner: {0}")]
    NotOwner(Address),
    #[error("transaction does not exist: {0}")]
    TransactionNotFound(usize),
    #[error("tx already confirmed: {index} by {owner}")]
    AlreadyConfirmed { index: usize, owner: Address },
    #[error("tx not confirmed: {index} by {owner}")]
    NotConfirmed { index: usize, owner: Address },
    #[error("tx already executed: {0}")]
    AlreadyExecuted(usize),
    #[error("Can't execute tx not enough confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: usize },
    #[error("Value must be greater than 0")]
    ZeroValue,
    #[error("Balance overflow")]
    BalanceOverflow,
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),
    #[error("Call failed: {0}")]
    CallFailed(#[from] CallError),
}

impl From<DepositError> for MultisigError {
    fn from(err: DepositError) -> Self {
        match err {
            DepositError::ZeroValue => MultisigError::ZeroValue,
            DepositError::Overflow => MultisigError::BalanceOverflow,
        }
    }
}

/// Serialized form of the registry, re-validated on load
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    pub owners: Vec<Address>,
    pub num_confirmations_required: usize,
}

/// Immutable owner set and confirmation threshold
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RegistryConfig", into = "RegistryConfig")]
pub struct OwnerRegistry {
    /// Owners in construction order
    owners: Vec<Address>,
    /// Membership index over `owners`
    lookup: HashSet<Address>,
    /// Threshold (M in M-of-N)
    required: usize,
}

impl OwnerRegistry {
    /// Create a registry
    ///
    /// # Errors
    /// `InvalidConstruction` if the owner list is empty, has duplicates or the
    /// zero address, or if `required` is outside `1..=owners.len()`.
    pub fn new(owners: Vec<Address>, required: usize) -> Result<Self, MultisigError> {
        if owners.is_empty() {
            return Err(MultisigError::InvalidConstruction(
                "owners required".to_string(),
            ));
        }

        if required == 0 || required > owners.len() {
            return Err(MultisigError::InvalidConstruction(format!(
                "invalid number of required confirmations: {} of {} owners",
                required,
                owners.len()
            )));
        }

        let mut lookup = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if owner.is_zero() {
                return Err(MultisigError::InvalidConstruction(
                    "invalid owner: zero address".to_string(),
                ));
            }
            if !lookup.insert(*owner) {
                return Err(MultisigError::InvalidConstruction(format!(
                    "owner not unique: {}",
                    owner
                )));
            }
        }

        Ok(Self {
            owners,
            lookup,
            required,
        })
    }

    /// Whether `address` is one of the owners
    pub fn is_owner(&self, address: &Address) -> bool {
        self.lookup.contains(address)
    }

    /// Fail with `NotOwner` unless `address` is an owner
    pub fn require_owner(&self, address: &Address) -> Result<(), MultisigError> {
        if self.is_owner(address) {
            Ok(())
        } else {
            Err(MultisigError::NotOwner(*address))
        }
    }

    /// The threshold M
    pub fn num_confirmations_required(&self) -> usize {
        self.required
    }

    /// Owners in construction order
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// N
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required, self.owners.len())
    }
}

impl PartialEq for OwnerRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.owners == other.owners && self.required == other.required
    }
}

impl Eq for OwnerRegistry {}

impl TryFrom<RegistryConfig> for OwnerRegistry {
    type Error = MultisigError;

    fn try_from(config: RegistryConfig) -> Result<Self, Self::Error> {
        Self::new(config.owners, config.num_confirmations_required)
    }
}

impl From<OwnerRegistry> for RegistryConfig {
    fn from(registry: OwnerRegistry) -> Self {
        Self {
            owners: registry.owners,
            num_confirmations_required: registry.required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_owners() -> Vec<Address> {
        vec![
            Address::new([0xa1; 20]),
            Address::new([0xb2; 20]),
            Address::new([0xc3; 20]),
        ]
    }

    #[test]
    fn test_registry_creation() {
        let owners = sample_owners();
        let registry = OwnerRegistry::new(owners.clone(), 2).unwrap();

        for owner in &owners {
            assert!(registry.is_owner(owner));
        }
        assert!(!registry.is_owner(&Address::new([0xd4; 20])));
        assert_eq!(registry.num_confirmations_required(), 2);
        assert_eq!(registry.owner_count(), 3);
        assert_eq!(registry.owners(), owners.as_slice());
        assert_eq!(registry.description(), "2-of-3");
    }

    #[test]
    fn test_every_valid_threshold_accepted() {
        let owners = sample_owners();
        for m in 1..=owners.len() {
            let registry = OwnerRegistry::new(owners.clone(), m).unwrap();
            assert_eq!(registry.num_confirmations_required(), m);
        }
    }

    #[test]
    fn test_single_owner_registry() {
        let owner = Address::new([9; 20]);
        let registry = OwnerRegistry::new(vec![owner], 1).unwrap();
        assert!(registry.is_owner(&owner));
        assert_eq!(registry.description(), "1-of-1");
    }

    #[test]
    fn test_registry_validation() {
        // Empty owner list
        assert!(matches!(
            OwnerRegistry::new(vec![], 1),
            Err(MultisigError::InvalidConstruction(_))
        ));

        // Zero threshold
        assert!(matches!(
            OwnerRegistry::new(sample_owners(), 0),
            Err(MultisigError::InvalidConstruction(_))
        ));

        // Threshold > owners
        assert!(matches!(
            OwnerRegistry::new(sample_owners(), 4),
            Err(MultisigError::InvalidConstruction(_))
        ));

        // Duplicate owners
        let dup = Address::new([1; 20]);
        assert!(matches!(
            OwnerRegistry::new(vec![dup, dup], 1),
            Err(MultisigError::InvalidConstruction(_))
        ));

        // Zero address
        assert!(matches!(
            OwnerRegistry::new(vec![Address::new([1; 20]), Address::ZERO], 1),
            Err(MultisigError::InvalidConstruction(_))
        ));
    }

    #[test]
    fn test_require_owner() {
        let registry = OwnerRegistry::new(sample_owners(), 2).unwrap();
        let outsider = Address::new([0xee; 20]);

        assert!(registry.require_owner(&sample_owners()[0]).is_ok());
        assert_eq!(
            registry.require_owner(&outsider),
            Err(MultisigError::NotOwner(outsider))
        );
    }

    #[test]
    fn test_serde_revalidates() {
        let registry = OwnerRegistry::new(sample_owners(), 2).unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        let back: OwnerRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
        assert!(back.is_owner(&sample_owners()[1]));

        let tampered = json.replace("\"num_confirmations_required\":2", "\"num_confirmations_required\":5");
        assert!(serde_json::from_str::<OwnerRegistry>(&tampered).is_err());
    }
}
