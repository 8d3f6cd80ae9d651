//! Wallet persistence layer
//!
//! Provides save/load functionality for the wallet state.

use crate::wallet::MultisigWallet;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub wallet_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            wallet_file: "wallet.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Wallet storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Get the wallet file path
    fn wallet_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.wallet_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.wallet_file, index))
    }

    /// Save the wallet to disk
    pub fn save(&self, wallet: &MultisigWallet) -> Result<(), StorageError> {
        let path = self.wallet_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.wallet_file));
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, wallet)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;
        log::debug!("Wallet saved to {:?}", path);

        Ok(())
    }

    /// Load the wallet from disk
    pub fn load(&self) -> Result<MultisigWallet, StorageError> {
        load_from_file(&self.existing_wallet_path()?)
    }

    /// Deserialize the saved wallet without checking the ledger invariants
    pub fn read_unverified(&self) -> Result<MultisigWallet, StorageError> {
        read_from_file(&self.existing_wallet_path()?)
    }

    fn existing_wallet_path(&self) -> Result<PathBuf, StorageError> {
        let path = self.wallet_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Wallet file not found".to_string(),
            ));
        }

        Ok(path)
    }

    /// Check if a saved wallet exists
    pub fn exists(&self) -> bool {
        self.wallet_path().exists()
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        log::debug!("Rotated wallet backups in {:?}", self.config.data_dir);
        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<MultisigWallet, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

/// Save wallet to a specific file path
pub fn save_to_file(wallet: &MultisigWallet, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, wallet)?;
    Ok(())
}

/// Load wallet from a specific file path
///
/// The owner registry is re-validated while deserializing and the ledger
/// invariants are checked before the wallet is handed out.
pub fn load_from_file(path: &Path) -> Result<MultisigWallet, StorageError> {
    let wallet = read_from_file(path)?;
    wallet.verify_integrity().map_err(StorageError::InvalidData)?;
    Ok(wallet)
}

fn read_from_file(path: &Path) -> Result<MultisigWallet, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Address;

    fn sample_wallet() -> MultisigWallet {
        let owners = vec![Address::new([1; 20]), Address::new([2; 20])];
        MultisigWallet::new(owners, 2).unwrap()
    }

    fn temp_storage(max_backups: usize) -> (tempfile::TempDir, Storage) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups,
            ..Default::default()
        };
        let storage = Storage::new(config).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_save_load_wallet() {
        let (_dir, storage) = temp_storage(5);
        let mut wallet = sample_wallet();
        let owner = wallet.owners()[0];
        wallet.deposit(owner, 1_000).unwrap();
        wallet.submit_transaction(owner, owner, 10, vec![1, 2]).unwrap();

        storage.save(&wallet).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.registry(), wallet.registry());
        assert_eq!(loaded.ledger(), wallet.ledger());
        assert_eq!(loaded.balance(), 1_000);
        assert_eq!(loaded.events().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let (_dir, storage) = temp_storage(5);
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let (_dir, storage) = temp_storage(3);
        let mut wallet = sample_wallet();
        let owner = wallet.owners()[0];

        for _ in 0..5 {
            storage.save(&wallet).unwrap();
            wallet.submit_transaction(owner, owner, 0, vec![]).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);

        // Backup 0 holds the file replaced by the last save
        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.transaction_count(), 3);
        assert!(storage.restore_backup(7).is_err());
    }

    #[test]
    fn test_tampered_file_rejected() {
        let (dir, storage) = temp_storage(0);
        let mut wallet = sample_wallet();
        let owner = wallet.owners()[0];
        wallet.submit_transaction(owner, owner, 0, vec![]).unwrap();
        storage.save(&wallet).unwrap();

        // Replace the confirming owner with a stranger
        let path = dir.path().join("wallet.json");
        let text = fs::read_to_string(&path).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let confirmer = &mut value["ledger"]["transactions"][0]["confirmed_by"][0];
        assert_eq!(confirmer.as_str(), Some(owner.to_string().as_str()));
        *confirmer = serde_json::Value::String(Address::new([9; 20]).to_string());
        fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_overflowing_payouts_rejected() {
        let (dir, storage) = temp_storage(0);
        let wallet = sample_wallet();
        let payouts = format!(
            r#""payouts":{{"{}":{},"{}":1}}"#,
            Address::new([1; 20]),
            u128::MAX,
            Address::new([2; 20])
        );
        let text = serde_json::to_string(&wallet)
            .unwrap()
            .replace(r#""payouts":{}"#, &payouts);
        assert!(text.contains(&payouts));
        fs::write(dir.path().join("wallet.json"), text).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_read_unverified_skips_checks() {
        let (dir, storage) = temp_storage(0);
        let mut wallet = sample_wallet();
        let owner = wallet.owners()[0];
        wallet.submit_transaction(owner, owner, 0, vec![]).unwrap();
        storage.save(&wallet).unwrap();

        // Mark the single-confirmation transaction as executed
        let path = dir.path().join("wallet.json");
        let text = fs::read_to_string(&path).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let tx = &mut value["ledger"]["transactions"][0];
        tx["executed"] = serde_json::Value::Bool(true);
        tx["executed_at"] = tx["created_at"].clone();
        fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
        let raw = storage.read_unverified().unwrap();
        assert!(raw.verify_integrity().is_err());
    }

    #[test]
    fn test_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let wallet = sample_wallet();

        save_to_file(&wallet, &path).unwrap();
        let imported = load_from_file(&path).unwrap();
        assert_eq!(imported.registry(), wallet.registry());
    }
}
