//! CLI commands for the multisig wallet
//!
//! Implements all command handlers for the CLI interface.

use crate::core::{format_ether, parse_amount, Address};
use crate::crypto::{public_key_from_hex, public_key_to_address, KeyPair};
use crate::multisig::TransactionStatus;
use crate::storage::{Storage, StorageConfig};
use crate::wallet::MultisigWallet;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub wallet: MultisigWallet,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialized data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;

        if !storage.exists() {
            return Err(format!(
                "no wallet found in {:?}; run `multisig init` first",
                data_dir
            )
            .into());
        }

        log::debug!("Loading wallet from {:?}", data_dir);
        let wallet = storage.load()?;

        Ok(Self {
            wallet,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.wallet)?;
        Ok(())
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Resolve the acting owner from a private key
pub fn caller_from_key(key: &str) -> CliResult<Address> {
    Ok(KeyPair::from_private_key_hex(key)?.address())
}

/// Parse comma-separated addresses
pub fn parse_addresses(list: &str) -> CliResult<Vec<Address>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Address>().map_err(Into::into))
        .collect()
}

/// Parse `0x`-prefixed hex call data
pub fn parse_payload(data: Option<&str>) -> CliResult<Vec<u8>> {
    match data {
        None => Ok(Vec::new()),
        Some(hex_data) => Ok(hex::decode(hex_data.trim().trim_start_matches("0x"))?),
    }
}

/// Initialize a new wallet
pub fn cmd_init(data_dir: &Path, owners: &str, required: usize, force: bool) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() && !force {
        println!("⚠️  Wallet already exists at {:?}", data_dir);
        println!("   Use --force to reinitialize (this will delete existing data)");
        return Ok(());
    }

    let wallet = MultisigWallet::new(parse_addresses(owners)?, required)?;
    storage.save(&wallet)?;

    println!("✅ Multisig wallet initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🔐 Policy: {}", wallet.description());
    for owner in wallet.owners() {
        println!("   👤 {}", owner);
    }

    Ok(())
}

/// Generate a new owner key pair
pub fn cmd_keygen() -> CliResult<()> {
    let key_pair = KeyPair::generate();

    println!("🔐 New key pair generated!");
    println!("   📍 Address: {}", key_pair.address());
    println!("   🔑 Public Key: {}", key_pair.public_key_hex());
    println!("   🗝️  Private Key: {}", key_pair.private_key_hex());
    println!("\n   ⚠️  IMPORTANT: Store the private key safely; it is not saved anywhere.");

    Ok(())
}

/// Derive the address of a public key
pub fn cmd_address(public_key: &str) -> CliResult<()> {
    let key = public_key_from_hex(public_key)?;
    println!("📍 {}", public_key_to_address(&key));
    Ok(())
}

/// Show wallet overview
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let wallet = &state.wallet;
    let ledger = wallet.ledger();
    let registry = wallet.registry();

    println!("🔐 Multisig Wallet ({})", wallet.description());
    println!("   ├─ Balance: {}", format_ether(wallet.balance()));
    println!(
        "   ├─ Total deposited: {}",
        format_ether(wallet.treasury().total_deposited())
    );
    println!("   ├─ Transactions: {}", ledger.transaction_count());
    println!(
        "   │  ├─ Awaiting: {}",
        ledger
            .with_status(registry, TransactionStatus::AwaitingConfirmations)
            .count()
    );
    println!(
        "   │  ├─ Ready: {}",
        ledger.with_status(registry, TransactionStatus::Ready).count()
    );
    println!(
        "   │  └─ Executed: {}",
        ledger.with_status(registry, TransactionStatus::Executed).count()
    );
    println!("   ├─ Created: {}", wallet.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("   └─ Owners:");
    for owner in wallet.owners() {
        println!("      └─ {}", owner);
    }

    Ok(())
}

/// Fund the wallet
pub fn cmd_deposit(state: &mut AppState, from: &str, amount: &str) -> CliResult<()> {
    let sender: Address = from.parse()?;
    let amount = parse_amount(amount)?;

    let balance = state.wallet.deposit(sender, amount)?;
    state.save()?;

    println!("💰 Deposited {} from {}", format_ether(amount), sender);
    println!("   New balance: {}", format_ether(balance));

    Ok(())
}

/// Propose a transaction
pub fn cmd_submit(
    state: &mut AppState,
    key: &str,
    to: &str,
    value: &str,
    data: Option<&str>,
) -> CliResult<()> {
    let caller = caller_from_key(key)?;
    let target: Address = to.parse()?;
    let value = parse_amount(value)?;
    let payload = parse_payload(data)?;

    let index = state
        .wallet
        .submit_transaction(caller, target, value, payload)?;
    state.save()?;

    let tx = state.wallet.transaction(index)?;
    println!("📤 Transaction #{} submitted", index);
    println!("   ├─ Digest: {}", &tx.digest()[..16]);
    println!("   ├─ To: {}", tx.target);
    println!("   ├─ Value: {}", format_ether(tx.value));
    println!("   ├─ Data: {}", tx.payload_hex());
    println!(
        "   └─ Confirmations: {}/{}",
        tx.num_confirmations(),
        state.wallet.num_confirmations_required()
    );

    Ok(())
}

/// Confirm a transaction
pub fn cmd_confirm(state: &mut AppState, key: &str, index: usize) -> CliResult<()> {
    let caller = caller_from_key(key)?;
    state.wallet.confirm_transaction(caller, index)?;
    state.save()?;

    let tx = state.wallet.transaction(index)?;
    println!("✅ Transaction #{} confirmed by {}", index, caller);
    println!(
        "   Confirmations: {}/{}",
        tx.num_confirmations(),
        state.wallet.num_confirmations_required()
    );

    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(state: &mut AppState, key: &str, index: usize) -> CliResult<()> {
    let caller = caller_from_key(key)?;
    state.wallet.revoke_confirmation(caller, index)?;
    state.save()?;

    let tx = state.wallet.transaction(index)?;
    println!("↩️  Confirmation on transaction #{} revoked by {}", index, caller);
    println!(
        "   Confirmations: {}/{}",
        tx.num_confirmations(),
        state.wallet.num_confirmations_required()
    );

    Ok(())
}

/// Execute a transaction
pub fn cmd_execute(state: &mut AppState, key: &str, index: usize) -> CliResult<()> {
    let caller = caller_from_key(key)?;
    let record = state.wallet.execute_transaction(caller, index)?;
    state.save()?;

    println!("🚀 Transaction #{} executed by {}", index, caller);
    println!("   ├─ Sent {} to {}", format_ether(record.value), record.target);
    println!("   └─ Remaining balance: {}", format_ether(state.wallet.balance()));

    Ok(())
}

/// Show a single transaction
pub fn cmd_show(state: &AppState, index: usize) -> CliResult<()> {
    let required = state.wallet.num_confirmations_required();
    let tx = state.wallet.transaction(index)?;

    println!("📄 Transaction #{}", tx.index);
    println!("   ├─ Digest: {}", tx.digest());
    println!("   ├─ Status: {:?}", tx.status(required));
    println!("   ├─ Submitter: {}", tx.submitter);
    println!("   ├─ To: {}", tx.target);
    println!("   ├─ Value: {}", format_ether(tx.value));
    println!("   ├─ Data: {}", tx.payload_hex());
    println!("   ├─ Executed: {}", tx.executed);
    println!("   ├─ Created: {}", tx.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(at) = tx.executed_at {
        println!("   ├─ Executed at: {}", at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("   └─ Confirmations: {}/{}", tx.num_confirmations(), required);
    for owner in tx.confirmations() {
        println!("      └─ {}", owner);
    }

    Ok(())
}

/// List transactions
pub fn cmd_list(state: &AppState, pending_only: bool) -> CliResult<()> {
    let required = state.wallet.num_confirmations_required();
    let ledger = state.wallet.ledger();

    if ledger.transaction_count() == 0 {
        println!("📭 No transactions yet. Propose one with: multisig submit");
        return Ok(());
    }

    println!("📋 Transactions:");
    for tx in ledger.transactions() {
        if pending_only && tx.executed {
            continue;
        }
        println!(
            "   #{} | {} | {} → {} | {}/{} | {:?}",
            tx.index,
            &tx.digest()[..12],
            format_ether(tx.value),
            tx.target.short(),
            tx.num_confirmations(),
            required,
            tx.status(required)
        );
    }

    Ok(())
}

/// Check whether an owner confirmed a transaction
pub fn cmd_is_confirmed(state: &AppState, index: usize, owner: &str) -> CliResult<()> {
    let owner: Address = owner.parse()?;
    let confirmed = state.wallet.is_confirmed(index, &owner)?;

    if confirmed {
        println!("✅ {} has confirmed transaction #{}", owner, index);
    } else {
        println!("❌ {} has not confirmed transaction #{}", owner, index);
    }

    Ok(())
}

/// Show the event history
pub fn cmd_events(state: &AppState, index: Option<usize>) -> CliResult<()> {
    let records = match index {
        Some(i) => state.wallet.events_for(i),
        None => state.wallet.events().iter().collect(),
    };

    if records.is_empty() {
        println!("📭 No events recorded");
        return Ok(());
    }

    println!("📜 Events:");
    for record in records {
        println!(
            "   {:>4} | {} | {}",
            record.sequence,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.event
        );
    }

    Ok(())
}

/// Validate the stored wallet
///
/// Reads the file without the load-time checks so a broken wallet is
/// reported instead of refused.
pub fn cmd_validate(data_dir: &Path) -> CliResult<()> {
    let storage = open_storage(data_dir)?;
    if !storage.exists() {
        return Err(format!("no wallet found in {:?}", data_dir).into());
    }

    println!("🔍 Validating wallet...");
    let wallet = storage.read_unverified()?;

    match wallet.verify_integrity() {
        Ok(()) => {
            println!("✅ Wallet is valid!");
            println!("   {} transactions verified", wallet.transaction_count());
            Ok(())
        }
        Err(reason) => {
            println!("❌ Wallet validation FAILED!");
            println!("   {}", reason);
            Err(reason.into())
        }
    }
}

/// Export wallet to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.wallet, path)?;
    println!("📦 Wallet exported to {:?}", path);
    Ok(())
}

/// Import wallet from file
pub fn cmd_import(data_dir: &Path, path: &Path) -> CliResult<()> {
    let wallet = crate::storage::load_from_file(path)?;
    let storage = open_storage(data_dir)?;
    storage.save(&wallet)?;

    println!("📥 Wallet imported from {:?}", path);
    println!("   Policy: {}", wallet.description());
    println!("   Transactions: {}", wallet.transaction_count());

    Ok(())
}

/// Restore from a backup
pub fn cmd_restore(state: &mut AppState, backup: Option<usize>) -> CliResult<()> {
    let Some(backup) = backup else {
        let backups = state.storage.list_backups();
        if backups.is_empty() {
            println!("📭 No backups found in {:?}", state.data_dir);
        } else {
            println!("🗄️  Available backups: {:?}", backups);
        }
        return Ok(());
    };

    state.wallet = state.storage.restore_backup(backup)?;
    state.save()?;

    println!("♻️  Restored backup {}", backup);
    println!("   Transactions: {}", state.wallet.transaction_count());

    Ok(())
}
