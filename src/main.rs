//! Multisig Wallet CLI Application
//!
//! A command-line interface for operating an M-of-N multisig wallet.

use clap::{Parser, Subcommand};
use multisig_wallet::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version)]
#[command(about = "M-of-N multisig wallet: propose, confirm and execute transactions", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new wallet
    Init {
        /// Owner addresses (comma-separated)
        #[arg(short, long)]
        owners: String,

        /// Number of confirmations required to execute
        #[arg(short, long)]
        required: usize,

        /// Overwrite an existing wallet
        #[arg(long)]
        force: bool,
    },

    /// Generate a new owner key pair
    Keygen,

    /// Derive the address of a public key
    Address {
        /// Public key (hex, compressed or uncompressed)
        #[arg(short, long)]
        pubkey: String,
    },

    /// Show wallet information
    Info,

    /// Deposit funds into the wallet
    Deposit {
        /// Depositor address
        #[arg(short, long)]
        from: String,

        /// Amount, e.g. 1ether, 20gwei or 1000
        #[arg(short, long)]
        amount: String,
    },

    /// Propose a transaction
    Submit {
        /// Owner private key
        #[arg(short, long, env = "MULTISIG_KEY", hide_env_values = true)]
        key: String,

        /// Target address
        #[arg(short, long)]
        to: String,

        /// Value to send
        #[arg(short, long, default_value = "0")]
        value: String,

        /// Call data (hex)
        #[arg(long)]
        data: Option<String>,
    },

    /// Confirm a transaction
    Confirm {
        /// Owner private key
        #[arg(short, long, env = "MULTISIG_KEY", hide_env_values = true)]
        key: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// Revoke a confirmation
    Revoke {
        /// Owner private key
        #[arg(short, long, env = "MULTISIG_KEY", hide_env_values = true)]
        key: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// Execute a confirmed transaction
    Execute {
        /// Owner private key
        #[arg(short, long, env = "MULTISIG_KEY", hide_env_values = true)]
        key: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// Show a transaction
    Show {
        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// List transactions
    List {
        /// Only transactions not yet executed
        #[arg(long)]
        pending: bool,
    },

    /// Check whether an owner confirmed a transaction
    IsConfirmed {
        /// Transaction index
        #[arg(short, long)]
        index: usize,

        /// Owner address
        #[arg(short, long)]
        owner: String,
    },

    /// Show the event history
    Events {
        /// Only events for this transaction
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Validate the stored wallet
    Validate,

    /// Export wallet to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import wallet from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List backups, or restore one
    Restore {
        /// Backup number to restore
        #[arg(short, long)]
        backup: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a loaded wallet
    match &cli.command {
        Commands::Init {
            owners,
            required,
            force,
        } => return cli::cmd_init(&cli.data_dir, owners, *required, *force),
        Commands::Keygen => return cli::cmd_keygen(),
        Commands::Address { pubkey } => return cli::cmd_address(pubkey),
        Commands::Import { input } => return cli::cmd_import(&cli.data_dir, input),
        Commands::Validate => return cli::cmd_validate(&cli.data_dir),
        _ => {}
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. }
        | Commands::Keygen
        | Commands::Address { .. }
        | Commands::Import { .. }
        | Commands::Validate => unreachable!(),

        Commands::Info => cli::cmd_info(&state)?,

        Commands::Deposit { from, amount } => {
            cli::cmd_deposit(&mut state, &from, &amount)?;
        }

        Commands::Submit {
            key,
            to,
            value,
            data,
        } => {
            cli::cmd_submit(&mut state, &key, &to, &value, data.as_deref())?;
        }

        Commands::Confirm { key, index } => cli::cmd_confirm(&mut state, &key, index)?,

        Commands::Revoke { key, index } => cli::cmd_revoke(&mut state, &key, index)?,

        Commands::Execute { key, index } => cli::cmd_execute(&mut state, &key, index)?,

        Commands::Show { index } => cli::cmd_show(&state, index)?,

        Commands::List { pending } => cli::cmd_list(&state, pending)?,

        Commands::IsConfirmed { index, owner } => {
            cli::cmd_is_confirmed(&state, index, &owner)?;
        }

        Commands::Events { index } => cli::cmd_events(&state, index)?,

        Commands::Export { output } => cli::cmd_export(&state, &output)?,

        Commands::Restore { backup } => cli::cmd_restore(&mut state, backup)?,
    }

    Ok(())
}
