//! Bitcoin wallet client (`btc-wallet`)
//!
//! Command-line front end over the wallet API.
//!
//! # Architecture Overview
//!
//! ```text
//!   btc-wallet <command>
//!        │
//!        ▼
//!   ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//!   │  config  │───▶│ HttpWalletApi│───▶│  wallet API  │
//!   │ (toml +  │    │  (reqwest)   │    │   (remote)   │
//!   │  flags)  │    └──────▲───────┘    └──────────────┘
//!   └──────────┘           │
//!                   ┌──────┴───────┐
//!   send/broadcast ▶│ Orchestrator │  build → validate → broadcast
//!                   │ retry/backoff│  (Ctrl-C cancels)
//!                   └──────────────┘
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use btc_wallet_client::config::{load_config, ClientConfig};
use btc_wallet_client::lifecycle::signals::cancel_on_ctrl_c;
use btc_wallet_client::observability::init_logging;
use btc_wallet_client::wallet::export::{export_history, export_to_file, export_utxos};
use btc_wallet_client::wallet::history::filter_by_date;
use btc_wallet_client::wallet::units::{btc_to_sats, format_btc, format_btc_signed};
use btc_wallet_client::wallet::utxos::{search, spendable_sats, total_sats};
use btc_wallet_client::wallet::{ExportFormat, FeePriority, KeyFormat, KeyMethod, KeyRequest, Network, Utxo};
use btc_wallet_client::{CancelToken, HttpWalletApi, Orchestrator, TransactionRequest};

#[derive(Parser)]
#[command(name = "btc-wallet")]
#[command(about = "Client for the Bitcoin wallet API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet API base URL (overrides the config file)
    #[arg(long, env = "BTC_WALLET_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and broadcast a payment
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Amount in BTC
        #[arg(long, conflicts_with = "sats", required_unless_present = "sats")]
        amount: Option<f64>,
        /// Amount in satoshis
        #[arg(long)]
        sats: Option<u64>,
        /// Fee rate in sat/byte
        #[arg(long, default_value_t = 1.0)]
        fee_rate: f64,
    },
    /// Broadcast an already-signed raw transaction
    Broadcast { raw_tx_hex: String },
    /// Ask the server to validate a raw transaction
    Validate { raw_tx_hex: String },
    /// On-chain status of a transaction
    Status { txid: String },
    /// Confirmed balance of an address
    Balance { address: String },
    /// Unspent outputs of a wallet
    Utxos {
        address: String,
        /// Only show UTXOs with a field containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Transaction history of a wallet
    History {
        address: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// List stored wallets
    Wallets,
    /// Generate a key pair on the server and store it as a named wallet
    CreateWallet {
        name: String,
        #[arg(long, default_value = "entropy")]
        method: KeyMethod,
        /// Address format: p2pkh, p2sh, p2wpkh or p2tr
        #[arg(long)]
        key_format: Option<KeyFormat>,
        /// Network for the new keys (defaults to the configured one)
        #[arg(long)]
        network: Option<Network>,
    },
    /// Have the server write a stored wallet's keys to a file
    ExportKey { address: String },
    /// Current fee-rate suggestions
    Fee {
        #[arg(long)]
        priority: Option<FeePriority>,
    },
    /// Write a wallet's UTXOs to a file
    ExportUtxos {
        address: String,
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a wallet's transaction history to a file
    ExportHistory {
        address: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    init_logging(&config.observability);
    tracing::debug!(base_url = %config.api.base_url, network = %config.api.network, "btc-wallet starting");

    let cancel = CancelToken::new();
    let _signals = cancel_on_ctrl_c(cancel.clone());

    let api = HttpWalletApi::new(&config.api, &config.passthrough)?.with_cancel(cancel.clone());

    match cli.command {
        Commands::Send {
            from,
            to,
            amount,
            sats,
            fee_rate,
        } => {
            let amount_sats = match (sats, amount) {
                (Some(sats), _) => sats,
                (None, Some(btc)) => btc_to_sats(btc)?,
                (None, None) => return Err("either --amount or --sats is required".into()),
            };
            let orchestrator = Orchestrator::new(Arc::new(api), &config);
            let request = TransactionRequest::new(from, to, amount_sats, fee_rate);
            let result = orchestrator.submit_with_cancel(&request, &cancel).await?;
            println!("Sent {} BTC", format_btc(amount_sats));
            println!("txid: {}", result.txid);
            if let Some(url) = result.explorer_url {
                println!("explorer: {}", url);
            }
        }
        Commands::Broadcast { raw_tx_hex } => {
            let orchestrator = Orchestrator::new(Arc::new(api), &config);
            let result = orchestrator.broadcast_raw(&raw_tx_hex, &cancel).await?;
            println!("txid: {}", result.txid);
            if let Some(url) = result.explorer_url {
                println!("explorer: {}", url);
            }
        }
        Commands::Validate { raw_tx_hex } => {
            let report = api.validate_transaction(&raw_tx_hex).await?;
            if report.is_valid {
                println!("valid");
            } else {
                println!("invalid: {}", report.issues_summary());
            }
            println!("{}", serde_json::to_string_pretty(&report.details)?);
        }
        Commands::Status { txid } => {
            let status = api.transaction_status(&txid).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Balance { address } => {
            let balance = api.balance(&address).await?;
            println!("{} BTC ({} sat)", format_btc(balance.confirmed_sats), balance.confirmed_sats);
            if let Some(utxos) = &balance.utxos {
                println!("{} UTXOs", utxos.len());
            }
        }
        Commands::Utxos { address, search: term } => {
            let utxos = api.utxos(&address).await?;
            let shown = search(&utxos, term.as_deref().unwrap_or(""));
            for utxo in &shown {
                print_utxo(utxo);
            }
            println!(
                "total {} BTC, spendable {} BTC",
                format_btc(total_sats(&utxos)),
                format_btc(spendable_sats(&utxos))
            );
        }
        Commands::History { address, from, to } => {
            let records = api.transactions(&address).await?;
            for record in filter_by_date(&records, from, to) {
                println!(
                    "{}  {:<8} {:>16} BTC  fee {:>8} sat  {}  {}",
                    record.timestamp,
                    record.kind,
                    format_btc_signed(record.amount),
                    record.fee,
                    record.status,
                    record.txid
                );
            }
        }
        Commands::Wallets => {
            for wallet in api.list_wallets().await? {
                println!("{}  {}  [{}]", wallet.display_name(), wallet.address, wallet.network);
            }
        }
        Commands::CreateWallet {
            name,
            method,
            key_format,
            network,
        } => {
            let network = network.unwrap_or(api.network());
            let request = KeyRequest::new(method, network, key_format);
            let wallet = api.create_wallet(&name, &request).await?;
            println!("Created wallet {}", wallet.display_name());
            println!("address: {}", wallet.address);
            if wallet.mnemonic.is_some() {
                println!("A recovery phrase was stored with the wallet; use export-key to retrieve the keys.");
            }
        }
        Commands::ExportKey { address } => {
            let wallet = api.get_wallet(&address).await?;
            let path = api.export_key_file(&wallet).await?;
            println!("keys for {} written to {} on the server", wallet.address, path);
        }
        Commands::Fee { priority } => {
            let estimate = api.fee_estimate().await?;
            match priority {
                Some(priority) => println!("{} {}", estimate.rate(priority), estimate.unit),
                None => println!(
                    "high {} / medium {} / low {} {}",
                    estimate.high, estimate.medium, estimate.low, estimate.unit
                ),
            }
        }
        Commands::ExportUtxos {
            address,
            format,
            output,
        } => {
            let format = resolve_format(format, &config)?;
            let utxos = api.utxos(&address).await?;
            let path = output.unwrap_or_else(|| default_output(&config, "utxos", &address, format));
            export_to_file(&path, |out| export_utxos(&utxos, format, out))?;
            println!("{} UTXOs written to {}", utxos.len(), path.display());
        }
        Commands::ExportHistory {
            address,
            from,
            to,
            format,
            output,
        } => {
            let format = resolve_format(format, &config)?;
            let records = api.transactions(&address).await?;
            let selected = filter_by_date(&records, from, to);
            let path = output.unwrap_or_else(|| default_output(&config, "history", &address, format));
            export_to_file(&path, |out| export_history(&selected, format, out))?;
            println!("{} records written to {}", selected.len(), path.display());
        }
    }

    Ok(())
}

fn print_utxo(utxo: &Utxo) {
    println!(
        "{}:{}  {} BTC  {} conf{}",
        utxo.txid,
        utxo.vout,
        format_btc(utxo.value_sats),
        utxo.confirmations,
        if utxo.spendable { "" } else { "  (unspendable)" }
    );
}

fn resolve_format(
    flag: Option<ExportFormat>,
    config: &ClientConfig,
) -> Result<ExportFormat, Box<dyn std::error::Error>> {
    match flag {
        Some(format) => Ok(format),
        None => Ok(config.export.default_format.parse::<ExportFormat>()?),
    }
}

fn default_output(config: &ClientConfig, kind: &str, address: &str, format: ExportFormat) -> PathBuf {
    Path::new(&config.export.directory).join(format!("{}-{}.{}", kind, address, format.extension()))
}
