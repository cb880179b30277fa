//! cert-lookup
//!
//! Command line front end for the certificate lookup connectors.
//!
//! ```text
//! cert-lookup [--config FILE] [--chain CHAIN] tx <TXID>
//! cert-lookup [--config FILE] issuer <URL> --version <VERSION> [--certificate FILE]
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use cert_connectors::blockchain::Chain;
use cert_connectors::config::{load_config, ConnectorConfig};
use cert_connectors::connectors::{
    create_transaction_lookup_connector, HttpClient, LookupOptions, LookupTx,
};
use cert_connectors::issuer::{BlockcertVersion, IssuerResolver};
use cert_connectors::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "cert-lookup")]
#[command(about = "Look up certificate transactions and issuer keys", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chain to query (overrides the configured chain)
    #[arg(long)]
    chain: Option<Chain>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the anchoring transaction of a certificate
    Tx {
        /// Transaction id
        txid: String,
    },
    /// Resolve issuer keys and revocations
    Issuer {
        /// Issuer profile URL
        url: String,

        /// Certificate schema version (1.1, 1.2, 2.0-alpha, 2.0)
        #[arg(long, default_value = "2.0")]
        version: BlockcertVersion,

        /// Certificate JSON, read for its revocation list
        #[arg(long)]
        certificate: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ConnectorConfig::default(),
    };
    init_logging(&config.observability)?;

    let http = HttpClient::new(&config.http)?;

    let output = match cli.command {
        Commands::Tx { txid } => {
            let chain = cli.chain.unwrap_or(config.lookup.chain);
            let options = LookupOptions::from_config(&config.lookup);
            let lookup = create_transaction_lookup_connector(chain, &options, &http)?;

            tracing::info!(
                chain = %chain,
                providers = ?lookup.providers(),
                txid = %txid,
                "Looking up transaction"
            );
            let tx = lookup.lookup_tx(&txid).await?;
            serde_json::to_value(&tx)?
        }
        Commands::Issuer {
            url,
            version,
            certificate,
        } => {
            let certificate_json = match certificate {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                None => Value::Null,
            };

            let resolver = IssuerResolver::new(http);
            let info = resolver.resolve(&url, version, &certificate_json).await?;
            serde_json::to_value(&info)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
