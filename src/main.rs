use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use stellar_txasm::config::{ClientConfig, NetworkKind};
use stellar_txasm::keys::generate_keypair;
use stellar_txasm::logging::{init_logging, LogFormat};
use stellar_txasm::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "stellar-txasm",
    about = "Assemble, sign and submit Stellar transactions",
    version,
    propagate_version = true
)]
struct Cli {
    /// TOML client configuration
    #[arg(long, env = "STELLAR_TXASM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// public, testnet or custom
    #[arg(long, env = "STELLAR_NETWORK", global = true)]
    network: Option<NetworkKind>,

    #[arg(long, env = "STELLAR_HORIZON_URL", global = true)]
    horizon_url: Option<String>,

    /// Network passphrase, required for custom networks
    #[arg(long, env = "STELLAR_PASSPHRASE", global = true)]
    passphrase: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[arg(long, default_value = "info", env = "STELLAR_TXASM_LOG_LEVEL", global = true)]
    log_level: String,

    /// pretty or json
    #[arg(long, default_value = "pretty", env = "STELLAR_TXASM_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a random keypair
    Keygen,

    /// Print the account id of a secret seed
    Address {
        #[arg(env = "STELLAR_SEED", hide_env_values = true)]
        seed: String,
    },

    /// Show an account's sequence, balances and signers
    Account { account: String },

    /// Send a payment
    Pay {
        /// Account id or federation address
        destination: String,

        /// Decimal amount, up to 7 fractional digits
        amount: Amount,

        /// `native` or CODE:ISSUER
        #[arg(long, default_value = "native")]
        asset: Asset,

        #[arg(long)]
        memo: Option<String>,

        /// Sequence number to use instead of fetching it
        #[arg(long)]
        sequence: Option<i64>,

        /// Print the signed envelope instead of submitting it
        #[arg(long, requires = "sequence")]
        offline: bool,

        #[arg(long, env = "STELLAR_SEED", hide_env_values = true)]
        seed: String,
    },

    /// Submit a base64 transaction envelope
    Submit { envelope: String },

    /// Print the contents of a base64 transaction envelope
    Decode { envelope: String },

    /// Resolve a federation address to an account id
    Resolve { address: String },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(url) = &self.horizon_url {
            config.horizon_url = Some(url.clone());
        }
        if let Some(passphrase) = &self.passphrase {
            config.passphrase = Some(passphrase.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;

    let config = cli.client_config()?;
    match cli.command {
        Commands::Keygen => {
            let (seed, account) = generate_keypair();
            println!("seed:    {}", seed);
            println!("account: {}", account);
        }
        Commands::Address { seed } => {
            let keypair = KeyPair::from_secret_seed(&seed).context("invalid secret seed")?;
            println!("{}", keypair.account_id());
        }
        Commands::Account { account } => {
            let client = config.client()?;
            let id = client.resolve(&account)?;
            let record = client.account(&id)?;
            println!("account:  {}", record.id);
            println!("sequence: {}", record.sequence);
            for balance in &record.balances {
                let asset = balance.asset.to_asset()?;
                println!("balance:  {} {}", balance.balance, asset);
            }
            for signer in &record.signers {
                println!("signer:   {} (weight {})", signer.key, signer.weight);
            }
        }
        Commands::Pay {
            destination,
            amount,
            asset,
            memo,
            sequence,
            offline,
            seed,
        } => {
            let client = config.client()?;
            let keypair = KeyPair::from_secret_seed(&seed).context("invalid secret seed")?;
            let destination = client
                .resolve(&destination)
                .with_context(|| format!("cannot resolve destination {}", destination))?;

            let mut builder = TransactionBuilder::new(keypair, client.network().clone());
            builder.pay(destination, amount, asset);
            if let Some(text) = memo {
                builder.memo(Memo::text(&text)?);
            }
            if let Some(sequence) = sequence {
                builder.sequence(sequence);
            }

            if offline {
                let envelope = builder.build_envelope(None)?;
                println!("{}", envelope.to_base64()?);
                return Ok(());
            }
            report(client.submit(&builder)?)?;
        }
        Commands::Submit { envelope } => {
            let client = config.client()?;
            let envelope = TransactionEnvelope::from_base64(&envelope)
                .context("not a base64 transaction envelope")?;
            report(client.submit_envelope(&envelope)?)?;
        }
        Commands::Decode { envelope } => {
            let network = config.network_config()?;
            let envelope = TransactionEnvelope::from_base64(&envelope)
                .context("not a base64 transaction envelope")?;
            print_envelope(&envelope, &network)?;
        }
        Commands::Resolve { address } => {
            let client = config.client()?;
            println!("{}", client.resolve(&address)?);
        }
    }
    Ok(())
}

fn report(result: TransactionResult) -> Result<()> {
    match result {
        TransactionResult::Success(submitted) => {
            info!(hash = %submitted.hash, ledger = submitted.ledger, "transaction applied");
            println!("{} {}", submitted.hash, submitted.ledger);
            Ok(())
        }
        TransactionResult::Failure(errors) => bail!(
            "transaction rejected ({} {}): {} {:?}",
            errors.status,
            errors.title,
            errors.transaction,
            errors.operations
        ),
    }
}

fn print_envelope(envelope: &TransactionEnvelope, network: &NetworkConfig) -> Result<()> {
    let tx = &envelope.tx;
    println!("hash:       {}", hex::encode(envelope.hash(network)?));
    println!("source:     {}", tx.source_account);
    println!("fee:        {}", tx.fee);
    println!("sequence:   {}", tx.sequence);
    if let Some(bounds) = &tx.time_bounds {
        println!("time:       {}..{}", bounds.min_time, bounds.max_time);
    }
    println!("memo:       {:?}", tx.memo);
    for (index, operation) in tx.operations.iter().enumerate() {
        let source = operation
            .source_account
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("op {:>2}:      {} (source {})", index, operation.operation_type().name(), source);
    }
    for signature in &envelope.signatures {
        println!("signature:  hint {}", hex::encode(signature.hint));
    }
    Ok(())
}
