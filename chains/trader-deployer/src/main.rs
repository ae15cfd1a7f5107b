use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core_logic::{normalize_private_key, wei_to_gwei, WalletManager, WalletSource, RESULT_TARGET};
use dialoguer::{theme::ColorfulTheme, Password};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;
use std::env;
use std::path::Path;
use tracing::{error, info, warn};

use trader_deployer::config::DeployerConfig;
use trader_deployer::contracts::ContractArtifact;
use trader_deployer::deployer::{
    append_deployment, signer_from_key, DeploymentRecord, TraderDeployer,
};
use trader_deployer::init_environment;

#[derive(Parser, Debug)]
#[command(author, version, about = "Deploys the trader contract", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/trader-deployer/config.toml")]
    config: String,

    #[arg(long, default_value = "logs")]
    log_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy the trader contract to one network
    Deploy {
        #[arg(short, long)]
        network: String,

        /// Local account alias, overrides the configured source
        #[arg(short, long)]
        account: Option<String>,

        /// Compiled contract JSON, overrides the configured artifact
        #[arg(long)]
        artifact: Option<String>,

        /// Build and price the transaction without sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// List configured networks and their constructor constants
    Networks,
    /// Manage local signing accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),
}

#[derive(Subcommand, Debug)]
enum AccountsCommand {
    List,
    /// Encrypt a private key into a new account file
    Import { alias: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_environment(None, &args.log_dir);

    let result = match &args.command {
        Command::Deploy {
            network,
            account,
            artifact,
            dry_run,
        } => {
            deploy(
                &args.config,
                network,
                account.as_deref(),
                artifact.as_deref(),
                *dry_run,
            )
            .await
        }
        Command::Networks => list_networks(&args.config),
        Command::Accounts(AccountsCommand::List) => list_accounts(&args.config),
        Command::Accounts(AccountsCommand::Import { alias }) => import_account(&args.config, alias),
    };

    if let Err(e) = &result {
        error!(target: RESULT_TARGET, "FAILED: {:#}", e);
    }
    result
}

async fn deploy(
    config_path: &str,
    network: &str,
    account: Option<&str>,
    artifact: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    info!("Loading config from: {}", config_path);
    let config = DeployerConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path))?;

    let (name, network_config) = config.network(network)?;
    let chain = network_config.chain_config(name);
    let args = network_config.constructor_args(name)?;

    let artifact_path = artifact.unwrap_or(&config.artifact);
    let contract = ContractArtifact::load(artifact_path)?;
    info!(
        artifact = artifact_path,
        bytes = contract.bytecode.len(),
        "Loaded contract artifact"
    );

    let wallet = load_signer(&config, account).await?;
    let deployer = TraderDeployer::connect(chain, wallet).await?;
    let prepared = if dry_run {
        deployer.quote(&contract, &args, &config.gas).await?
    } else {
        deployer.prepare(&contract, &args, &config.gas).await?
    };

    info!(
        network = name,
        max_fee_gwei = %wei_to_gwei(prepared.fee_bid.max_fee_per_gas),
        priority_fee_gwei = %wei_to_gwei(prepared.fee_bid.max_priority_fee_per_gas),
        gas_limit = %prepared.gas_limit,
        "Prepared deployment"
    );

    if dry_run {
        println!("network:          {} (chain id {})", name, network_config.chain_id);
        println!(
            "deployer:         {}",
            to_checksum(&deployer.deployer_address(), None)
        );
        println!("compass:          {}", to_checksum(&args.compass, None));
        println!("refund wallet:    {}", to_checksum(&args.refund_wallet, None));
        println!("gas fee:          {}", args.gas_fee);
        println!("fee collector:    {}", to_checksum(&args.fee_collector, None));
        println!("service fee:      {}", args.service_fee);
        println!("max fee:          {} wei", prepared.fee_bid.max_fee_per_gas);
        println!(
            "priority fee:     {} wei",
            prepared.fee_bid.max_priority_fee_per_gas
        );
        println!("gas limit:        {}", prepared.gas_limit);
        println!("max cost:         {} wei", prepared.max_cost());
        println!("balance:          {} wei", prepared.balance);
        match prepared.shortfall() {
            Some(missing) => println!("shortfall:        {} wei", missing),
            None => println!("shortfall:        none"),
        }
        return Ok(());
    }

    let outcome = deployer.deploy(prepared, config.confirmations).await?;
    let address = to_checksum(&outcome.address, None);

    info!(
        target: RESULT_TARGET,
        network = name,
        tx_hash = ?outcome.tx_hash,
        block = ?outcome.block_number,
        "SUCCESS: trader deployed at {}",
        address
    );

    let record = DeploymentRecord::from_outcome(&outcome, network_config.chain_id);
    if let Err(e) = append_deployment(Path::new(&config.deployments_file), name, record) {
        warn!("Deployment succeeded but was not recorded: {}", e);
    }

    println!("{}", address);
    Ok(())
}

async fn load_signer(config: &DeployerConfig, account: Option<&str>) -> Result<LocalWallet> {
    match config.wallet_source(account) {
        WalletSource::Env { key } => {
            let wallet = WalletManager::load_from_env(&key)?;
            Ok(signer_from_key(&wallet.evm_private_key, &wallet.evm_address)?)
        }
        WalletSource::Keystore { alias } => {
            let manager = config.wallet_manager();
            let password = if manager.is_encrypted(&alias)? {
                Some(wallet_password()?)
            } else {
                None
            };
            let wallet = manager.load(&alias, password.as_deref()).await?;
            Ok(signer_from_key(&wallet.evm_private_key, &wallet.evm_address)?)
        }
    }
}

/// `WALLET_PASSWORD` first, then an interactive prompt.
fn wallet_password() -> Result<String> {
    if let Ok(password) = env::var("WALLET_PASSWORD") {
        return Ok(password);
    }

    warn!("WALLET_PASSWORD environment variable is not set.");
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter wallet password")
        .interact()
        .context("cannot prompt for password (not a terminal), set WALLET_PASSWORD")
}

fn list_networks(config_path: &str) -> Result<()> {
    let config = DeployerConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path))?;

    for (name, network) in &config.networks {
        println!("{} (chain id {})", name, network.chain_id);
        println!("  rpc:           {}", network.rpc_url);
        println!("  compass:       {}", network.compass);
        println!("  refund wallet: {}", network.refund_wallet);
        println!("  fee collector: {}", network.fee_collector);
        println!("  gas fee:       {} wei", network.gas_fee);
        println!("  service fee:   {} wei", network.service_fee);
    }
    Ok(())
}

fn list_accounts(config_path: &str) -> Result<()> {
    let config = DeployerConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path))?;
    let manager = config.wallet_manager();

    let accounts = manager.list_accounts()?;
    if accounts.is_empty() {
        println!("No accounts in {}", manager.dir().display());
    }
    for (alias, address) in accounts {
        println!("{:<24} {}", alias, address);
    }
    Ok(())
}

fn import_account(config_path: &str, alias: &str) -> Result<()> {
    let config = DeployerConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path))?;
    let manager = config.wallet_manager();
    let theme = ColorfulTheme::default();

    let private_key = Password::with_theme(&theme)
        .with_prompt("Private key")
        .interact()
        .context("cannot prompt for private key (not a terminal)")?;
    let private_key = normalize_private_key(&private_key)?;
    let address = to_checksum(&private_key.parse::<LocalWallet>()?.address(), None);

    let password = Password::with_theme(&theme)
        .with_prompt("New wallet password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("cannot prompt for password (not a terminal)")?;

    let path = manager.import(alias, &private_key, &address, &password)?;
    println!("{} {} -> {}", alias, address, path.display());
    Ok(())
}
