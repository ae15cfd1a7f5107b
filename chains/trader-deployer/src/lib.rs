//! Deploys the trader contract to one of the configured EVM networks.

pub mod config;
pub mod contracts;
pub mod deployer;
pub mod utils;

pub use config::{DeployerConfig, NetworkConfig};
pub use contracts::{ContractArtifact, TraderArgs};
pub use deployer::{DeployOutcome, PreparedDeployment, TraderDeployer};

use core_logic::{setup_logger, WorkerGuard};
use std::path::Path;

/// Loads `.env` (or `env_file`) and only then installs the logger, so a
/// `RUST_LOG` set there reaches the console filter.
///
/// The returned guard must be kept alive for the file log to be flushed.
pub fn init_environment(env_file: Option<&Path>, log_dir: &str) -> Option<WorkerGuard> {
    match env_file {
        Some(path) => {
            dotenv::from_path(path).ok();
        }
        None => {
            dotenv::dotenv().ok();
        }
    }
    setup_logger(log_dir)
}
