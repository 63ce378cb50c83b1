use std::{fmt, path::PathBuf};

use ethers::signers::LocalWallet;
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;

const PREFIX: &str = "DEPLOYER_";

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_records_dir() -> PathBuf {
    PathBuf::from("deployments")
}

/// The deployment tools' configuration. Every field is read from an
/// environment variable with the `DEPLOYER_` prefix, e.g. `ethereum_url` from
/// `DEPLOYER_ETHEREUM_URL`.
#[derive(Clone, Deserialize)]
pub struct DeployConfig {
    pub ethereum_url: String,
    private_key: String,
    /// A JSON file holding the vault and strategy specs.
    #[serde(default)]
    pub pair_spec: Option<PathBuf>,
    /// Foundry's output directory.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
    /// The partition of the record store to use. Defaults to the chain id.
    #[serde(default)]
    pub network: Option<String>,
    /// Plan without deploying or writing records.
    #[serde(default)]
    pub dry_run: bool,
}

impl DeployConfig {
    /// Loads the configuration from the environment after loading a `.env`
    /// file, if there is one.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(PREFIX)
            .from_env()
            .wrap_err("couldn't load the configuration from the environment")
    }

    pub fn from_iter<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(PREFIX)
            .from_iter(vars)
            .wrap_err("couldn't load the configuration")
    }

    /// The wallet that signs deployments.
    pub fn signer(&self) -> Result<LocalWallet> {
        self.private_key
            .parse::<LocalWallet>()
            .map_err(|_| eyre!("{}PRIVATE_KEY isn't a valid private key", PREFIX))
    }

    /// The pair spec path, which is required for reconciliation.
    pub fn pair_spec(&self) -> Result<&PathBuf> {
        self.pair_spec
            .as_ref()
            .ok_or(eyre!("{}PAIR_SPEC must be set", PREFIX))
    }

    /// The record store partition, falling back to the chain id.
    pub fn network_or(&self, chain_id: u64) -> String {
        self.network
            .clone()
            .unwrap_or_else(|| chain_id.to_string())
    }
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("ethereum_url", &self.ethereum_url)
            .field("private_key", &"<redacted>")
            .field("pair_spec", &self.pair_spec)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("records_dir", &self.records_dir)
            .field("network", &self.network)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
