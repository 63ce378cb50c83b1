//! Reconciles the vault and strategy described by `DEPLOYER_PAIR_SPEC` with the
//! records of the target network and prints the outcome as JSON. With
//! `DEPLOYER_DRY_RUN=true` it only prints what it would do.

use address_predictor::to_checksum;
use chain_utils::{
    artifacts::ArtifactRegistry,
    chain::{Chain, ChainDeployer},
    config::DeployConfig,
};
use deployment_reconciler::{
    AccountLocks, ContractDeployer, DeployReason, PairSpec, Plan, Reconciler,
};
use deployment_records::JsonRecordStore;
use eyre::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = DeployConfig::from_env()?;
    let pair = PairSpec::load(config.pair_spec()?)?;
    pair.validate()?;

    // Connect to the chain and open the records of its network.
    let chain = Chain::connect(Some(config.ethereum_url.clone())).await?;
    let network = config.network_or(chain.chain_id().await?);
    let store = JsonRecordStore::open(&config.records_dir, &network)?;
    info!(network, records = %store.dir().display(), "opened deployment records");

    let artifacts = ArtifactRegistry::load_forge(&config.artifacts_dir)?;
    let client = chain.client(config.signer()?).await?;
    let deployer = ChainDeployer::new(client, artifacts)?;
    let locks = AccountLocks::new();
    let lease = locks.lease(deployer.sender()).await;
    let mut reconciler = Reconciler::new(store, deployer);

    if config.dry_run {
        match reconciler.plan(&pair.vault, &pair.strategy)? {
            Plan::Reuse { vault, strategy } => {
                println!(
                    "reuse vault {} and strategy {}",
                    to_checksum(&vault),
                    to_checksum(&strategy)
                )
            }
            Plan::Deploy(DeployReason::Missing { vault, strategy }) => {
                println!("deploy a new pair:");
                if vault {
                    println!("  no record of {:?}", pair.vault.logical_name);
                }
                if strategy {
                    println!("  no record of {:?}", pair.strategy.logical_name);
                }
            }
            Plan::Deploy(DeployReason::Drift(drifts)) => {
                println!("deploy a new pair:");
                for drift in drifts {
                    println!("  {}", drift);
                }
            }
        }
        return Ok(());
    }

    let result = reconciler.reconcile_pair(&pair, &lease).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
