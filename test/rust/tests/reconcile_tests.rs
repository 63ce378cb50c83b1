mod common;

use chain_utils::{
    chain::ChainDeployer,
    constants::{BOB, CELINE},
};
use deployment_reconciler::{
    AccountLocks, ArtifactSpec, DeployReason, Drift, Plan, Reconciler, Role,
};
use deployment_records::{ConstructorArg, JsonRecordStore, RecordStore};
use ethers::signers::Signer;
use eyre::Result;
use rand::{thread_rng, Rng};

use crate::common::{peer_of, peer_registry, setup};

fn vault_spec(name: &str) -> ArtifactSpec {
    ArtifactSpec::new(
        format!("{} Vault", name),
        "PeerVault",
        vec![ConstructorArg::Peer],
    )
}

fn strategy_spec(name: &str, kind: &str) -> ArtifactSpec {
    ArtifactSpec::new(
        format!("{} Strategy", name),
        kind,
        vec![ConstructorArg::Peer],
    )
}

#[ignore]
#[tokio::test]
async fn test_reconcile_deploys_then_reuses() -> Result<()> {
    let (chain, client) = setup(&BOB).await?;
    let records = tempfile::tempdir()?;
    let network = chain.chain_id().await?.to_string();
    let store = JsonRecordStore::open(records.path(), &network)?;
    let artifacts = peer_registry(&["PeerVault", "PeerStrategy", "PeerStrategyV2"])?;
    let deployer = ChainDeployer::new(client.clone(), artifacts)?;
    let mut reconciler = Reconciler::new(store, deployer);
    let locks = AccountLocks::new();

    // Use a fresh name so reruns against a persistent node start clean.
    let name = format!("Pair {}", thread_rng().gen::<u32>());
    let vault = vault_spec(&name);
    let strategy = strategy_spec(&name, "PeerStrategy");

    // The first run deploys a pair that references each other.
    let lease = locks.lease(BOB.address()).await;
    let deployed = reconciler.reconcile(&vault, &strategy, &lease).await?;
    assert!(deployed.redeployed);
    assert_eq!(
        peer_of(client.clone(), deployed.vault_address).await?,
        deployed.strategy_address
    );
    assert_eq!(
        peer_of(client.clone(), deployed.strategy_address).await?,
        deployed.vault_address
    );
    let record = reconciler
        .store()
        .get(&vault.logical_name)?
        .ok_or(eyre::eyre!("vault wasn't recorded"))?;
    assert_eq!(record.address, deployed.vault_address);
    assert_eq!(
        record.constructor_args,
        vec![ConstructorArg::Address(deployed.strategy_address)]
    );
    drop(lease);

    // The second run sends nothing.
    let nonce = chain.transaction_count(BOB.address()).await?;
    let lease = locks.lease(BOB.address()).await;
    let reused = reconciler.reconcile(&vault, &strategy, &lease).await?;
    assert!(!reused.redeployed);
    assert_eq!(reused.vault_address, deployed.vault_address);
    assert_eq!(reused.strategy_address, deployed.strategy_address);
    assert_eq!(chain.transaction_count(BOB.address()).await?, nonce);

    // Switching the strategy's kind redeploys both.
    let strategy = strategy_spec(&name, "PeerStrategyV2");
    assert!(matches!(
        reconciler.plan(&vault, &strategy)?,
        Plan::Deploy(DeployReason::Drift(ref drifts))
            if drifts.iter().any(|d| matches!(d, Drift::ContractKind { role: Role::Strategy, .. }))
    ));
    let redeployed = reconciler.reconcile(&vault, &strategy, &lease).await?;
    assert!(redeployed.redeployed);
    assert_ne!(redeployed.vault_address, deployed.vault_address);
    assert_eq!(
        peer_of(client.clone(), redeployed.vault_address).await?,
        redeployed.strategy_address
    );
    assert_eq!(
        peer_of(client, redeployed.strategy_address).await?,
        redeployed.vault_address
    );

    // The records survive reopening the store.
    let reopened = JsonRecordStore::open(records.path(), &network)?;
    assert_eq!(
        reopened.get(&strategy.logical_name)?.map(|r| r.address),
        Some(redeployed.strategy_address)
    );

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_concurrent_reconciliations_share_an_account() -> Result<()> {
    let (_chain, client) = setup(&CELINE).await?;
    let records = tempfile::tempdir()?;
    let artifacts = peer_registry(&["PeerVault", "PeerStrategy"])?;
    let locks = AccountLocks::new();

    let mut handles = Vec::new();
    for i in 0..4 {
        let store = JsonRecordStore::open(records.path(), "anvil")?;
        let deployer = ChainDeployer::new(client.clone(), artifacts.clone())?;
        let locks = locks.clone();
        let name = format!("Concurrent {} {}", i, thread_rng().gen::<u32>());
        handles.push(tokio::spawn(async move {
            let mut reconciler = Reconciler::new(store, deployer);
            let lease = locks.lease(CELINE.address()).await;
            reconciler
                .reconcile(
                    &vault_spec(&name),
                    &strategy_spec(&name, "PeerStrategy"),
                    &lease,
                )
                .await
        }));
    }

    for handle in handles {
        let result = handle.await??;
        assert!(result.redeployed);
        assert_eq!(
            peer_of(client.clone(), result.vault_address).await?,
            result.strategy_address
        );
        assert_eq!(
            peer_of(client.clone(), result.strategy_address).await?,
            result.vault_address
        );
    }

    Ok(())
}
