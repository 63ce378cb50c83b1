mod common;

use address_predictor::{predict, Account};
use chain_utils::{
    chain::ChainDeployer,
    constants::{ALICE, BOB},
};
use deployment_reconciler::{ContractDeployer, NonceSource};
use deployment_records::ConstructorArg;
use ethers::{
    providers::Middleware,
    signers::Signer,
    types::{Address, TransactionRequest},
};
use eyre::Result;

use crate::common::{peer_of, peer_registry, setup};

#[ignore]
#[tokio::test]
async fn test_predicted_addresses_match_deployments() -> Result<()> {
    let (chain, client) = setup(&ALICE).await?;
    let deployer = ChainDeployer::new(client.clone(), peer_registry(&["Peer"])?)?;
    assert_eq!(deployer.sender(), ALICE.address());

    // Move the nonce past the single-byte range a few times over.
    for _ in 0..3 {
        client
            .send_transaction(
                TransactionRequest::new().to(Address::zero()).value(1u64),
                None,
            )
            .await?
            .await?;
    }

    let nonce = deployer.transaction_count(ALICE.address()).await?;
    assert_eq!(nonce, chain.transaction_count(ALICE.address()).await?);
    let predicted = predict(&Account::new(ALICE.address(), nonce))?;

    let first = deployer
        .deploy("Peer", &[ConstructorArg::Address(predicted.second)])
        .await?;
    let second = deployer
        .deploy("Peer", &[ConstructorArg::Address(predicted.first)])
        .await?;
    assert_eq!(first, predicted.first);
    assert_eq!(second, predicted.second);

    // Each contract was built with the other's address before it existed.
    assert_eq!(peer_of(client.clone(), first).await?, second);
    assert_eq!(peer_of(client.clone(), second).await?, first);

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_deploy_unknown_kind_sends_nothing() -> Result<()> {
    let (chain, client) = setup(&BOB).await?;
    let deployer = ChainDeployer::new(client, peer_registry(&["Peer"])?)?;

    let nonce = chain.transaction_count(BOB.address()).await?;
    assert!(deployer
        .deploy("Missing", &[ConstructorArg::Address(Address::zero())])
        .await
        .is_err());
    assert!(deployer.deploy("Peer", &[ConstructorArg::Peer]).await.is_err());
    assert_eq!(deployer.bytecode_hash("Missing")?, None);
    assert_eq!(chain.transaction_count(BOB.address()).await?, nonce);

    Ok(())
}
