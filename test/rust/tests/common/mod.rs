#![allow(dead_code)]

use std::sync::Arc;

use chain_utils::{
    artifacts::{Artifact, ArtifactRegistry},
    chain::{Chain, ChainClient},
    constants::MAYBE_ETHEREUM_URL,
};
use ethers::{
    abi::{parse_abi, Abi},
    contract::Contract,
    providers::Middleware,
    signers::{LocalWallet, Signer},
    types::{Address, Bytes},
    utils::{hex, parse_ether},
};
use eyre::Result;

// Creation code of a contract that stores the address passed to its
// constructor and returns it from every call:
//
//   codecopy(0, 0x23, 0x20) sstore(0, mload(0))
//   codecopy(0, 0x18, 0x0b) return(0, 0x0b)
//   runtime: mstore(0, sload(0)) return(0, 0x20)
const PEER_BYTECODE: &str =
    "60206023600039600051600055600b8060186000396000f360005460005260206000f3";

pub fn peer_abi() -> Result<Abi> {
    Ok(parse_abi(&[
        "constructor(address peer)",
        "function peer() external view returns (address)",
    ])?)
}

pub fn peer_artifact() -> Result<Artifact> {
    Ok(Artifact::new(peer_abi()?, Bytes::from(hex::decode(PEER_BYTECODE)?)))
}

/// A registry where every given kind is the peer contract.
pub fn peer_registry(kinds: &[&str]) -> Result<ArtifactRegistry> {
    let mut registry = ArtifactRegistry::new();
    for kind in kinds {
        registry.insert(*kind, peer_artifact()?);
    }
    Ok(registry)
}

/// Reads the peer address a deployed peer contract was constructed with.
pub async fn peer_of<M: Middleware + 'static>(client: Arc<M>, address: Address) -> Result<Address> {
    let contract = Contract::new(address, peer_abi()?, client);
    Ok(contract.method::<_, Address>("peer", ())?.call().await?)
}

/// Connects to the test chain and returns a client for a freshly funded
/// account.
pub async fn setup(wallet: &LocalWallet) -> Result<(Chain, Arc<ChainClient<LocalWallet>>)> {
    let _ = tracing_subscriber::fmt::try_init();
    let chain = Chain::connect(MAYBE_ETHEREUM_URL.clone()).await?;
    chain.deal(wallet.address(), parse_ether(100)?).await?;
    let client = chain.client(wallet.clone()).await?;
    Ok((chain, client))
}
