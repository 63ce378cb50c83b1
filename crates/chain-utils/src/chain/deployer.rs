use std::sync::Arc;

use async_trait::async_trait;
use deployment_reconciler::{ContractDeployer, NonceSource};
use deployment_records::ConstructorArg;
use ethers::{
    abi::Token,
    contract::ContractFactory,
    providers::Middleware,
    types::{Address, TransactionReceipt, H256, U64},
};
use eyre::{eyre, Result, WrapErr};
use tracing::debug;

use super::pending_transaction_count;
use crate::artifacts::ArtifactRegistry;

/// Deploys contracts from an artifact registry through an ethers client. The
/// client's default sender signs every deployment.
pub struct ChainDeployer<M: Middleware + 'static> {
    client: Arc<M>,
    sender: Address,
    artifacts: ArtifactRegistry,
}

impl<M: Middleware + 'static> ChainDeployer<M> {
    pub fn new(client: Arc<M>, artifacts: ArtifactRegistry) -> Result<Self> {
        let sender = client
            .default_sender()
            .ok_or(eyre!("the client doesn't have a default sender"))?;
        Ok(Self {
            client,
            sender,
            artifacts,
        })
    }
}

#[async_trait]
impl<M: Middleware + 'static> NonceSource for ChainDeployer<M> {
    async fn transaction_count(&self, address: Address) -> Result<u64> {
        pending_transaction_count(self.client.as_ref(), address).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> ContractDeployer for ChainDeployer<M> {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, contract_kind: &str, args: &[ConstructorArg]) -> Result<Address> {
        let artifact = self.artifacts.get(contract_kind)?;
        let tokens = args
            .iter()
            .map(ConstructorArg::to_token)
            .collect::<Result<Vec<Token>>>()?;

        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );
        let (contract, receipt) = factory
            .deploy_tokens(tokens)
            .map_err(|e| eyre!("couldn't encode the {} constructor: {}", contract_kind, e))?
            .send_with_receipt()
            .await
            .map_err(|e| eyre!("{}", e))
            .wrap_err_with(|| format!("{} deployment failed", contract_kind))?;
        check_receipt(contract_kind, &receipt)?;
        debug!(
            contract_kind,
            address = ?contract.address(),
            transaction = ?receipt.transaction_hash,
            block = ?receipt.block_number,
            "deployed contract"
        );

        Ok(contract.address())
    }

    fn bytecode_hash(&self, contract_kind: &str) -> Result<Option<H256>> {
        Ok(self
            .artifacts
            .get(contract_kind)
            .ok()
            .map(|artifact| artifact.bytecode_hash()))
    }
}

/// A creation that reverted still gets a receipt with the address it would
/// have had, so only the status tells whether the contract exists.
fn check_receipt(contract_kind: &str, receipt: &TransactionReceipt) -> Result<()> {
    if receipt.status != Some(U64::one()) {
        return Err(eyre!(
            "{} deployment reverted in transaction {:?}",
            contract_kind,
            receipt.transaction_hash
        ));
    }
    Ok(())
}
