use async_trait::async_trait;
use deployment_records::ConstructorArg;
use ethers::types::{Address, H256};
use eyre::Result;

/// Reads an account's transaction count, including pending transactions.
#[async_trait]
pub trait NonceSource: Send + Sync {
    async fn transaction_count(&self, address: Address) -> Result<u64>;
}

/// Submits contract creations from a single account.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// The account that signs the deployments.
    fn sender(&self) -> Address;

    /// Deploys a contract of the given kind with resolved constructor
    /// arguments and returns its address once the creation is included.
    async fn deploy(&self, contract_kind: &str, args: &[ConstructorArg]) -> Result<Address>;

    /// The keccak hash of the kind's creation bytecode, if it is known.
    fn bytecode_hash(&self, _contract_kind: &str) -> Result<Option<H256>> {
        Ok(None)
    }
}
