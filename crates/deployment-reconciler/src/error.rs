use ethers::types::Address;

use crate::Role;

/// The desired configuration can't be deployed as given. These are raised
/// before anything is read from or sent to the chain.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("the {0} spec has no logical name")]
    MissingLogicalName(Role),
    #[error("the {0} spec has no contract kind")]
    MissingContractKind(Role),
    #[error("the {role} spec {logical_name:?} has no peer placeholder in its constructor arguments")]
    MissingPeerPlaceholder { role: Role, logical_name: String },
    #[error("the vault and the strategy share the logical name {0:?}")]
    DuplicateLogicalName(String),
    #[error("the nonce lease is for {lease:?} but deployments are signed by {sender:?}")]
    LeaseMismatch { lease: Address, sender: Address },
}

/// A contract landed at a different address than predicted, which means that
/// another transaction consumed one of the predicted nonces. The deployed pair
/// references the wrong addresses and is not recorded.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{logical_name:?} was predicted at {predicted:?} but was deployed at {actual:?}")]
pub struct NonceDriftError {
    pub logical_name: String,
    pub predicted: Address,
    pub actual: Address,
}

/// The vault was deployed but the strategy wasn't. The vault is orphaned and
/// the next reconciliation deploys a fresh pair.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("vault {vault_name:?} was deployed at {vault_address:?} but the strategy deployment failed")]
pub struct PartialDeploymentError {
    pub vault_name: String,
    pub vault_address: Address,
}
