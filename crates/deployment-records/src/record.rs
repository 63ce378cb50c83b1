use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};

use crate::{serde_utils, ConstructorArg};

/// The last known deployment of a logical name. The constructor arguments are
/// the resolved arguments the contract was deployed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub logical_name: String,
    #[serde(with = "serde_utils::checksummed")]
    pub address: Address,
    pub contract_kind: String,
    pub constructor_args: Vec<ConstructorArg>,
    /// The keccak hash of the creation bytecode, when it was known at
    /// deployment time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode_hash: Option<H256>,
}
