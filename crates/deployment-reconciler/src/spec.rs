use std::{fmt, fs, path::Path};

use deployment_records::ConstructorArg;
use ethers::types::Address;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// The side of the pair a spec describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Vault,
    Strategy,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Vault => write!(f, "vault"),
            Role::Strategy => write!(f, "strategy"),
        }
    }
}

/// The desired state of one contract. The constructor arguments contain peer
/// placeholders for the other contract's address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtifactSpec {
    pub logical_name: String,
    pub contract_kind: String,
    pub constructor_args: Vec<ConstructorArg>,
}

impl ArtifactSpec {
    pub fn new(
        logical_name: impl Into<String>,
        contract_kind: impl Into<String>,
        constructor_args: Vec<ConstructorArg>,
    ) -> Self {
        Self {
            logical_name: logical_name.into(),
            contract_kind: contract_kind.into(),
            constructor_args,
        }
    }

    /// Checks that every field the deployment needs is present.
    pub fn validate(&self, role: Role) -> Result<(), ConfigurationError> {
        if self.logical_name.trim().is_empty() {
            return Err(ConfigurationError::MissingLogicalName(role));
        }
        if self.contract_kind.trim().is_empty() {
            return Err(ConfigurationError::MissingContractKind(role));
        }
        if !self
            .constructor_args
            .iter()
            .any(ConstructorArg::contains_peer)
        {
            return Err(ConfigurationError::MissingPeerPlaceholder {
                role,
                logical_name: self.logical_name.clone(),
            });
        }
        Ok(())
    }

    /// The constructor arguments with the peer placeholders bound to `peer`.
    pub fn resolve(&self, peer: Address) -> Vec<ConstructorArg> {
        ConstructorArg::resolve_all(&self.constructor_args, peer)
    }
}

/// A vault and the strategy it is paired with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairSpec {
    pub vault: ArtifactSpec,
    pub strategy: ArtifactSpec,
}

impl PairSpec {
    /// Loads a pair from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("couldn't read pair spec {}", path.display()))?;
        let pair = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("couldn't parse pair spec {}", path.display()))?;
        Ok(pair)
    }

    /// Validates both specs and checks that they can be told apart.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_pair(&self.vault, &self.strategy)
    }
}

pub(crate) fn validate_pair(
    vault: &ArtifactSpec,
    strategy: &ArtifactSpec,
) -> Result<(), ConfigurationError> {
    vault.validate(Role::Vault)?;
    strategy.validate(Role::Strategy)?;
    if vault.logical_name == strategy.logical_name {
        return Err(ConfigurationError::DuplicateLogicalName(
            vault.logical_name.clone(),
        ));
    }
    Ok(())
}
