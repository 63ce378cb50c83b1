use std::fmt;

use address_predictor::{predict, to_checksum, Account};
use deployment_records::{serde_utils, ConstructorArg, DeploymentRecord, RecordStore};
use ethers::types::{Address, H256};
use eyre::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    spec::validate_pair, ArtifactSpec, ConfigurationError, ContractDeployer, NonceDriftError,
    NonceLease, NonceSource, PairSpec, PartialDeploymentError, Role,
};

/// The outcome of a reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    #[serde(with = "serde_utils::checksummed")]
    pub vault_address: Address,
    #[serde(with = "serde_utils::checksummed")]
    pub strategy_address: Address,
    pub redeployed: bool,
}

/// A difference between a recorded deployment and the desired spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Drift {
    ContractKind {
        role: Role,
        recorded: String,
        desired: String,
    },
    ConstructorArgs {
        role: Role,
        recorded: Vec<ConstructorArg>,
        desired: Vec<ConstructorArg>,
    },
    Bytecode {
        role: Role,
        recorded: H256,
        current: H256,
    },
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::ContractKind {
                role,
                recorded,
                desired,
            } => write!(
                f,
                "{} contract kind changed from {:?} to {:?}",
                role, recorded, desired
            ),
            Drift::ConstructorArgs {
                role,
                recorded,
                desired,
            } => write!(
                f,
                "{} constructor arguments changed from {:?} to {:?}",
                role, recorded, desired
            ),
            Drift::Bytecode {
                role,
                recorded,
                current,
            } => write!(
                f,
                "{} bytecode changed from {:?} to {:?}",
                role, recorded, current
            ),
        }
    }
}

/// Why a pair has to be deployed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeployReason {
    /// At least one of the two records doesn't exist. A lone record is never
    /// reused since its peer reference can't be satisfied.
    Missing { vault: bool, strategy: bool },
    /// Both records exist but don't match the desired specs.
    Drift(Vec<Drift>),
}

/// What a reconciliation would do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    Reuse { vault: Address, strategy: Address },
    Deploy(DeployReason),
}

/// Brings a vault and its strategy in line with their specs.
///
/// The reconciler is single-writer: it reads the account's nonce, predicts the
/// addresses of the next two contracts, and relies on the two deployments it
/// sends being exactly the next two transactions of the account. Callers must
/// hold the account's `NonceLease` and must not send from the account by any
/// other means while `reconcile` runs.
#[derive(Debug)]
pub struct Reconciler<S, C> {
    store: S,
    chain: C,
}

impl<S, C> Reconciler<S, C>
where
    S: RecordStore,
    C: NonceSource + ContractDeployer,
{
    pub fn new(store: S, chain: C) -> Self {
        Self { store, chain }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Decides whether the existing deployments can be reused without sending
    /// anything.
    pub fn plan(&self, vault: &ArtifactSpec, strategy: &ArtifactSpec) -> Result<Plan> {
        validate_pair(vault, strategy)?;
        self.plan_validated(vault, strategy)
    }

    fn plan_validated(&self, vault: &ArtifactSpec, strategy: &ArtifactSpec) -> Result<Plan> {
        let recorded_vault = self.store.get(&vault.logical_name)?;
        let recorded_strategy = self.store.get(&strategy.logical_name)?;
        let (recorded_vault, recorded_strategy) = match (recorded_vault, recorded_strategy) {
            (Some(v), Some(s)) => (v, s),
            (v, s) => {
                return Ok(Plan::Deploy(DeployReason::Missing {
                    vault: v.is_none(),
                    strategy: s.is_none(),
                }))
            }
        };

        // Bind each spec's placeholders to the address its peer already has
        // and compare the result with what was deployed.
        let mut drifts = self.drifts(
            Role::Vault,
            vault,
            &recorded_vault,
            recorded_strategy.address,
        )?;
        drifts.extend(self.drifts(
            Role::Strategy,
            strategy,
            &recorded_strategy,
            recorded_vault.address,
        )?);

        if drifts.is_empty() {
            Ok(Plan::Reuse {
                vault: recorded_vault.address,
                strategy: recorded_strategy.address,
            })
        } else {
            Ok(Plan::Deploy(DeployReason::Drift(drifts)))
        }
    }

    /// Reuses the recorded pair if it matches the specs and otherwise deploys
    /// and records a new pair wired to each other.
    ///
    /// Chain and store errors are returned as they are. If the strategy
    /// deployment fails after the vault was deployed, the error is wrapped in
    /// a `PartialDeploymentError`. If a contract doesn't land at its predicted
    /// address, a `NonceDriftError` is returned. In both cases nothing is
    /// recorded and the next reconciliation deploys a fresh pair.
    pub async fn reconcile(
        &mut self,
        vault: &ArtifactSpec,
        strategy: &ArtifactSpec,
        lease: &NonceLease,
    ) -> Result<ReconciliationResult> {
        validate_pair(vault, strategy)?;
        let sender = self.chain.sender();
        if lease.address() != sender {
            return Err(ConfigurationError::LeaseMismatch {
                lease: lease.address(),
                sender,
            }
            .into());
        }

        match self.plan_validated(vault, strategy)? {
            Plan::Reuse {
                vault: vault_address,
                strategy: strategy_address,
            } => {
                info!(
                    vault = %to_checksum(&vault_address),
                    strategy = %to_checksum(&strategy_address),
                    "reusing deployed pair"
                );
                return Ok(ReconciliationResult {
                    vault_address,
                    strategy_address,
                    redeployed: false,
                });
            }
            Plan::Deploy(DeployReason::Missing {
                vault: vault_missing,
                strategy: strategy_missing,
            }) => {
                info!(
                    vault = %vault.logical_name,
                    vault_missing,
                    strategy = %strategy.logical_name,
                    strategy_missing,
                    "deploying pair with missing records"
                );
            }
            Plan::Deploy(DeployReason::Drift(drifts)) => {
                for drift in &drifts {
                    warn!(%drift, "deployed pair drifted from its spec");
                }
            }
        }

        // Predict where the vault and the strategy will land. The vault is
        // sent first, so it takes the current nonce.
        let nonce = self.chain.transaction_count(sender).await?;
        let predicted = predict(&Account::new(sender, nonce))?;
        info!(nonce, %predicted, "predicted pair addresses");

        let vault_args = vault.resolve(predicted.second);
        let strategy_args = strategy.resolve(predicted.first);

        let vault_address = self.chain.deploy(&vault.contract_kind, &vault_args).await?;
        check_prediction(&vault.logical_name, predicted.first, vault_address)?;
        info!(vault = %to_checksum(&vault_address), "deployed vault");

        let strategy_address = match self
            .chain
            .deploy(&strategy.contract_kind, &strategy_args)
            .await
        {
            Ok(address) => address,
            Err(error) => {
                return Err(error.wrap_err(PartialDeploymentError {
                    vault_name: vault.logical_name.clone(),
                    vault_address,
                }))
            }
        };
        check_prediction(&strategy.logical_name, predicted.second, strategy_address)?;
        info!(strategy = %to_checksum(&strategy_address), "deployed strategy");

        self.store.put(DeploymentRecord {
            logical_name: vault.logical_name.clone(),
            address: vault_address,
            contract_kind: vault.contract_kind.clone(),
            constructor_args: vault_args,
            bytecode_hash: self.chain.bytecode_hash(&vault.contract_kind)?,
        })?;
        self.store.put(DeploymentRecord {
            logical_name: strategy.logical_name.clone(),
            address: strategy_address,
            contract_kind: strategy.contract_kind.clone(),
            constructor_args: strategy_args,
            bytecode_hash: self.chain.bytecode_hash(&strategy.contract_kind)?,
        })?;

        Ok(ReconciliationResult {
            vault_address,
            strategy_address,
            redeployed: true,
        })
    }

    /// Reconciles a pair loaded as a single document.
    pub async fn reconcile_pair(
        &mut self,
        pair: &PairSpec,
        lease: &NonceLease,
    ) -> Result<ReconciliationResult> {
        self.reconcile(&pair.vault, &pair.strategy, lease).await
    }

    fn drifts(
        &self,
        role: Role,
        spec: &ArtifactSpec,
        record: &DeploymentRecord,
        peer: Address,
    ) -> Result<Vec<Drift>> {
        let mut drifts = Vec::new();
        if spec.contract_kind != record.contract_kind {
            drifts.push(Drift::ContractKind {
                role,
                recorded: record.contract_kind.clone(),
                desired: spec.contract_kind.clone(),
            });
        }

        // Argument order is significant, so this is a plain deep comparison.
        let desired = spec.resolve(peer);
        if desired != record.constructor_args {
            drifts.push(Drift::ConstructorArgs {
                role,
                recorded: record.constructor_args.clone(),
                desired,
            });
        }

        if let (Some(recorded), Some(current)) = (
            record.bytecode_hash,
            self.chain.bytecode_hash(&spec.contract_kind)?,
        ) {
            if recorded != current {
                drifts.push(Drift::Bytecode {
                    role,
                    recorded,
                    current,
                });
            }
        }

        Ok(drifts)
    }
}

fn check_prediction(logical_name: &str, predicted: Address, actual: Address) -> Result<()> {
    if predicted != actual {
        return Err(NonceDriftError {
            logical_name: logical_name.to_string(),
            predicted,
            actual,
        }
        .into());
    }
    Ok(())
}
