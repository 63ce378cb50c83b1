//! Reconciles a vault and a strategy that hold immutable references to each
//! other's address with what has already been deployed.
//!
//! If both contracts were deployed before with exactly the desired
//! configuration they are reused. Otherwise the addresses of the deploying
//! account's next two contracts are predicted, substituted into the peer
//! placeholders of each constructor, and the vault and the strategy are
//! deployed in that order.
mod chain;
mod error;
mod lease;
mod reconciler;
mod spec;
#[cfg(test)]
mod testing;

pub use chain::{ContractDeployer, NonceSource};
pub use error::{ConfigurationError, NonceDriftError, PartialDeploymentError};
pub use lease::{AccountLocks, NonceLease};
pub use reconciler::{DeployReason, Drift, Plan, ReconciliationResult, Reconciler};
pub use spec::{ArtifactSpec, PairSpec, Role};
