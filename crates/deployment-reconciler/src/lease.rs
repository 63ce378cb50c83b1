use std::{collections::HashMap, sync::Arc};

use ethers::types::Address;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out exclusive leases on accounts' nonces. Address prediction is only
/// correct if nothing else sends from the account between the nonce read and
/// the last deployment, so every reconciliation holds a lease for its whole
/// duration. Leases only exclude holders of the same `AccountLocks`.
#[derive(Clone, Debug, Default)]
pub struct AccountLocks {
    locks: Arc<Mutex<HashMap<Address, Arc<Mutex<()>>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the account is free and leases it.
    pub async fn lease(&self, address: Address) -> NonceLease {
        let lock = self.lock_for(address).await;
        NonceLease {
            address,
            _guard: lock.lock_owned().await,
        }
    }

    /// Leases the account if nobody else holds it.
    pub async fn try_lease(&self, address: Address) -> Option<NonceLease> {
        let lock = self.lock_for(address).await;
        let guard = lock.try_lock_owned().ok()?;
        Some(NonceLease {
            address,
            _guard: guard,
        })
    }

    async fn lock_for(&self, address: Address) -> Arc<Mutex<()>> {
        self.locks.lock().await.entry(address).or_default().clone()
    }
}

/// Exclusive use of an account's nonce until dropped.
#[derive(Debug)]
pub struct NonceLease {
    address: Address,
    _guard: OwnedMutexGuard<()>,
}

impl NonceLease {
    pub fn address(&self) -> Address {
        self.address
    }
}
