//! Predicts the addresses of contracts that an account has not created yet.
//!
//! A contract created with `CREATE` receives an address derived only from the
//! creator and the creator's nonce, so the addresses of the next contracts an
//! account deploys are known before any transaction is sent. They stay valid
//! only as long as nothing else consumes those nonces.
mod checksum;
mod create;

use std::fmt;

pub use checksum::{is_checksummed, parse_address, parse_checksummed, to_checksum, ChecksumError};
pub use create::create_address;
use ethers::types::Address;

/// An account and its pending transaction count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Account {
    pub address: Address,
    pub nonce: u64,
}

impl Account {
    pub fn new(address: Address, nonce: u64) -> Self {
        Self { address, nonce }
    }
}

/// The addresses of the next two contracts an account will create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictedAddressPair {
    pub first: Address,
    pub second: Address,
}

impl fmt::Display for PredictedAddressPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "first={} second={}",
            to_checksum(&self.first),
            to_checksum(&self.second)
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("nonce {nonce} of account {account} has no successor")]
    NonceOverflow { account: String, nonce: u64 },
}

/// Predicts the addresses of the contracts created at the account's current
/// nonce and the one after it.
pub fn predict(account: &Account) -> Result<PredictedAddressPair, PredictError> {
    let next = account
        .nonce
        .checked_add(1)
        .ok_or_else(|| PredictError::NonceOverflow {
            account: to_checksum(&account.address),
            nonce: account.nonce,
        })?;
    Ok(PredictedAddressPair {
        first: create_address(account.address, account.nonce),
        second: create_address(account.address, next),
    })
}
