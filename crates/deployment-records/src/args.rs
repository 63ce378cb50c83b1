use ethers::{
    abi::Token,
    types::{Address, Bytes, I256, U256},
};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

use crate::serde_utils;

/// A constructor argument. `Peer` is a placeholder for the address of the
/// other contract in a pair and has to be resolved before it can be encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConstructorArg {
    Address(#[serde(with = "serde_utils::address")] Address),
    Uint(#[serde(with = "serde_utils::u256_dec")] U256),
    Int(#[serde(with = "serde_utils::i256_dec")] I256),
    Bool(bool),
    String(String),
    Bytes(Bytes),
    /// A `bytesN` value. Its length is the `N` of the parameter type.
    FixedBytes(Bytes),
    Array(Vec<ConstructorArg>),
    Tuple(Vec<ConstructorArg>),
    Peer,
}

impl ConstructorArg {
    /// Replaces every peer placeholder, including nested ones, with `peer`.
    pub fn resolve(&self, peer: Address) -> ConstructorArg {
        match self {
            Self::Peer => Self::Address(peer),
            Self::Array(items) => Self::Array(items.iter().map(|a| a.resolve(peer)).collect()),
            Self::Tuple(items) => Self::Tuple(items.iter().map(|a| a.resolve(peer)).collect()),
            other => other.clone(),
        }
    }

    /// Resolves a whole argument list.
    pub fn resolve_all(args: &[ConstructorArg], peer: Address) -> Vec<ConstructorArg> {
        args.iter().map(|arg| arg.resolve(peer)).collect()
    }

    /// Whether this argument is or contains a peer placeholder.
    pub fn contains_peer(&self) -> bool {
        match self {
            Self::Peer => true,
            Self::Array(items) | Self::Tuple(items) => items.iter().any(Self::contains_peer),
            _ => false,
        }
    }

    /// Converts a resolved argument into an ABI token.
    pub fn to_token(&self) -> Result<Token> {
        Ok(match self {
            Self::Address(address) => Token::Address(*address),
            Self::Uint(value) => Token::Uint(*value),
            Self::Int(value) => Token::Int(value.into_raw()),
            Self::Bool(value) => Token::Bool(*value),
            Self::String(value) => Token::String(value.clone()),
            Self::Bytes(value) => Token::Bytes(value.to_vec()),
            Self::FixedBytes(value) => {
                if value.is_empty() || value.len() > 32 {
                    return Err(eyre!(
                        "fixed bytes must be 1 to 32 bytes long, got {}",
                        value.len()
                    ));
                }
                Token::FixedBytes(value.to_vec())
            }
            Self::Array(items) => Token::Array(
                items
                    .iter()
                    .map(Self::to_token)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Self::Tuple(items) => Token::Tuple(
                items
                    .iter()
                    .map(Self::to_token)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Self::Peer => return Err(eyre!("can't encode an unresolved peer placeholder")),
        })
    }
}
