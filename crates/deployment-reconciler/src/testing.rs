//! An in-memory chain for exercising the reconciler.
use std::{collections::HashMap, sync::Mutex};

use address_predictor::create_address;
use async_trait::async_trait;
use deployment_records::ConstructorArg;
use ethers::types::{Address, H256};
use eyre::{eyre, Result};

use crate::{ContractDeployer, NonceSource};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeContract {
    pub contract_kind: String,
    pub args: Vec<ConstructorArg>,
}

#[derive(Debug, Default)]
struct FakeState {
    nonce: u64,
    nonce_reads: usize,
    deployments: usize,
    contracts: HashMap<Address, FakeContract>,
    bytecode_hashes: HashMap<String, H256>,
    revert_deployment: Option<usize>,
    interfere_before_deployment: Option<usize>,
}

/// A chain with a single deploying account. Deployments land at the addresses
/// real contract creations would.
#[derive(Debug)]
pub struct FakeChain {
    sender: Address,
    state: Mutex<FakeState>,
}

impl FakeChain {
    pub fn new(sender: Address, nonce: u64) -> Self {
        Self {
            sender,
            state: Mutex::new(FakeState {
                nonce,
                ..Default::default()
            }),
        }
    }

    pub fn nonce(&self) -> u64 {
        self.state.lock().unwrap().nonce
    }

    pub fn nonce_reads(&self) -> usize {
        self.state.lock().unwrap().nonce_reads
    }

    pub fn deployments(&self) -> usize {
        self.state.lock().unwrap().deployments
    }

    pub fn contract(&self, address: Address) -> Option<FakeContract> {
        self.state.lock().unwrap().contracts.get(&address).cloned()
    }

    /// Sends a transaction from the account that isn't a deployment.
    pub fn send_transfer(&self) {
        self.state.lock().unwrap().nonce += 1;
    }

    pub fn set_bytecode_hash(&self, contract_kind: &str, hash: H256) {
        self.state
            .lock()
            .unwrap()
            .bytecode_hashes
            .insert(contract_kind.to_string(), hash);
    }

    /// Makes the nth deployment from now (zero-based) revert.
    pub fn revert_deployment(&self, n: usize) {
        let mut state = self.state.lock().unwrap();
        state.revert_deployment = Some(state.deployments + n);
    }

    /// Sends an unrelated transaction right before the nth deployment from now.
    pub fn interfere_before_deployment(&self, n: usize) {
        let mut state = self.state.lock().unwrap();
        state.interfere_before_deployment = Some(state.deployments + n);
    }
}

#[async_trait]
impl NonceSource for FakeChain {
    async fn transaction_count(&self, address: Address) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.nonce_reads += 1;
        if address == self.sender {
            Ok(state.nonce)
        } else {
            Ok(0)
        }
    }
}

#[async_trait]
impl ContractDeployer for FakeChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, contract_kind: &str, args: &[ConstructorArg]) -> Result<Address> {
        let mut state = self.state.lock().unwrap();
        let index = state.deployments;
        state.deployments += 1;
        if state.interfere_before_deployment == Some(index) {
            state.nonce += 1;
        }

        // A reverted creation still consumes its nonce.
        let address = create_address(self.sender, state.nonce);
        state.nonce += 1;
        if state.revert_deployment == Some(index) {
            return Err(eyre!("execution reverted"));
        }

        state.contracts.insert(
            address,
            FakeContract {
                contract_kind: contract_kind.to_string(),
                args: args.to_vec(),
            },
        );
        Ok(address)
    }

    fn bytecode_hash(&self, contract_kind: &str) -> Result<Option<H256>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .bytecode_hashes
            .get(contract_kind)
            .copied())
    }
}
