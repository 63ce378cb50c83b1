use ethers::{
    types::Address,
    utils::{keccak256, rlp::RlpStream},
};

/// Computes the address of the contract that `sender` creates in the
/// transaction with the given `nonce`. This is the low-order 20 bytes of the
/// keccak hash of the RLP list `[sender, nonce]`.
pub fn create_address(sender: Address, nonce: u64) -> Address {
    let hash = keccak256(rlp_encode(sender, nonce));
    Address::from_slice(&hash[12..])
}

/// RLP encodes the list `[sender, nonce]`.
fn rlp_encode(sender: Address, nonce: u64) -> Vec<u8> {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender).append(&nonce);
    stream.out().to_vec()
}
