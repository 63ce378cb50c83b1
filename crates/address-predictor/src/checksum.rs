use ethers::{
    types::Address,
    utils::{hex, keccak256},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("{0:?} is not a 20 byte hex address")]
    Malformed(String),
    #[error("{found:?} does not match its checksum encoding {expected:?}")]
    Mismatch { found: String, expected: String },
}

/// Renders an address with EIP-55 mixed-case checksum encoding.
pub fn to_checksum(address: &Address) -> String {
    let hex = hex_lower(address);
    let hash = keccak256(hex.as_bytes());
    let mut encoded = String::with_capacity(42);
    encoded.push_str("0x");
    for (i, c) in hex.chars().enumerate() {
        if c.is_ascii_alphabetic() && nibble(&hash, i) >= 8 {
            encoded.push(c.to_ascii_uppercase());
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Checks that `s` is a `0x`-prefixed address whose casing is exactly its
/// checksum encoding.
pub fn is_checksummed(s: &str) -> bool {
    match parse_hex(s) {
        Some(address) => to_checksum(&address) == s,
        None => false,
    }
}

/// Parses an address and requires the exact checksum casing.
pub fn parse_checksummed(s: &str) -> Result<Address, ChecksumError> {
    let address = parse_hex(s).ok_or_else(|| ChecksumError::Malformed(s.to_string()))?;
    let expected = to_checksum(&address);
    if expected != s {
        return Err(ChecksumError::Mismatch {
            found: s.to_string(),
            expected,
        });
    }
    Ok(address)
}

/// Parses an address the way wallets do: all-lowercase and all-uppercase hex
/// carry no checksum, mixed case must be a valid checksum.
pub fn parse_address(s: &str) -> Result<Address, ChecksumError> {
    let address = parse_hex(s).ok_or_else(|| ChecksumError::Malformed(s.to_string()))?;
    let digits = &s[2..];
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return parse_checksummed(s);
    }
    Ok(address)
}

fn parse_hex(s: &str) -> Option<Address> {
    let digits = s.strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }
    digits.parse::<Address>().ok()
}

fn hex_lower(address: &Address) -> String {
    hex::encode(address.as_bytes())
}

fn nibble(hash: &[u8; 32], i: usize) -> u8 {
    let byte = hash[i / 2];
    if i % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0f
    }
}
