//! Serde helpers for values that the default ethers encodings don't render the
//! way deployment files need them.

/// Addresses that must carry their exact checksum casing.
pub mod checksummed {
    use address_predictor::{parse_checksummed, to_checksum};
    use ethers::types::Address;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_checksum(address))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        parse_checksummed(&s).map_err(serde::de::Error::custom)
    }
}

/// Addresses that are written checksummed and read with wallet rules, so
/// hand-written lowercase addresses are accepted.
pub mod address {
    use address_predictor::{parse_address, to_checksum};
    use ethers::types::Address;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_checksum(address))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        parse_address(&s).map_err(serde::de::Error::custom)
    }
}

/// 256-bit integers as decimal strings.
pub mod u256_dec {
    use ethers::types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dec_string: String = Deserialize::deserialize(deserializer)?;
        let u256 = U256::from_dec_str(&dec_string).map_err(serde::de::Error::custom)?;
        Ok(u256)
    }
}

/// Signed 256-bit integers as decimal strings.
pub mod i256_dec {
    use ethers::types::I256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &I256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<I256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dec_string: String = Deserialize::deserialize(deserializer)?;
        I256::from_dec_str(&dec_string).map_err(serde::de::Error::custom)
    }
}
