//! Account addresses
//!
//! An address is the 20-byte identity of an account. It is derived from
//! signer material by the identity provider; this crate never verifies
//! signatures, it only compares addresses.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::errors::{LedgerError, LedgerResult};

/// Address length in bytes
pub const ADDRESS_LEN: usize = 20;

/// Account identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Derive an address from arbitrary signer material (first 20 bytes of SHA-256)
    pub fn derive(material: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"sigs/");
        hasher.update(material);
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Address(bytes)
    }

    /// Build an address from raw bytes; must be exactly 20 bytes
    pub fn from_bytes(raw: &[u8]) -> LedgerResult<Self> {
        if raw.len() != ADDRESS_LEN {
            return Err(LedgerError::validation(format!(
                "address must be {} bytes, got {}",
                ADDRESS_LEN,
                raw.len()
            )));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(raw);
        Ok(Address(bytes))
    }

    /// Parse a hex encoded address
    pub fn parse(input: &str) -> LedgerResult<Self> {
        let raw = hex::decode(input.trim())
            .map_err(|e| LedgerError::validation(format!("address is not hex: {}", e)))?;
        Self::from_bytes(&raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}
