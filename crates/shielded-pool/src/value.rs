//! amounts and addresses

use std::fmt;

use merkle_tree::Hash;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};

/// base units of the pooled asset
pub type Amount = u64;

/// opaque 32-byte account address on the host ledger
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// parse `0x`-prefixed or bare hex
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| PoolError::Serialization(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| PoolError::Serialization(format!("address is {} bytes", v.len())))?;
        Ok(Self(bytes))
    }

    /// public-signal encoding
    pub fn to_field(&self) -> Hash {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// 32-byte big-endian encoding of an amount
pub fn amount_to_field(amount: Amount) -> Hash {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&amount.to_be_bytes());
    out
}
