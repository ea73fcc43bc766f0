//! pool configuration

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::value::Amount;

/// pool parameters, fixed at construction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// exact value of every deposit, in base units
    pub denomination: Amount,
    /// tree height, capacity is 2^height leaves
    pub tree_height: u8,
    /// number of recent roots accepted by withdrawals
    pub root_history_size: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            denomination: 1_000_000_000,
            tree_height: 20,
            root_history_size: 30,
        }
    }
}

impl PoolConfig {
    pub fn new(denomination: Amount) -> Self {
        Self {
            denomination,
            ..Default::default()
        }
    }

    pub fn with_tree_height(mut self, height: u8) -> Self {
        self.tree_height = height;
        self
    }

    pub fn with_root_history_size(mut self, size: u32) -> Self {
        self.root_history_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.denomination == 0 {
            return Err(PoolError::InvalidConfig("denomination must be non-zero".into()));
        }
        if self.tree_height == 0 || self.tree_height > merkle_tree::MAX_HEIGHT {
            return Err(PoolError::InvalidConfig(format!(
                "tree height {} outside 1..={}",
                self.tree_height,
                merkle_tree::MAX_HEIGHT
            )));
        }
        if self.root_history_size == 0 {
            return Err(PoolError::InvalidConfig(
                "root history size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// parse and validate; missing fields take their defaults
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// 2^tree_height, `None` if that does not fit a u64
    pub fn capacity(&self) -> Option<u64> {
        1u64.checked_shl(u32::from(self.tree_height))
    }
}
