//! Asset-related types for the ledger
//!
//! An asset is identified by a short symbol such as `USD` or `BTC`. The same
//! identifier type is used for registry lookups and for balance keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a fungible asset
///
/// Ordering is lexicographic over the symbol bytes, which makes it usable as
/// the second component of the balance lock order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset identifier from a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        AssetId(symbol.into())
    }

    /// The symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(symbol: &str) -> Self {
        AssetId::new(symbol)
    }
}

impl From<String> for AssetId {
    fn from(symbol: String) -> Self {
        AssetId(symbol)
    }
}

/// Registry metadata for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    /// The asset this metadata describes
    pub id: AssetId,

    /// Number of decimal places used when formatting amounts of this asset
    ///
    /// Display only. The ledger never rounds balances to this precision.
    pub precision: u32,

    /// Inactive assets are rejected by every balance mutation
    pub active: bool,
}

impl AssetMeta {
    /// Create metadata for an active asset
    pub fn new(id: impl Into<AssetId>, precision: u32) -> Self {
        AssetMeta {
            id: id.into(),
            precision,
            active: true,
        }
    }

    /// Same metadata, marked inactive
    pub fn deactivated(self) -> Self {
        AssetMeta {
            active: false,
            ..self
        }
    }
}

/// Parses `SYMBOL:PRECISION` (e.g. `SOL:9`) into active asset metadata
impl FromStr for AssetMeta {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, precision) = s
            .split_once(':')
            .ok_or_else(|| format!("expected SYMBOL:PRECISION, got '{}'", s))?;

        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(format!("empty asset symbol in '{}'", s));
        }

        let precision = precision
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid precision in '{}': {}", s, e))?;

        Ok(AssetMeta::new(symbol, precision))
    }
}
