use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Asset class of a tracked symbol. Drives how news sources build their queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Forex,
    Crypto,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Forex => "forex",
            AssetType::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" | "etf" => Ok(AssetType::Stock),
            "forex" | "fx" => Ok(AssetType::Forex),
            "crypto" => Ok(AssetType::Crypto),
            other => Err(format!("unknown asset type: {other}")),
        }
    }
}

/// A symbol on the watchlist. Created by watchlist management; read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistSymbol {
    pub id: i64,
    pub symbol: String,
    pub asset_type: Option<AssetType>,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a symbol to the watchlist (single or bulk import).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub symbol: String,
    #[serde(default)]
    pub asset_type: Option<AssetType>,
}

impl WatchlistEntry {
    pub fn new(symbol: &str, asset_type: Option<AssetType>) -> Self {
        Self {
            symbol: symbol.to_string(),
            asset_type,
        }
    }

    /// Watchlist symbols are stored uppercase.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }
}

/// Outcome of a bulk watchlist import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BulkAddResult {
    pub added: Vec<WatchlistSymbol>,
    pub skipped: Vec<String>,
}
