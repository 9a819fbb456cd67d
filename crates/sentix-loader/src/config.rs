use sentix_models::SentixConfig;
use serde::{Deserialize, Serialize};

/// Loader configuration: the shared sentix sections plus a `[loader]` table,
/// so one file serves both binaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoaderConfig {
    #[serde(flatten)]
    pub sentix: SentixConfig,
    #[serde(default)]
    pub loader: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Seconds between watchlist refreshes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    3600
}
