//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which Meridian network the tool talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Live,
    /// The public test network.
    Test,
    /// Local development network.
    Dev,
}

impl NetworkId {
    /// Default RPC endpoint for this network.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Live => "https://rpc.meridian.network",
            Self::Test => "https://rpc.test.meridian.network",
            Self::Dev => "http://127.0.0.1:7076",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        }
    }
}

impl std::str::FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "test" => Ok(Self::Test),
            "dev" => Ok(Self::Dev),
            other => Err(format!("unknown network `{other}` (expected live/test/dev)")),
        }
    }
}
