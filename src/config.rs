//! Client configuration file
//!
//! ```toml
//! network = "custom"
//! horizon_url = "http://localhost:8000"
//! passphrase = "Standalone Network ; February 2017"
//! timeout_secs = 10
//! ```

use crate::error::{Result, TxAsmError};
use crate::horizon::{HorizonClient, DEFAULT_TIMEOUT_SECS};
use crate::network::NetworkConfig;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Public,
    #[default]
    Testnet,
    Custom,
}

impl FromStr for NetworkKind {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "public" => Ok(NetworkKind::Public),
            "testnet" => Ok(NetworkKind::Testnet),
            "custom" => Ok(NetworkKind::Custom),
            other => Err(TxAsmError::Config(format!("unknown network {:?}", other))),
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NetworkKind::Public => "public",
            NetworkKind::Testnet => "testnet",
            NetworkKind::Custom => "custom",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub network: NetworkKind,
    /// Overrides the network's default endpoint
    pub horizon_url: Option<String>,
    /// Only meaningful for custom networks
    pub passphrase: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkKind::Testnet,
            horizon_url: None,
            passphrase: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| TxAsmError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TxAsmError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Resolve the configured network
    pub fn network_config(&self) -> Result<NetworkConfig> {
        let network = match self.network {
            NetworkKind::Custom => {
                let (Some(url), Some(passphrase)) = (&self.horizon_url, &self.passphrase) else {
                    return Err(TxAsmError::Config(
                        "a custom network needs both horizon_url and passphrase".to_string(),
                    ));
                };
                return Ok(NetworkConfig::custom(url, passphrase));
            }
            NetworkKind::Public => NetworkConfig::public(),
            NetworkKind::Testnet => NetworkConfig::testnet(),
        };
        if let Some(passphrase) = &self.passphrase {
            if passphrase != network.passphrase() {
                return Err(TxAsmError::Config(format!(
                    "passphrase does not match the {} network; use network = \"custom\"",
                    self.network
                )));
            }
        }
        Ok(match &self.horizon_url {
            Some(url) => network.with_horizon_url(url),
            None => network,
        })
    }

    pub fn client(&self) -> Result<HorizonClient> {
        HorizonClient::with_timeout(self.network_config()?, self.timeout_secs)
    }
}
