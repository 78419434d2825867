//! Network selection
//!
//! A [`NetworkConfig`] pins the query endpoint and the passphrase whose
//! SHA-256 hash scopes every transaction signature. It is an explicit
//! value passed to the builder and client; nothing here is process-global.

use sha2::{Digest, Sha256};
use std::fmt;

pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const PUBLIC_HORIZON_URL: &str = "https://horizon.stellar.org";
pub const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";

/// Endpoint, passphrase and derived network id
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    horizon_url: String,
    passphrase: String,
    network_id: [u8; 32],
}

impl NetworkConfig {
    /// A network with an arbitrary endpoint and passphrase
    pub fn custom(horizon_url: &str, passphrase: &str) -> Self {
        Self {
            horizon_url: horizon_url.trim_end_matches('/').to_string(),
            passphrase: passphrase.to_string(),
            network_id: Sha256::digest(passphrase.as_bytes()).into(),
        }
    }

    pub fn public() -> Self {
        Self::custom(PUBLIC_HORIZON_URL, PUBLIC_PASSPHRASE)
    }

    pub fn testnet() -> Self {
        Self::custom(TESTNET_HORIZON_URL, TESTNET_PASSPHRASE)
    }

    /// Same passphrase, different query endpoint
    pub fn with_horizon_url(mut self, horizon_url: &str) -> Self {
        self.horizon_url = horizon_url.trim_end_matches('/').to_string();
        self
    }

    pub fn horizon_url(&self) -> &str {
        &self.horizon_url
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn network_id(&self) -> &[u8; 32] {
        &self.network_id
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("horizon_url", &self.horizon_url)
            .field("passphrase", &self.passphrase)
            .field("network_id", &hex::encode(self.network_id))
            .finish()
    }
}
