//! Federation address resolution
//!
//! A federation address `name*domain` names an account through the
//! domain's `stellar.toml`, whose `FEDERATION_SERVER` answers
//! `?q=<address>&type=name` lookups with the account id.

use crate::error::{Result, TxAsmError};
use crate::horizon::{encode_query, HorizonClient, HorizonTransport};
use crate::keys::AccountId;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct StellarToml {
    #[serde(rename = "FEDERATION_SERVER")]
    federation_server: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FederationRecord {
    account_id: Option<String>,
}

/// Split `name*domain`, or `None` when `address` is not a federation address
pub fn split_address(address: &str) -> Option<(&str, &str)> {
    let (name, domain) = address.split_once('*')?;
    if name.is_empty() || domain.is_empty() || domain.contains('*') {
        return None;
    }
    Some((name, domain))
}

/// Federation server advertised by `domain`
pub fn federation_server<T: HorizonTransport>(transport: &T, domain: &str) -> Result<String> {
    let toml_url = format!("https://{}/.well-known/stellar.toml", domain);
    let text = transport
        .get_text(&toml_url)
        .map_err(|e| TxAsmError::Federation(format!("{}: {}", toml_url, e)))?;
    let parsed: StellarToml = toml::from_str(&text)
        .map_err(|e| TxAsmError::Federation(format!("{} is not valid TOML: {}", toml_url, e)))?;
    parsed
        .federation_server
        .map(|server| server.trim().to_string())
        .filter(|server| !server.is_empty())
        .ok_or_else(|| {
            TxAsmError::Federation(format!("federation not supported at domain {}", domain))
        })
}

/// Resolve a federation address, or parse a plain account id
pub fn resolve<T: HorizonTransport>(transport: &T, address: &str) -> Result<AccountId> {
    let Some((_, domain)) = split_address(address) else {
        if address.contains('*') {
            return Err(TxAsmError::Federation(format!(
                "{:?} is not a valid federation address",
                address
            )));
        }
        return address.parse();
    };

    let server = federation_server(transport, domain)?;
    let lookup_url = encode_query(&server, &[("q", address), ("type", "name")])
        .map_err(|e| TxAsmError::Federation(format!("bad federation server: {}", e)))?;
    let record: FederationRecord = serde_json::from_value(
        transport
            .get_json(&lookup_url)
            .map_err(|e| TxAsmError::Federation(format!("lookup {} failed: {}", lookup_url, e)))?,
    )
    .map_err(|e| TxAsmError::Federation(format!("bad lookup response: {}", e)))?;

    let account_id = record
        .account_id
        .ok_or_else(|| TxAsmError::Federation(format!("no account for {}", address)))?;
    debug!(address, account_id = %account_id, "resolved federation address");
    account_id
        .parse()
        .map_err(|e| TxAsmError::Federation(format!("server returned {:?}: {}", account_id, e)))
}

impl<T: HorizonTransport> HorizonClient<T> {
    /// Resolve `name*domain` or a plain account id
    pub fn resolve(&self, address: &str) -> Result<AccountId> {
        resolve(self.transport(), address)
    }
}
