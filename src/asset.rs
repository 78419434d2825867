//! Asset codec
//!
//! An asset is either the native unit or a credit identified by an
//! alphanumeric code and an issuing account. Codes of 1-4 characters use
//! the 4-byte encoding, 5-12 characters the 12-byte encoding.

use crate::error::{Result, TxAsmError};
use crate::keys::AccountId;
use crate::serialization::{decode_fixed_opaque, decode_u32, encode_fixed_opaque, encode_u32};
use crate::serialization::{ByteDeserialize, ByteSerialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Wire discriminant of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetType {
    Native = 0,
    CreditAlphanum4 = 1,
    CreditAlphanum12 = 2,
}

impl AssetType {
    fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(AssetType::Native),
            1 => Ok(AssetType::CreditAlphanum4),
            2 => Ok(AssetType::CreditAlphanum12),
            other => Err(TxAsmError::DeserializationError(format!(
                "Unknown asset type {}",
                other
            ))),
        }
    }

    /// Name used by the query API (`native`, `credit_alphanum4`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Native => "native",
            AssetType::CreditAlphanum4 => "credit_alphanum4",
            AssetType::CreditAlphanum12 => "credit_alphanum12",
        }
    }
}

/// A validated asset code of 1 to 12 ASCII alphanumerics
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetCode(String);

impl AssetCode {
    pub fn new(code: &str) -> Result<Self> {
        if code.is_empty() || code.len() > 12 {
            return Err(TxAsmError::InvalidAsset(format!(
                "code {:?} must be 1 to 12 characters",
                code
            )));
        }
        if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(TxAsmError::InvalidAsset(format!(
                "code {:?} must be ASCII alphanumeric",
                code
            )));
        }
        Ok(AssetCode(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn asset_type(&self) -> AssetType {
        if self.0.len() <= 4 {
            AssetType::CreditAlphanum4
        } else {
            AssetType::CreditAlphanum12
        }
    }

    fn encode_padded(&self, writer: &mut Vec<u8>) -> Result<()> {
        let width = match self.asset_type() {
            AssetType::CreditAlphanum12 => 12,
            _ => 4,
        };
        let mut padded = vec![0u8; width];
        padded[..self.0.len()].copy_from_slice(self.0.as_bytes());
        encode_u32(self.asset_type() as u32, writer)?;
        encode_fixed_opaque(&padded, writer)
    }

    fn decode_padded(asset_type: AssetType, cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let raw: Vec<u8> = match asset_type {
            AssetType::CreditAlphanum4 => decode_fixed_opaque::<4>(cursor)?.to_vec(),
            AssetType::CreditAlphanum12 => decode_fixed_opaque::<12>(cursor)?.to_vec(),
            AssetType::Native => {
                return Err(TxAsmError::DeserializationError(
                    "Native asset has no code".to_string(),
                ))
            }
        };
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        if raw[end..].iter().any(|&b| b != 0) {
            return Err(TxAsmError::DeserializationError(
                "Asset code has bytes after padding".to_string(),
            ));
        }
        let text = std::str::from_utf8(&raw[..end])
            .map_err(|e| TxAsmError::DeserializationError(e.to_string()))?;
        let code = AssetCode::new(text)
            .map_err(|e| TxAsmError::DeserializationError(e.to_string()))?;
        if code.asset_type() != asset_type {
            return Err(TxAsmError::DeserializationError(format!(
                "Code {} does not match {}",
                code,
                asset_type.as_str()
            )));
        }
        Ok(code)
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetCode {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self> {
        AssetCode::new(s)
    }
}

/// On its own an asset code is the allow-trust asset union:
/// a type tag followed by the padded code, without an issuer.
impl ByteSerialize for AssetCode {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        self.encode_padded(writer)
    }
}

impl ByteDeserialize for AssetCode {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let asset_type = AssetType::from_u32(decode_u32(cursor)?)?;
        AssetCode::decode_padded(asset_type, cursor)
    }
}

/// A ledger asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Native,
    Credit { code: AssetCode, issuer: AccountId },
}

impl Asset {
    pub fn native() -> Self {
        Asset::Native
    }

    pub fn credit(code: &str, issuer: AccountId) -> Result<Self> {
        Ok(Asset::Credit {
            code: AssetCode::new(code)?,
            issuer,
        })
    }

    pub fn asset_type(&self) -> AssetType {
        match self {
            Asset::Native => AssetType::Native,
            Asset::Credit { code, .. } => code.asset_type(),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    pub fn code(&self) -> Option<&AssetCode> {
        match self {
            Asset::Native => None,
            Asset::Credit { code, .. } => Some(code),
        }
    }

    pub fn issuer(&self) -> Option<&AccountId> {
        match self {
            Asset::Native => None,
            Asset::Credit { issuer, .. } => Some(issuer),
        }
    }

    /// Build an asset from the `asset_type`/`asset_code`/`asset_issuer`
    /// triple used by the query API
    pub fn from_parts(asset_type: &str, code: Option<&str>, issuer: Option<&str>) -> Result<Self> {
        match (asset_type, code, issuer) {
            ("native", _, _) => Ok(Asset::Native),
            ("credit_alphanum4" | "credit_alphanum12", Some(code), Some(issuer)) => {
                let asset = Asset::credit(code, issuer.parse()?)?;
                if asset.asset_type().as_str() != asset_type {
                    return Err(TxAsmError::InvalidAsset(format!(
                        "{} is not a {} code",
                        code, asset_type
                    )));
                }
                Ok(asset)
            }
            _ => Err(TxAsmError::InvalidAsset(format!(
                "incomplete {} description",
                asset_type
            ))),
        }
    }

    /// Query parameters describing this asset, with an optional prefix
    /// such as `selling_` or `destination_`
    pub fn query_params(&self, prefix: &str) -> Vec<(String, String)> {
        let mut params = vec![(
            format!("{}asset_type", prefix),
            self.asset_type().as_str().to_string(),
        )];
        if let Asset::Credit { code, issuer } = self {
            params.push((format!("{}asset_code", prefix), code.to_string()));
            params.push((format!("{}asset_issuer", prefix), issuer.to_string()));
        }
        params
    }
}

/// Encode an asset to its wire form
pub fn encode_asset(asset: &Asset) -> Result<Vec<u8>> {
    asset.to_xdr()
}

/// Decode an asset from its wire form
pub fn decode_asset(bytes: &[u8]) -> Result<Asset> {
    Asset::from_xdr(bytes)
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Credit { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

impl FromStr for Asset {
    type Err = TxAsmError;

    /// Parses `native` or `CODE:ISSUER`
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("native") {
            return Ok(Asset::Native);
        }
        match s.split_once(':') {
            Some((code, issuer)) => Asset::credit(code, issuer.parse()?),
            None => Err(TxAsmError::InvalidAsset(format!(
                "{} is neither native nor CODE:ISSUER",
                s
            ))),
        }
    }
}

impl ByteSerialize for Asset {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        match self {
            Asset::Native => encode_u32(AssetType::Native as u32, writer),
            Asset::Credit { code, issuer } => {
                code.encode_padded(writer)?;
                issuer.serialize_bytes(writer)
            }
        }
    }
}

impl ByteDeserialize for Asset {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        match AssetType::from_u32(decode_u32(cursor)?)? {
            AssetType::Native => Ok(Asset::Native),
            asset_type => {
                let code = AssetCode::decode_padded(asset_type, cursor)?;
                let issuer = AccountId::deserialize_bytes(cursor)?;
                Ok(Asset::Credit { code, issuer })
            }
        }
    }
}
