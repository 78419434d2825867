//! Ledger operations
//!
//! One constructor per operation kind. Constructors are pure: they validate
//! their parameters and return an [`Operation`] record that the transaction
//! builder appends in order. The wire layout is the operation union:
//! an optional source account, a body discriminant, then the body fields.

use crate::amount::{Amount, Price};
use crate::asset::{Asset, AssetCode};
use crate::error::{Result, TxAsmError};
use crate::keys::{decode_check, encode_check, AccountId, VersionByte};
use crate::serialization::helpers::{
    deserialize_optional, deserialize_optional_u32, deserialize_vec, serialize_optional,
    serialize_optional_u32, serialize_vec,
};
use crate::serialization::{
    decode_bool, decode_fixed_opaque, decode_string, decode_u32, decode_u64, decode_var_opaque,
    encode_bool, encode_fixed_opaque, encode_string, encode_u32, encode_u64, encode_var_opaque,
};
use crate::serialization::{ByteDeserialize, ByteSerialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Longest intermediate asset path of a path payment
pub const MAX_PATH_LENGTH: usize = 5;
/// Longest home domain in bytes
pub const MAX_HOME_DOMAIN_LEN: usize = 32;
/// Longest data entry name or value in bytes
pub const MAX_DATA_LEN: usize = 64;

/// Operation body discriminants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    CreateAccount = 0,
    Payment = 1,
    PathPayment = 2,
    ManageOffer = 3,
    CreatePassiveOffer = 4,
    SetOptions = 5,
    ChangeTrust = 6,
    AllowTrust = 7,
    AccountMerge = 8,
    Inflation = 9,
    ManageData = 10,
}

impl OperationType {
    pub fn from_u32(value: u32) -> Result<Self> {
        Ok(match value {
            0 => OperationType::CreateAccount,
            1 => OperationType::Payment,
            2 => OperationType::PathPayment,
            3 => OperationType::ManageOffer,
            4 => OperationType::CreatePassiveOffer,
            5 => OperationType::SetOptions,
            6 => OperationType::ChangeTrust,
            7 => OperationType::AllowTrust,
            8 => OperationType::AccountMerge,
            9 => OperationType::Inflation,
            10 => OperationType::ManageData,
            other => {
                return Err(TxAsmError::DeserializationError(format!(
                    "Unknown operation type {}",
                    other
                )))
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationType::CreateAccount => "create_account",
            OperationType::Payment => "payment",
            OperationType::PathPayment => "path_payment",
            OperationType::ManageOffer => "manage_offer",
            OperationType::CreatePassiveOffer => "create_passive_offer",
            OperationType::SetOptions => "set_options",
            OperationType::ChangeTrust => "change_trust",
            OperationType::AllowTrust => "allow_trust",
            OperationType::AccountMerge => "account_merge",
            OperationType::Inflation => "inflation",
            OperationType::ManageData => "manage_data",
        }
    }
}

/// Account authorization flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthFlags {
    pub required: bool,
    pub revocable: bool,
    pub immutable: bool,
}

impl AuthFlags {
    pub const AUTH_REQUIRED: u32 = 1;
    pub const AUTH_REVOCABLE: u32 = 2;
    pub const AUTH_IMMUTABLE: u32 = 4;

    pub fn new(required: bool, revocable: bool, immutable: bool) -> Self {
        Self {
            required,
            revocable,
            immutable,
        }
    }

    /// Combined bitmask, or `None` when no flag is requested
    pub fn bits(&self) -> Option<u32> {
        let mut bits = 0;
        if self.required {
            bits |= Self::AUTH_REQUIRED;
        }
        if self.revocable {
            bits |= Self::AUTH_REVOCABLE;
        }
        if self.immutable {
            bits |= Self::AUTH_IMMUTABLE;
        }
        (bits != 0).then_some(bits)
    }
}

/// Key of an additional account signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignerKey {
    Ed25519([u8; 32]),
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
}

impl SignerKey {
    fn discriminant(&self) -> u32 {
        match self {
            SignerKey::Ed25519(_) => 0,
            SignerKey::PreAuthTx(_) => 1,
            SignerKey::HashX(_) => 2,
        }
    }

    fn payload(&self) -> &[u8; 32] {
        match self {
            SignerKey::Ed25519(key) | SignerKey::PreAuthTx(key) | SignerKey::HashX(key) => key,
        }
    }
}

impl From<AccountId> for SignerKey {
    fn from(account: AccountId) -> Self {
        SignerKey::Ed25519(*account.as_bytes())
    }
}

impl FromStr for SignerKey {
    type Err = TxAsmError;

    /// Parses `G...`, `T...` or `X...` text keys
    fn from_str(s: &str) -> Result<Self> {
        match s.chars().next() {
            Some('G') => Ok(SignerKey::Ed25519(decode_check(VersionByte::AccountId, s)?)),
            Some('T') => Ok(SignerKey::PreAuthTx(decode_check(VersionByte::PreAuthTx, s)?)),
            Some('X') => Ok(SignerKey::HashX(decode_check(VersionByte::HashX, s)?)),
            _ => Err(TxAsmError::InvalidKey(format!("{} is not a signer key", s))),
        }
    }
}

impl fmt::Display for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = match self {
            SignerKey::Ed25519(_) => VersionByte::AccountId,
            SignerKey::PreAuthTx(_) => VersionByte::PreAuthTx,
            SignerKey::HashX(_) => VersionByte::HashX,
        };
        f.write_str(&encode_check(version, self.payload()))
    }
}

impl ByteSerialize for SignerKey {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_u32(self.discriminant(), writer)?;
        encode_fixed_opaque(self.payload(), writer)
    }
}

impl ByteDeserialize for SignerKey {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let discriminant = decode_u32(cursor)?;
        let payload = decode_fixed_opaque::<32>(cursor)?;
        match discriminant {
            0 => Ok(SignerKey::Ed25519(payload)),
            1 => Ok(SignerKey::PreAuthTx(payload)),
            2 => Ok(SignerKey::HashX(payload)),
            other => Err(TxAsmError::DeserializationError(format!(
                "Unknown signer key type {}",
                other
            ))),
        }
    }
}

/// A signer with its weight. Weight 0 removes the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    pub key: SignerKey,
    pub weight: u32,
}

impl ByteSerialize for Signer {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        self.key.serialize_bytes(writer)?;
        encode_u32(self.weight, writer)
    }
}

impl ByteDeserialize for Signer {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let key = SignerKey::deserialize_bytes(cursor)?;
        let weight = decode_u32(cursor)?;
        Ok(Signer { key, weight })
    }
}

/// Account option changes; every field is optional on the wire
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetOptionsOp {
    pub inflation_dest: Option<AccountId>,
    pub clear_flags: Option<u32>,
    pub set_flags: Option<u32>,
    pub master_weight: Option<u32>,
    pub low_threshold: Option<u32>,
    pub med_threshold: Option<u32>,
    pub high_threshold: Option<u32>,
    pub home_domain: Option<String>,
    pub signer: Option<Signer>,
}

impl ByteSerialize for SetOptionsOp {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        serialize_optional(self.inflation_dest.as_ref(), writer)?;
        serialize_optional_u32(self.clear_flags, writer)?;
        serialize_optional_u32(self.set_flags, writer)?;
        serialize_optional_u32(self.master_weight, writer)?;
        serialize_optional_u32(self.low_threshold, writer)?;
        serialize_optional_u32(self.med_threshold, writer)?;
        serialize_optional_u32(self.high_threshold, writer)?;
        match &self.home_domain {
            Some(domain) => {
                encode_bool(true, writer)?;
                encode_string(domain, MAX_HOME_DOMAIN_LEN, writer)?;
            }
            None => encode_bool(false, writer)?,
        }
        serialize_optional(self.signer.as_ref(), writer)
    }
}

impl ByteDeserialize for SetOptionsOp {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(SetOptionsOp {
            inflation_dest: deserialize_optional(cursor)?,
            clear_flags: deserialize_optional_u32(cursor)?,
            set_flags: deserialize_optional_u32(cursor)?,
            master_weight: deserialize_optional_u32(cursor)?,
            low_threshold: deserialize_optional_u32(cursor)?,
            med_threshold: deserialize_optional_u32(cursor)?,
            high_threshold: deserialize_optional_u32(cursor)?,
            home_domain: if decode_bool(cursor)? {
                Some(decode_string(cursor, MAX_HOME_DOMAIN_LEN)?)
            } else {
                None
            },
            signer: deserialize_optional(cursor)?,
        })
    }
}

/// The kind-specific part of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationBody {
    CreateAccount {
        destination: AccountId,
        starting_balance: Amount,
    },
    Payment {
        destination: AccountId,
        asset: Asset,
        amount: Amount,
    },
    PathPayment {
        send_asset: Asset,
        send_max: Amount,
        destination: AccountId,
        dest_asset: Asset,
        dest_amount: Amount,
        path: Vec<Asset>,
    },
    ManageOffer {
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
        offer_id: u64,
    },
    CreatePassiveOffer {
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
    },
    SetOptions(SetOptionsOp),
    ChangeTrust {
        line: Asset,
        limit: Amount,
    },
    AllowTrust {
        trustor: AccountId,
        asset_code: AssetCode,
        authorize: bool,
    },
    AccountMerge {
        destination: AccountId,
    },
    Inflation,
    ManageData {
        name: String,
        value: Option<Vec<u8>>,
    },
}

impl OperationBody {
    pub fn operation_type(&self) -> OperationType {
        match self {
            OperationBody::CreateAccount { .. } => OperationType::CreateAccount,
            OperationBody::Payment { .. } => OperationType::Payment,
            OperationBody::PathPayment { .. } => OperationType::PathPayment,
            OperationBody::ManageOffer { .. } => OperationType::ManageOffer,
            OperationBody::CreatePassiveOffer { .. } => OperationType::CreatePassiveOffer,
            OperationBody::SetOptions(_) => OperationType::SetOptions,
            OperationBody::ChangeTrust { .. } => OperationType::ChangeTrust,
            OperationBody::AllowTrust { .. } => OperationType::AllowTrust,
            OperationBody::AccountMerge { .. } => OperationType::AccountMerge,
            OperationBody::Inflation => OperationType::Inflation,
            OperationBody::ManageData { .. } => OperationType::ManageData,
        }
    }
}

impl ByteSerialize for OperationBody {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_u32(self.operation_type() as u32, writer)?;
        match self {
            OperationBody::CreateAccount {
                destination,
                starting_balance,
            } => {
                destination.serialize_bytes(writer)?;
                starting_balance.serialize_bytes(writer)
            }
            OperationBody::Payment {
                destination,
                asset,
                amount,
            } => {
                destination.serialize_bytes(writer)?;
                asset.serialize_bytes(writer)?;
                amount.serialize_bytes(writer)
            }
            OperationBody::PathPayment {
                send_asset,
                send_max,
                destination,
                dest_asset,
                dest_amount,
                path,
            } => {
                send_asset.serialize_bytes(writer)?;
                send_max.serialize_bytes(writer)?;
                destination.serialize_bytes(writer)?;
                dest_asset.serialize_bytes(writer)?;
                dest_amount.serialize_bytes(writer)?;
                serialize_vec(path, writer)
            }
            OperationBody::ManageOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => {
                selling.serialize_bytes(writer)?;
                buying.serialize_bytes(writer)?;
                amount.serialize_bytes(writer)?;
                price.serialize_bytes(writer)?;
                encode_u64(*offer_id, writer)
            }
            OperationBody::CreatePassiveOffer {
                selling,
                buying,
                amount,
                price,
            } => {
                selling.serialize_bytes(writer)?;
                buying.serialize_bytes(writer)?;
                amount.serialize_bytes(writer)?;
                price.serialize_bytes(writer)
            }
            OperationBody::SetOptions(options) => options.serialize_bytes(writer),
            OperationBody::ChangeTrust { line, limit } => {
                line.serialize_bytes(writer)?;
                limit.serialize_bytes(writer)
            }
            OperationBody::AllowTrust {
                trustor,
                asset_code,
                authorize,
            } => {
                trustor.serialize_bytes(writer)?;
                asset_code.serialize_bytes(writer)?;
                encode_bool(*authorize, writer)
            }
            OperationBody::AccountMerge { destination } => destination.serialize_bytes(writer),
            OperationBody::Inflation => Ok(()),
            OperationBody::ManageData { name, value } => {
                encode_string(name, MAX_DATA_LEN, writer)?;
                match value {
                    Some(value) => {
                        encode_bool(true, writer)?;
                        encode_var_opaque(value, MAX_DATA_LEN, writer)
                    }
                    None => encode_bool(false, writer),
                }
            }
        }
    }
}

impl ByteDeserialize for OperationBody {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let body = match OperationType::from_u32(decode_u32(cursor)?)? {
            OperationType::CreateAccount => OperationBody::CreateAccount {
                destination: AccountId::deserialize_bytes(cursor)?,
                starting_balance: Amount::deserialize_bytes(cursor)?,
            },
            OperationType::Payment => OperationBody::Payment {
                destination: AccountId::deserialize_bytes(cursor)?,
                asset: Asset::deserialize_bytes(cursor)?,
                amount: Amount::deserialize_bytes(cursor)?,
            },
            OperationType::PathPayment => OperationBody::PathPayment {
                send_asset: Asset::deserialize_bytes(cursor)?,
                send_max: Amount::deserialize_bytes(cursor)?,
                destination: AccountId::deserialize_bytes(cursor)?,
                dest_asset: Asset::deserialize_bytes(cursor)?,
                dest_amount: Amount::deserialize_bytes(cursor)?,
                path: deserialize_vec(cursor, MAX_PATH_LENGTH)?,
            },
            OperationType::ManageOffer => OperationBody::ManageOffer {
                selling: Asset::deserialize_bytes(cursor)?,
                buying: Asset::deserialize_bytes(cursor)?,
                amount: Amount::deserialize_bytes(cursor)?,
                price: Price::deserialize_bytes(cursor)?,
                offer_id: decode_u64(cursor)?,
            },
            OperationType::CreatePassiveOffer => OperationBody::CreatePassiveOffer {
                selling: Asset::deserialize_bytes(cursor)?,
                buying: Asset::deserialize_bytes(cursor)?,
                amount: Amount::deserialize_bytes(cursor)?,
                price: Price::deserialize_bytes(cursor)?,
            },
            OperationType::SetOptions => {
                OperationBody::SetOptions(SetOptionsOp::deserialize_bytes(cursor)?)
            }
            OperationType::ChangeTrust => OperationBody::ChangeTrust {
                line: Asset::deserialize_bytes(cursor)?,
                limit: Amount::deserialize_bytes(cursor)?,
            },
            OperationType::AllowTrust => OperationBody::AllowTrust {
                trustor: AccountId::deserialize_bytes(cursor)?,
                asset_code: AssetCode::deserialize_bytes(cursor)?,
                authorize: decode_bool(cursor)?,
            },
            OperationType::AccountMerge => OperationBody::AccountMerge {
                destination: AccountId::deserialize_bytes(cursor)?,
            },
            OperationType::Inflation => OperationBody::Inflation,
            OperationType::ManageData => {
                let name = decode_string(cursor, MAX_DATA_LEN)?;
                let value = if decode_bool(cursor)? {
                    Some(decode_var_opaque(cursor, MAX_DATA_LEN)?)
                } else {
                    None
                };
                OperationBody::ManageData { name, value }
            }
        };
        Ok(body)
    }
}

/// A single ledger operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Account the operation acts on; the transaction source when `None`
    pub source_account: Option<AccountId>,
    pub body: OperationBody,
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }

    /// Attribute the operation to an explicit source account
    pub fn with_source(mut self, source: AccountId) -> Self {
        self.source_account = Some(source);
        self
    }

    pub fn operation_type(&self) -> OperationType {
        self.body.operation_type()
    }

    pub fn create_account(destination: AccountId, starting_balance: Amount) -> Self {
        Self::new(OperationBody::CreateAccount {
            destination,
            starting_balance,
        })
    }

    pub fn payment(destination: AccountId, asset: Asset, amount: Amount) -> Self {
        Self::new(OperationBody::Payment {
            destination,
            asset,
            amount,
        })
    }

    /// Pay `dest_amount` of `dest_asset`, spending at most `send_max` of
    /// `send_asset`, converting through up to five intermediate assets
    pub fn path_payment(
        send_asset: Asset,
        send_max: Amount,
        destination: AccountId,
        dest_asset: Asset,
        dest_amount: Amount,
        path: Vec<Asset>,
    ) -> Result<Self> {
        if path.len() > MAX_PATH_LENGTH {
            return Err(TxAsmError::InvalidOperation(format!(
                "path of {} assets exceeds {}",
                path.len(),
                MAX_PATH_LENGTH
            )));
        }
        Ok(Self::new(OperationBody::PathPayment {
            send_asset,
            send_max,
            destination,
            dest_asset,
            dest_amount,
            path,
        }))
    }

    /// Create (`offer_id == 0`), update or, with a zero amount, delete an offer
    pub fn manage_offer(
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
        offer_id: u64,
    ) -> Self {
        Self::new(OperationBody::ManageOffer {
            selling,
            buying,
            amount,
            price,
            offer_id,
        })
    }

    pub fn create_passive_offer(selling: Asset, buying: Asset, amount: Amount, price: Price) -> Self {
        Self::new(OperationBody::CreatePassiveOffer {
            selling,
            buying,
            amount,
            price,
        })
    }

    pub fn set_options(options: SetOptionsOp) -> Result<Self> {
        if let Some(domain) = &options.home_domain {
            check_home_domain(domain)?;
        }
        Ok(Self::new(OperationBody::SetOptions(options)))
    }

    /// Create, update or, with a zero limit, remove a trustline
    pub fn change_trust(line: Asset, limit: Amount) -> Result<Self> {
        if line.is_native() {
            return Err(TxAsmError::InvalidOperation(
                "cannot change trust in the native asset".to_string(),
            ));
        }
        Ok(Self::new(OperationBody::ChangeTrust { line, limit }))
    }

    pub fn allow_trust(trustor: AccountId, asset_code: AssetCode, authorize: bool) -> Self {
        Self::new(OperationBody::AllowTrust {
            trustor,
            asset_code,
            authorize,
        })
    }

    pub fn account_merge(destination: AccountId) -> Self {
        Self::new(OperationBody::AccountMerge { destination })
    }

    pub fn inflation() -> Self {
        Self::new(OperationBody::Inflation)
    }

    /// Put a data entry, or remove it when `value` is `None`
    pub fn manage_data(name: &str, value: Option<&[u8]>) -> Result<Self> {
        if name.is_empty() || name.len() > MAX_DATA_LEN {
            return Err(TxAsmError::InvalidOperation(format!(
                "data name must be 1 to {} bytes",
                MAX_DATA_LEN
            )));
        }
        if let Some(value) = value {
            if value.len() > MAX_DATA_LEN {
                return Err(TxAsmError::InvalidOperation(format!(
                    "data value of {} bytes exceeds {}",
                    value.len(),
                    MAX_DATA_LEN
                )));
            }
        }
        Ok(Self::new(OperationBody::ManageData {
            name: name.to_string(),
            value: value.map(<[u8]>::to_vec),
        }))
    }
}

pub(crate) fn check_home_domain(domain: &str) -> Result<()> {
    if domain.len() > MAX_HOME_DOMAIN_LEN {
        return Err(TxAsmError::InvalidOperation(format!(
            "home domain of {} bytes exceeds {}",
            domain.len(),
            MAX_HOME_DOMAIN_LEN
        )));
    }
    Ok(())
}

impl ByteSerialize for Operation {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        serialize_optional(self.source_account.as_ref(), writer)?;
        self.body.serialize_bytes(writer)
    }
}

impl ByteDeserialize for Operation {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let source_account = deserialize_optional(cursor)?;
        let body = OperationBody::deserialize_bytes(cursor)?;
        Ok(Operation {
            source_account,
            body,
        })
    }
}
