//! Typed query records

use crate::amount::{Amount, Price};
use crate::asset::Asset;
use crate::error::{Result, TxAsmError};
use crate::keys::AccountId;
use crate::memo::Memo;
use crate::operation::OperationType;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Integers Horizon may send either as JSON numbers or decimal strings
mod flexible_int {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

fn flexible_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    let value = flexible_int::deserialize(deserializer)?;
    u64::try_from(value).map_err(serde::de::Error::custom)
}

/// `asset_type`/`asset_code`/`asset_issuer` triple
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRef {
    pub asset_type: String,
    pub asset_code: Option<String>,
    pub asset_issuer: Option<String>,
}

impl AssetRef {
    pub fn to_asset(&self) -> Result<Asset> {
        Asset::from_parts(
            &self.asset_type,
            self.asset_code.as_deref(),
            self.asset_issuer.as_deref(),
        )
    }
}

/// Rational price as sent by the query API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PriceRecord {
    pub n: i32,
    pub d: i32,
}

impl PriceRecord {
    pub fn to_price(self) -> Result<Price> {
        Price::new(self.n, self.d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Thresholds {
    pub low_threshold: u8,
    pub med_threshold: u8,
    pub high_threshold: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct AccountFlags {
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default)]
    pub auth_revocable: bool,
    #[serde(default)]
    pub auth_immutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub balance: Amount,
    pub limit: Option<Amount>,
    #[serde(flatten)]
    pub asset: AssetRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountSigner {
    #[serde(default)]
    pub public_key: Option<String>,
    pub key: String,
    pub weight: u32,
    #[serde(rename = "type")]
    pub signer_type: String,
}

/// Ledger state of an account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    #[serde(default)]
    pub paging_token: String,
    #[serde(deserialize_with = "flexible_int::deserialize")]
    pub sequence: i64,
    pub subentry_count: u32,
    #[serde(default)]
    pub inflation_destination: Option<String>,
    #[serde(default)]
    pub home_domain: Option<String>,
    pub thresholds: Thresholds,
    pub flags: AccountFlags,
    pub balances: Vec<Balance>,
    pub signers: Vec<AccountSigner>,
    /// Data entries, base64 encoded
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl AccountRecord {
    /// Decoded value of a data entry
    pub fn data_value(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.data
            .get(key)
            .map(|value| STANDARD.decode(value).map_err(TxAsmError::from))
            .transpose()
    }

    /// Balance held in `asset`, if the account holds it
    pub fn balance_of(&self, asset: &Asset) -> Option<Amount> {
        self.balances
            .iter()
            .find(|b| b.asset.to_asset().map_or(false, |a| &a == asset))
            .map(|b| b.balance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub paging_token: String,
    pub hash: String,
    #[serde(deserialize_with = "flexible_u64")]
    pub ledger: u64,
    pub created_at: DateTime<Utc>,
    pub source_account: AccountId,
    #[serde(deserialize_with = "flexible_int::deserialize")]
    pub source_account_sequence: i64,
    #[serde(deserialize_with = "flexible_u64")]
    pub fee_paid: u64,
    pub operation_count: u32,
    pub memo_type: String,
    #[serde(default)]
    pub memo: Option<String>,
}

impl TransactionRecord {
    /// Rebuild the memo from its query representation
    pub fn memo(&self) -> Result<Memo> {
        let value = || {
            self.memo
                .as_deref()
                .ok_or_else(|| TxAsmError::InvalidMemo(format!("{} memo without value", self.memo_type)))
        };
        let hash = |text: &str| -> Result<[u8; 32]> {
            let bytes = STANDARD.decode(text)?;
            <[u8; 32]>::try_from(bytes.as_slice())
                .map_err(|_| TxAsmError::InvalidMemo(format!("hash of {} bytes", bytes.len())))
        };
        match self.memo_type.as_str() {
            "none" => Ok(Memo::None),
            "text" => Memo::text(value()?),
            "id" => value()?
                .parse()
                .map(Memo::Id)
                .map_err(|_| TxAsmError::InvalidMemo(format!("bad id memo {:?}", self.memo))),
            "hash" => Ok(Memo::Hash(hash(value()?)?)),
            "return" => Ok(Memo::Return(hash(value()?)?)),
            other => Err(TxAsmError::InvalidMemo(format!("unknown memo type {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerRecord {
    pub id: String,
    pub paging_token: String,
    pub hash: String,
    #[serde(default)]
    pub prev_hash: Option<String>,
    pub sequence: u64,
    pub transaction_count: u32,
    pub operation_count: u32,
    pub closed_at: DateTime<Utc>,
    pub total_coins: Amount,
    pub fee_pool: Amount,
    pub base_fee: u32,
    pub base_reserve: String,
    pub max_tx_set_size: u32,
}

/// An operation as recorded on the ledger; kind-specific fields stay in
/// `details`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationRecord {
    pub id: String,
    pub paging_token: String,
    pub source_account: AccountId,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_i: u32,
    pub created_at: DateTime<Utc>,
    pub transaction_hash: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl OperationRecord {
    pub fn operation_type(&self) -> Result<OperationType> {
        OperationType::from_u32(self.type_i)
    }

    pub fn detail(&self, name: &str) -> Option<&str> {
        self.details.get(name).and_then(|v| v.as_str())
    }

    /// Asset described by `{prefix}asset_type` and friends
    pub fn asset(&self, prefix: &str) -> Result<Asset> {
        let field = |name: &str| self.detail(&format!("{}{}", prefix, name));
        let asset_type = field("asset_type").ok_or_else(|| {
            TxAsmError::InvalidAsset(format!("operation {} has no {}asset_type", self.id, prefix))
        })?;
        Asset::from_parts(asset_type, field("asset_code"), field("asset_issuer"))
    }
}

/// Value moved by a payment-like operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub destination: AccountId,
    pub amount: Amount,
    pub asset: Asset,
}

/// Payments share the operation record layout
pub type PaymentRecord = OperationRecord;

impl OperationRecord {
    /// Destination, amount and asset of a create-account or payment record
    pub fn transfer(&self) -> Result<Transfer> {
        let required = |name: &str| {
            self.detail(name).ok_or_else(|| {
                TxAsmError::DeserializationError(format!("payment {} has no {}", self.id, name))
            })
        };
        if self.type_i == OperationType::CreateAccount as u32 {
            return Ok(Transfer {
                destination: required("account")?.parse()?,
                amount: required("starting_balance")?.parse()?,
                asset: Asset::Native,
            });
        }
        Ok(Transfer {
            destination: required("to")?.parse()?,
            amount: required("amount")?.parse()?,
            asset: self.asset("")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectRecord {
    pub id: String,
    pub paging_token: String,
    pub account: AccountId,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_i: u32,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfferRecord {
    #[serde(deserialize_with = "flexible_u64")]
    pub id: u64,
    pub paging_token: String,
    pub seller: AccountId,
    pub selling: AssetRef,
    pub buying: AssetRef,
    pub amount: Amount,
    pub price_r: PriceRecord,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderBookLevel {
    pub price_r: PriceRecord,
    pub price: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderBook {
    pub base: AssetRef,
    pub counter: AssetRef,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub paging_token: String,
    pub ledger_close_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_u64")]
    pub offer_id: u64,
    pub base_account: AccountId,
    pub base_amount: Amount,
    pub base_asset_type: String,
    pub base_asset_code: Option<String>,
    pub base_asset_issuer: Option<String>,
    pub counter_account: AccountId,
    pub counter_amount: Amount,
    pub counter_asset_type: String,
    pub counter_asset_code: Option<String>,
    pub counter_asset_issuer: Option<String>,
    pub base_is_seller: bool,
    pub price: PriceRecord,
}

impl TradeRecord {
    pub fn base_asset(&self) -> Result<Asset> {
        Asset::from_parts(
            &self.base_asset_type,
            self.base_asset_code.as_deref(),
            self.base_asset_issuer.as_deref(),
        )
    }

    pub fn counter_asset(&self) -> Result<Asset> {
        Asset::from_parts(
            &self.counter_asset_type,
            self.counter_asset_code.as_deref(),
            self.counter_asset_issuer.as_deref(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRecord {
    #[serde(flatten)]
    pub asset: AssetRef,
    pub paging_token: String,
    pub num_accounts: u64,
    pub amount: Amount,
    pub flags: AccountFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentPath {
    pub source_asset_type: String,
    pub source_asset_code: Option<String>,
    pub source_asset_issuer: Option<String>,
    pub source_amount: Amount,
    pub destination_asset_type: String,
    pub destination_asset_code: Option<String>,
    pub destination_asset_issuer: Option<String>,
    pub destination_amount: Amount,
    pub path: Vec<AssetRef>,
}

impl PaymentPath {
    pub fn source_asset(&self) -> Result<Asset> {
        Asset::from_parts(
            &self.source_asset_type,
            self.source_asset_code.as_deref(),
            self.source_asset_issuer.as_deref(),
        )
    }

    pub fn destination_asset(&self) -> Result<Asset> {
        Asset::from_parts(
            &self.destination_asset_type,
            self.destination_asset_code.as_deref(),
            self.destination_asset_issuer.as_deref(),
        )
    }

    /// Intermediate assets in conversion order
    pub fn hops(&self) -> Result<Vec<Asset>> {
        self.path.iter().map(AssetRef::to_asset).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ACCOUNT: &str = "GDZ4R34MNVITLNZ4KVKBEANJU3UZZFZZLOX7ZVU5AWI7FEL5A6JWDM24";
    const ISSUER: &str = "GDUWG5CZ6YJNWOPQB33DOKWVWSNHJAWPWOUNAEBVTM7QRJ66NGFYEFAJ";

    #[test]
    fn test_account_record() {
        let record: AccountRecord = serde_json::from_value(json!({
            "id": ACCOUNT,
            "paging_token": "",
            "account_id": ACCOUNT,
            "sequence": "28551671273488385",
            "subentry_count": 5,
            "inflation_destination": "GCCD6AJOYZCUAQLX32ZJF2MKFFAUJ53PVCFQI3RHWKL3V47QYE2BNAUT",
            "thresholds": {"low_threshold": 1, "med_threshold": 2, "high_threshold": 3},
            "flags": {"auth_required": true, "auth_revocable": false},
            "balances": [
                {
                    "balance": "42.0000001",
                    "limit": "1000.0000000",
                    "asset_type": "credit_alphanum4",
                    "asset_code": "USD",
                    "asset_issuer": ISSUER
                },
                {"balance": "9999.9999900", "asset_type": "native"}
            ],
            "signers": [
                {"public_key": ACCOUNT, "weight": 42, "key": ACCOUNT, "type": "ed25519_public_key"},
                {
                    "public_key": "TABGNX36UIFE5JCVFIFUAT2FIHU7TKF2LRJKOARTPFWWNFRYM5MHH5B3",
                    "weight": 43,
                    "key": "TABGNX36UIFE5JCVFIFUAT2FIHU7TKF2LRJKOARTPFWWNFRYM5MHH5B3",
                    "type": "preauth_tx"
                }
            ],
            "data": {"image_link": "aHR0cDovL2JpdC5seS8yRkFKc0ow"}
        }))
        .unwrap();

        assert_eq!(record.sequence, 28551671273488385);
        assert_eq!(record.thresholds.med_threshold, 2);
        assert!(record.flags.auth_required);
        assert_eq!(record.signers[1].weight, 43);
        assert_eq!(
            record.data_value("image_link").unwrap().unwrap(),
            b"http://bit.ly/2FAJsJ0".to_vec()
        );
        assert_eq!(record.balance_of(&Asset::Native).unwrap().to_string(), "9999.9999900");
        let usd = Asset::credit("USD", ISSUER.parse().unwrap()).unwrap();
        assert_eq!(record.balance_of(&usd).unwrap().stroops(), 420_000_001);
    }

    #[test]
    fn test_transaction_record_memo() {
        let record: TransactionRecord = serde_json::from_value(json!({
            "id": "4986e01e14f60050c99038153362a1a9d72408a67b3da7d9642f9ae3f0255e5b",
            "paging_token": "64034663848484864",
            "hash": "4986e01e14f60050c99038153362a1a9d72408a67b3da7d9642f9ae3f0255e5b",
            "ledger": 14909232,
            "created_at": "2017-12-05T10:43:13Z",
            "source_account": ACCOUNT,
            "source_account_sequence": "48388037859606661",
            "fee_paid": 200,
            "operation_count": 1,
            "memo_type": "text",
            "memo": "Have a nice day!"
        }))
        .unwrap();
        assert_eq!(record.ledger, 14909232);
        assert_eq!(record.memo().unwrap(), Memo::text("Have a nice day!").unwrap());
        assert_eq!(record.created_at.timestamp(), 1512470593);
    }

    #[test]
    fn test_payment_transfer() {
        let create: PaymentRecord = serde_json::from_value(json!({
            "id": "1", "paging_token": "1", "source_account": ISSUER,
            "type": "create_account", "type_i": 0,
            "created_at": "2018-01-13T06:28:58Z", "transaction_hash": "aa",
            "account": ACCOUNT, "funder": ISSUER, "starting_balance": "100.0000000"
        }))
        .unwrap();
        let transfer = create.transfer().unwrap();
        assert_eq!(transfer.asset, Asset::Native);
        assert_eq!(transfer.amount.to_string(), "100.0000000");

        let pay: PaymentRecord = serde_json::from_value(json!({
            "id": "2", "paging_token": "2", "source_account": ISSUER,
            "type": "payment", "type_i": 1,
            "created_at": "2018-01-13T06:28:58Z", "transaction_hash": "bb",
            "asset_type": "credit_alphanum4", "asset_code": "CODR", "asset_issuer": ISSUER,
            "from": ISSUER, "to": ACCOUNT, "amount": "5.5000000"
        }))
        .unwrap();
        assert_eq!(pay.operation_type().unwrap(), OperationType::Payment);
        let transfer = pay.transfer().unwrap();
        assert_eq!(transfer.destination.to_string(), ACCOUNT);
        assert_eq!(transfer.asset.code().unwrap().as_str(), "CODR");
    }

    #[test]
    fn test_offer_and_path_records() {
        let offer: OfferRecord = serde_json::from_value(json!({
            "id": "12321", "paging_token": "12321", "seller": ACCOUNT,
            "selling": {"asset_type": "native"},
            "buying": {"asset_type": "credit_alphanum4", "asset_code": "USD", "asset_issuer": ISSUER},
            "amount": "27.0000000", "price_r": {"n": 11, "d": 1}, "price": "11.0000000"
        }))
        .unwrap();
        assert_eq!(offer.id, 12321);
        assert_eq!(offer.price_r.to_price().unwrap(), Price::new(11, 1).unwrap());
        assert!(offer.buying.to_asset().unwrap().issuer().is_some());

        let path: PaymentPath = serde_json::from_value(json!({
            "source_asset_type": "native",
            "source_amount": "10.1000000",
            "destination_asset_type": "credit_alphanum4",
            "destination_asset_code": "USD",
            "destination_asset_issuer": ISSUER,
            "destination_amount": "10.0000000",
            "path": [{"asset_type": "credit_alphanum12", "asset_code": "COOLUSD", "asset_issuer": ISSUER}]
        }))
        .unwrap();
        assert!(path.source_asset().unwrap().is_native());
        assert_eq!(path.hops().unwrap().len(), 1);
    }
}
