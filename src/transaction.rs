//! Transaction assembly, hashing and signing
//!
//! A [`TransactionBuilder`] accumulates operations without touching the
//! network. Building it yields a [`Transaction`] whose canonical bytes are
//! hashed together with the network id and signed by every signer, in
//! signer order, producing a [`TransactionEnvelope`].
//!
//! ```text
//! signing hash = SHA256(network_id || ENVELOPE_TYPE_TX || transaction bytes)
//! ```

use crate::amount::{Amount, Price};
use crate::asset::{Asset, AssetCode};
use crate::error::{Result, TxAsmError};
use crate::fee_calculator::FeeCalculator;
use crate::keys::{AccountId, KeyPair};
use crate::memo::Memo;
use crate::network::NetworkConfig;
use crate::operation::{AuthFlags, Operation, SignerKey};
use crate::serialization::helpers::{deserialize_optional, deserialize_vec, serialize_optional, serialize_vec};
use crate::serialization::{
    decode_fixed_opaque, decode_i64, decode_u32, decode_u64, decode_var_opaque,
    encode_fixed_opaque, encode_i64, encode_u32, encode_u64, encode_var_opaque,
};
use crate::serialization::{ByteDeserialize, ByteSerialize};
use crate::set_options::SetOptionsBuilder;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use tracing::debug;

/// Envelope type discriminator mixed into the signing hash
pub const ENVELOPE_TYPE_TX: u32 = 2;
/// Most operations a transaction may carry
pub const MAX_OPERATIONS: usize = 100;
/// Most signatures an envelope may carry
pub const MAX_SIGNATURES: usize = 20;

/// Validity window in unix seconds; `max_time == 0` means no upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    pub fn new(min_time: u64, max_time: u64) -> Result<Self> {
        if max_time != 0 && max_time < min_time {
            return Err(TxAsmError::InvalidTransaction(format!(
                "time bounds end {} before they start {}",
                max_time, min_time
            )));
        }
        Ok(Self { min_time, max_time })
    }

    /// Valid from now until `deadline`
    pub fn until(deadline: DateTime<Utc>) -> Result<Self> {
        let to_secs = |at: DateTime<Utc>| {
            u64::try_from(at.timestamp()).map_err(|_| {
                TxAsmError::InvalidTransaction(format!("{} is before the unix epoch", at))
            })
        };
        Self::new(to_secs(Utc::now())?, to_secs(deadline)?)
    }
}

impl ByteSerialize for TimeBounds {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_u64(self.min_time, writer)?;
        encode_u64(self.max_time, writer)
    }
}

impl ByteDeserialize for TimeBounds {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(TimeBounds {
            min_time: decode_u64(cursor)?,
            max_time: decode_u64(cursor)?,
        })
    }
}

/// A signature tagged with the last four bytes of the signer's key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: [u8; 64],
}

impl ByteSerialize for DecoratedSignature {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_fixed_opaque(&self.hint, writer)?;
        encode_var_opaque(&self.signature, 64, writer)
    }
}

impl ByteDeserialize for DecoratedSignature {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let hint = decode_fixed_opaque::<4>(cursor)?;
        let bytes = decode_var_opaque(cursor, 64)?;
        let signature = <[u8; 64]>::try_from(bytes.as_slice()).map_err(|_| {
            TxAsmError::DeserializationError(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(DecoratedSignature { hint, signature })
    }
}

/// A finalized, unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source_account: AccountId,
    pub fee: u32,
    pub sequence: i64,
    pub time_bounds: Option<TimeBounds>,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

impl Transaction {
    /// Bytes whose SHA-256 is signed: network id, envelope type, transaction
    pub fn signature_base(&self, network: &NetworkConfig) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        encode_fixed_opaque(network.network_id(), &mut bytes)?;
        encode_u32(ENVELOPE_TYPE_TX, &mut bytes)?;
        self.serialize_bytes(&mut bytes)?;
        Ok(bytes)
    }

    /// Network-scoped transaction hash
    pub fn hash(&self, network: &NetworkConfig) -> Result<[u8; 32]> {
        Ok(Sha256::digest(self.signature_base(network)?).into())
    }

    /// Sign with every key in order, producing the envelope
    pub fn sign(&self, network: &NetworkConfig, signers: &[KeyPair]) -> Result<TransactionEnvelope> {
        if signers.is_empty() {
            return Err(TxAsmError::MissingSigner(self.source_account.to_string()));
        }
        let mut envelope = TransactionEnvelope::new(self.clone());
        let hash = self.hash(network)?;
        for signer in signers {
            envelope.add_signature(&hash, signer)?;
        }
        debug!(
            hash = %hex::encode(hash),
            signatures = envelope.signatures.len(),
            "signed transaction"
        );
        Ok(envelope)
    }
}

impl ByteSerialize for Transaction {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        if self.operations.len() > MAX_OPERATIONS {
            return Err(TxAsmError::InvalidTransaction(format!(
                "{} operations exceed the limit of {}",
                self.operations.len(),
                MAX_OPERATIONS
            )));
        }
        self.source_account.serialize_bytes(writer)?;
        encode_u32(self.fee, writer)?;
        encode_i64(self.sequence, writer)?;
        serialize_optional(self.time_bounds.as_ref(), writer)?;
        self.memo.serialize_bytes(writer)?;
        serialize_vec(&self.operations, writer)?;
        // reserved extension
        encode_u32(0, writer)
    }
}

impl ByteDeserialize for Transaction {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let source_account = AccountId::deserialize_bytes(cursor)?;
        let fee = decode_u32(cursor)?;
        let sequence = decode_i64(cursor)?;
        let time_bounds = deserialize_optional(cursor)?;
        let memo = Memo::deserialize_bytes(cursor)?;
        let operations = deserialize_vec(cursor, MAX_OPERATIONS)?;
        let ext = decode_u32(cursor)?;
        if ext != 0 {
            return Err(TxAsmError::DeserializationError(format!(
                "Unknown transaction extension {}",
                ext
            )));
        }
        Ok(Transaction {
            source_account,
            fee,
            sequence,
            time_bounds,
            memo,
            operations,
        })
    }
}

/// A transaction with its ordered signatures; the unit that is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    /// Append a signature over an already computed transaction hash
    fn add_signature(&mut self, hash: &[u8; 32], signer: &KeyPair) -> Result<()> {
        if self.signatures.len() >= MAX_SIGNATURES {
            return Err(TxAsmError::SignatureError(format!(
                "envelope already carries {} signatures",
                MAX_SIGNATURES
            )));
        }
        self.signatures.push(DecoratedSignature {
            hint: signer.signature_hint(),
            signature: signer.sign(hash),
        });
        Ok(())
    }

    /// Append one more signature
    pub fn sign(&mut self, network: &NetworkConfig, signer: &KeyPair) -> Result<()> {
        let hash = self.tx.hash(network)?;
        self.add_signature(&hash, signer)
    }

    pub fn hash(&self, network: &NetworkConfig) -> Result<[u8; 32]> {
        self.tx.hash(network)
    }

    /// True if some signature with a matching hint verifies for `account`
    pub fn is_signed_by(&self, network: &NetworkConfig, account: &AccountId) -> Result<bool> {
        let hash = self.tx.hash(network)?;
        let hint = account.signature_hint();
        Ok(self
            .signatures
            .iter()
            .any(|sig| sig.hint == hint && account.verify(&hash, &sig.signature)))
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_xdr()?))
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = STANDARD.decode(text.trim())?;
        Self::from_xdr(&bytes)
    }
}

impl ByteSerialize for TransactionEnvelope {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        self.tx.serialize_bytes(writer)?;
        serialize_vec(&self.signatures, writer)
    }
}

impl ByteDeserialize for TransactionEnvelope {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let tx = Transaction::deserialize_bytes(cursor)?;
        let signatures = deserialize_vec(cursor, MAX_SIGNATURES)?;
        Ok(TransactionEnvelope { tx, signatures })
    }
}

/// Transaction builder with fluent API
///
/// Operation methods never perform I/O. Set-options calls are folded into
/// one operation that is appended after every other operation when the
/// transaction is built.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    network: NetworkConfig,
    source: AccountId,
    signers: Vec<KeyPair>,
    sequence: Option<i64>,
    fee: Option<u32>,
    memo: Memo,
    time_bounds: Option<TimeBounds>,
    operations: Vec<Operation>,
    set_options: SetOptionsBuilder,
    fee_calculator: FeeCalculator,
}

impl TransactionBuilder {
    /// A transaction signed by the source account's own key
    pub fn new(keypair: KeyPair, network: NetworkConfig) -> Self {
        Self {
            network,
            source: keypair.account_id(),
            signers: vec![keypair],
            sequence: None,
            fee: None,
            memo: Memo::None,
            time_bounds: None,
            operations: Vec::new(),
            set_options: SetOptionsBuilder::new(),
            fee_calculator: FeeCalculator::new(),
        }
    }

    /// A transaction on `source` signed by external signers
    pub fn with_signers(source: AccountId, signers: Vec<KeyPair>, network: NetworkConfig) -> Result<Self> {
        if signers.is_empty() {
            return Err(TxAsmError::MissingSigner(source.to_string()));
        }
        let mut builder = Self::new(signers[0].clone(), network);
        builder.source = source;
        builder.signers = signers;
        Ok(builder)
    }

    /// Accepts an `S...` seed (its own signer unless `signers` is given)
    /// or a `G...` account id (which requires `signers`)
    pub fn from_source(source: &str, signers: Vec<KeyPair>, network: NetworkConfig) -> Result<Self> {
        if source.starts_with('S') {
            let keypair = KeyPair::from_secret_seed(source)?;
            if signers.is_empty() {
                return Ok(Self::new(keypair, network));
            }
            return Self::with_signers(keypair.account_id(), signers, network);
        }
        Self::with_signers(source.parse()?, signers, network)
    }

    pub fn source(&self) -> &AccountId {
        &self.source
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// True when building needs the account's current sequence number
    pub fn needs_sequence(&self) -> bool {
        self.sequence.is_none()
    }

    /// Use this exact sequence number instead of fetching one
    pub fn sequence(&mut self, sequence: i64) -> &mut Self {
        self.sequence = Some(sequence);
        self
    }

    /// Use this exact fee instead of the per-operation default
    pub fn fee(&mut self, fee: u32) -> &mut Self {
        self.fee = Some(fee);
        self
    }

    pub fn fee_calculator(&mut self, calculator: FeeCalculator) -> &mut Self {
        self.fee_calculator = calculator;
        self
    }

    pub fn memo(&mut self, memo: Memo) -> &mut Self {
        self.memo = memo;
        self
    }

    pub fn time_bounds(&mut self, time_bounds: TimeBounds) -> &mut Self {
        self.time_bounds = Some(time_bounds);
        self
    }

    /// Append a pre-built operation, attributing it to the source account
    pub fn add_operation(&mut self, mut operation: Operation) -> &mut Self {
        if operation.source_account.is_none() {
            operation.source_account = Some(self.source);
        }
        self.operations.push(operation);
        self
    }

    pub fn create_account(&mut self, destination: AccountId, starting_balance: Amount) -> &mut Self {
        self.add_operation(Operation::create_account(destination, starting_balance))
    }

    pub fn pay(&mut self, destination: AccountId, amount: Amount, asset: Asset) -> &mut Self {
        self.add_operation(Operation::payment(destination, asset, amount))
    }

    pub fn path_pay(
        &mut self,
        destination: AccountId,
        dest_amount: Amount,
        dest_asset: Asset,
        send_max: Amount,
        send_asset: Asset,
        path: Vec<Asset>,
    ) -> Result<&mut Self> {
        let operation = Operation::path_payment(
            send_asset,
            send_max,
            destination,
            dest_asset,
            dest_amount,
            path,
        )?;
        Ok(self.add_operation(operation))
    }

    /// A new offer is an update of offer id 0
    pub fn add_offer(&mut self, amount: Amount, selling: Asset, buying: Asset, price: Price) -> &mut Self {
        self.update_offer(0, amount, selling, buying, price)
    }

    pub fn update_offer(
        &mut self,
        offer_id: u64,
        amount: Amount,
        selling: Asset,
        buying: Asset,
        price: Price,
    ) -> &mut Self {
        self.add_operation(Operation::manage_offer(selling, buying, amount, price, offer_id))
    }

    /// Cancel an offer by updating it to a zero amount at a 1:1 price
    pub fn remove_offer(&mut self, offer_id: u64, selling: Asset, buying: Asset) -> &mut Self {
        self.update_offer(offer_id, Amount::ZERO, selling, buying, Price::ONE)
    }

    pub fn add_passive_offer(
        &mut self,
        amount: Amount,
        selling: Asset,
        buying: Asset,
        price: Price,
    ) -> &mut Self {
        self.add_operation(Operation::create_passive_offer(selling, buying, amount, price))
    }

    pub fn set_inflation_destination(&mut self, account: AccountId) -> &mut Self {
        self.set_options.inflation_destination(account);
        self
    }

    pub fn set_flags(&mut self, flags: AuthFlags) -> &mut Self {
        self.set_options.set_flags(flags);
        self
    }

    pub fn clear_flags(&mut self, flags: AuthFlags) -> &mut Self {
        self.set_options.clear_flags(flags);
        self
    }

    pub fn set_thresholds(&mut self, high: Option<u8>, medium: Option<u8>, low: Option<u8>) -> &mut Self {
        self.set_options.thresholds(high, medium, low);
        self
    }

    pub fn set_master_weight(&mut self, weight: u8) -> &mut Self {
        self.set_options.master_weight(weight);
        self
    }

    pub fn set_signer(&mut self, key: SignerKey, weight: u8) -> &mut Self {
        self.set_options.signer(key, weight);
        self
    }

    pub fn set_home_domain(&mut self, domain: &str) -> Result<&mut Self> {
        self.set_options.home_domain(domain)?;
        Ok(self)
    }

    pub fn create_or_update_trust(&mut self, asset: Asset, limit: Amount) -> Result<&mut Self> {
        let operation = Operation::change_trust(asset, limit)?;
        Ok(self.add_operation(operation))
    }

    /// Drop a trustline by setting its limit to zero
    pub fn remove_trust(&mut self, asset: Asset) -> Result<&mut Self> {
        self.create_or_update_trust(asset, Amount::ZERO)
    }

    pub fn authorize_trust(&mut self, trustor: AccountId, asset_code: AssetCode) -> &mut Self {
        self.add_operation(Operation::allow_trust(trustor, asset_code, true))
    }

    pub fn deauthorize_trust(&mut self, trustor: AccountId, asset_code: AssetCode) -> &mut Self {
        self.add_operation(Operation::allow_trust(trustor, asset_code, false))
    }

    /// Merge the source account into `destination`
    pub fn merge_account(&mut self, destination: AccountId) -> &mut Self {
        self.add_operation(Operation::account_merge(destination))
    }

    pub fn run_inflation(&mut self) -> &mut Self {
        self.add_operation(Operation::inflation())
    }

    pub fn put_data(&mut self, name: &str, value: &[u8]) -> Result<&mut Self> {
        let operation = Operation::manage_data(name, Some(value))?;
        Ok(self.add_operation(operation))
    }

    pub fn remove_data(&mut self, name: &str) -> Result<&mut Self> {
        let operation = Operation::manage_data(name, None)?;
        Ok(self.add_operation(operation))
    }

    /// Operations in their final order, with pending set-options last
    pub fn finalized_operations(&self) -> Result<Vec<Operation>> {
        let mut operations = self.operations.clone();
        if let Some(set_options) = self.set_options.build()? {
            debug!(
                calls = self.set_options.calls(),
                "coalesced set-options calls into one operation"
            );
            operations.push(set_options.with_source(self.source));
        }
        Ok(operations)
    }

    /// Finalize the transaction.
    ///
    /// The sequence is the explicit one when set, otherwise
    /// `account_sequence + 1`. The fee is the explicit one when set,
    /// otherwise the base fee times the finalized operation count.
    pub fn build(&self, account_sequence: Option<i64>) -> Result<Transaction> {
        let sequence = match (self.sequence, account_sequence) {
            (Some(sequence), _) => sequence,
            (None, Some(current)) => current.checked_add(1).ok_or_else(|| {
                TxAsmError::InvalidTransaction("account sequence exhausted".to_string())
            })?,
            (None, None) => {
                return Err(TxAsmError::InvalidTransaction(
                    "no sequence number set or fetched".to_string(),
                ))
            }
        };

        let operations = self.finalized_operations()?;
        if operations.is_empty() {
            return Err(TxAsmError::InvalidTransaction(
                "No operations provided".to_string(),
            ));
        }
        if operations.len() > MAX_OPERATIONS {
            return Err(TxAsmError::InvalidTransaction(format!(
                "{} operations exceed the limit of {}",
                operations.len(),
                MAX_OPERATIONS
            )));
        }

        let fee = self.fee_calculator.estimate(self.fee, operations.len())?;
        debug!(
            source = %self.source,
            sequence,
            fee = fee.total,
            operations = operations.len(),
            "built transaction"
        );

        Ok(Transaction {
            source_account: self.source,
            fee: fee.total,
            sequence,
            time_bounds: self.time_bounds,
            memo: self.memo.clone(),
            operations,
        })
    }

    /// Build and sign with every configured signer
    pub fn build_envelope(&self, account_sequence: Option<i64>) -> Result<TransactionEnvelope> {
        self.build(account_sequence)?.sign(&self.network, &self.signers)
    }
}
