//! # Key Codec
//!
//! Checksummed text encoding of account ids and secret seeds, plus the
//! Ed25519 keypair wrapper used to sign transaction hashes.
//!
//! A text key is the RFC4648 base32 encoding (no padding) of
//! `[version byte][32-byte payload][CRC16/XMODEM, little-endian]`, which is
//! always 56 characters long. The version byte fixes the leading character:
//! `G` for account ids, `S` for seeds, `T` for pre-authorized transaction
//! hashes and `X` for hash-x signers.
//!
//! Seed bytes are never logged and never printed through `Debug`.

use crate::error::{Result, TxAsmError};
use crate::serialization::{decode_fixed_opaque, decode_u32, encode_fixed_opaque, encode_u32};
use crate::serialization::{ByteDeserialize, ByteSerialize};
use base32::Alphabet;
use crc::{Crc, CRC_16_XMODEM};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);
const ALPHABET: Alphabet = Alphabet::RFC4648 { padding: false };

/// Length of an encoded key: base32 of 1 + 32 + 2 bytes
pub const ENCODED_KEY_LENGTH: usize = 56;

/// Discriminant of the `PublicKey` union for Ed25519 keys
const PUBLIC_KEY_TYPE_ED25519: u32 = 0;

/// Version byte prefixed to every text key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionByte {
    /// Public account id, renders with a leading `G`
    AccountId = 6 << 3,
    /// Private seed, renders with a leading `S`
    Seed = 18 << 3,
    /// Pre-authorized transaction hash, renders with a leading `T`
    PreAuthTx = 19 << 3,
    /// SHA-256 hash-x signer, renders with a leading `X`
    HashX = 23 << 3,
}

impl VersionByte {
    fn describe(self) -> &'static str {
        match self {
            VersionByte::AccountId => "account id",
            VersionByte::Seed => "secret seed",
            VersionByte::PreAuthTx => "pre-auth transaction hash",
            VersionByte::HashX => "hash-x",
        }
    }
}

/// Encode a 32-byte payload as checksummed base32 text
pub fn encode_check(version: VersionByte, payload: &[u8; 32]) -> String {
    let mut raw = Vec::with_capacity(35);
    raw.push(version as u8);
    raw.extend_from_slice(payload);
    let checksum = CRC16.checksum(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    base32::encode(ALPHABET, &raw)
}

/// Decode checksummed base32 text, verifying version byte and checksum
pub fn decode_check(version: VersionByte, text: &str) -> Result<[u8; 32]> {
    let invalid = |reason: &str| {
        TxAsmError::InvalidKey(format!("{} is not a valid {}: {}", text, version.describe(), reason))
    };

    if text.len() != ENCODED_KEY_LENGTH {
        return Err(invalid("wrong length"));
    }
    if !text.bytes().all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b)) {
        return Err(invalid("not base32"));
    }

    let raw = base32::decode(ALPHABET, text).ok_or_else(|| invalid("not base32"))?;
    if raw.len() != 35 {
        return Err(invalid("wrong decoded length"));
    }
    if raw[0] != version as u8 {
        return Err(invalid("version byte mismatch"));
    }

    let (body, checksum) = raw.split_at(33);
    let expected = CRC16.checksum(body);
    if checksum != expected.to_le_bytes() {
        return Err(invalid("checksum mismatch"));
    }

    let mut payload = [0u8; 32];
    payload.copy_from_slice(&body[1..]);
    Ok(payload)
}

/// Decode a `G...` account id into its raw public key
pub fn decode_account_id(text: &str) -> Result<[u8; 32]> {
    decode_check(VersionByte::AccountId, text)
}

/// Decode an `S...` seed into its raw private key bytes
pub fn decode_seed(text: &str) -> Result<[u8; 32]> {
    decode_check(VersionByte::Seed, text)
}

/// Derive the account id of a raw Ed25519 seed
pub fn derive_account_id(seed: &[u8; 32]) -> AccountId {
    let signing_key = SigningKey::from_bytes(seed);
    AccountId(signing_key.verifying_key().to_bytes())
}

/// Generate a random keypair, returning `(seed_text, account_text)`
pub fn generate_keypair() -> (String, String) {
    let keypair = KeyPair::random();
    (keypair.secret_seed().to_string(), keypair.account_id().to_string())
}

/// A public account id (Ed25519 public key)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The last four bytes of the key, used to tag signatures
    pub fn signature_hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.0[28..]);
        hint
    }

    /// Verify an Ed25519 signature made by this account
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        match VerifyingKey::from_bytes(&self.0) {
            Ok(key) => key.verify(message, &Signature::from_bytes(signature)).is_ok(),
            Err(_) => false,
        }
    }
}

impl FromStr for AccountId {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self> {
        decode_account_id(s).map(AccountId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_check(VersionByte::AccountId, &self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl ByteSerialize for AccountId {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_u32(PUBLIC_KEY_TYPE_ED25519, writer)?;
        encode_fixed_opaque(&self.0, writer)
    }
}

impl ByteDeserialize for AccountId {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let key_type = decode_u32(cursor)?;
        if key_type != PUBLIC_KEY_TYPE_ED25519 {
            return Err(TxAsmError::DeserializationError(format!(
                "Unknown public key type {}",
                key_type
            )));
        }
        Ok(AccountId(decode_fixed_opaque::<32>(cursor)?))
    }
}

/// A private Ed25519 seed
#[derive(Clone, PartialEq, Eq)]
pub struct SecretSeed([u8; 32]);

impl SecretSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn account_id(&self) -> AccountId {
        derive_account_id(&self.0)
    }
}

impl FromStr for SecretSeed {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self> {
        decode_seed(s).map(SecretSeed)
    }
}

impl fmt::Display for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_check(VersionByte::Seed, &self.0))
    }
}

impl fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretSeed(..)")
    }
}

/// Ed25519 signing keypair for an account.
///
/// Signing is deterministic: the same seed and message always produce the
/// same 64-byte signature, which is what makes envelope bytes reproducible.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS RNG
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from raw seed bytes
    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Build a keypair from `S...` text
    pub fn from_secret_seed(text: &str) -> Result<Self> {
        Ok(Self::from_seed_bytes(&decode_seed(text)?))
    }

    pub fn account_id(&self) -> AccountId {
        AccountId(self.signing_key.verifying_key().to_bytes())
    }

    pub fn secret_seed(&self) -> SecretSeed {
        SecretSeed(self.signing_key.to_bytes())
    }

    pub fn signature_hint(&self) -> [u8; 4] {
        self.account_id().signature_hint()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        self.signing_key
            .verifying_key()
            .verify(message, &Signature::from_bytes(signature))
            .is_ok()
    }
}

impl From<&SecretSeed> for KeyPair {
    fn from(seed: &SecretSeed) -> Self {
        Self::from_seed_bytes(seed.as_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({})", self.account_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SEED: &str = "SALCB22A3PL2JFI3GE62BM4S2TE64NJZP4GF2DBGPBC6QIUQ7GI7BRBN";
    const ACCOUNT: &str = "GBWF6NTCPGBROJIPF54XXYRLTUGBDLLORPFDK4FGQQ3IRI4T5PHCGVXV";

    #[test]
    fn test_derive_account_from_seed() {
        let seed = decode_seed(SEED).unwrap();
        assert_eq!(derive_account_id(&seed).to_string(), ACCOUNT);

        let seed = decode_seed("SABS6T5RZCOGXH6RZJM6BNHAN7KXVK6VKJRUPBW2KFABEWDBTIEPCRUO").unwrap();
        assert_eq!(
            derive_account_id(&seed).to_string(),
            "GAO4R7CQGQAV2BEPPQ2LRQP3ANUFOJOBNDEM7AAVCWZA5IIUKIO2FKR5"
        );
    }

    #[test]
    fn test_account_bytes_and_hint() {
        let account: AccountId = ACCOUNT.parse().unwrap();
        assert_eq!(hex::encode(&account.as_bytes()[..4]), "6c5f3662");
        assert_eq!(hex::encode(account.signature_hint()), "93ebce23");
    }

    #[test]
    fn test_version_byte_mismatch() {
        assert!(matches!(decode_account_id(SEED), Err(TxAsmError::InvalidKey(_))));
        assert!(matches!(decode_seed(ACCOUNT), Err(TxAsmError::InvalidKey(_))));
    }

    #[test]
    fn test_malformed_text() {
        assert!(decode_account_id("").is_err());
        assert!(decode_account_id("GBWF6NTC").is_err());
        assert!(decode_account_id(&ACCOUNT.to_lowercase()).is_err());
        assert!(decode_account_id(&ACCOUNT.replace('V', "1")).is_err());
    }

    #[test]
    fn test_keypair_signs_and_verifies() {
        let keypair = KeyPair::from_secret_seed(SEED).unwrap();
        assert_eq!(keypair.account_id().to_string(), ACCOUNT);
        assert_eq!(keypair.secret_seed().to_string(), SEED);

        let signature = keypair.sign(b"payload");
        assert!(keypair.verify(b"payload", &signature));
        assert!(keypair.account_id().verify(b"payload", &signature));
        assert!(!keypair.verify(b"other", &signature));
    }

    #[test]
    fn test_generated_keypair_round_trips() {
        let (seed, account) = generate_keypair();
        assert!(seed.starts_with('S'));
        assert!(account.starts_with('G'));
        let seed: SecretSeed = seed.parse().unwrap();
        assert_eq!(seed.account_id().to_string(), account);
    }

    #[test]
    fn test_seed_from_raw_bytes() {
        let seed = SecretSeed::from_bytes(decode_seed(SEED).unwrap());
        assert_eq!(seed.to_string(), SEED);
        assert_eq!(seed.account_id().to_string(), ACCOUNT);
        assert_eq!(KeyPair::from(&seed).secret_seed(), seed);
    }

    #[test]
    fn test_seed_debug_is_redacted() {
        let seed: SecretSeed = SEED.parse().unwrap();
        assert_eq!(format!("{:?}", seed), "SecretSeed(..)");
    }

    #[test]
    fn test_account_xdr() {
        let account: AccountId = ACCOUNT.parse().unwrap();
        let bytes = account.to_xdr().unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert_eq!(AccountId::from_xdr(&bytes).unwrap(), account);
    }

    #[test]
    fn test_serde_as_string() {
        let account: AccountId = ACCOUNT.parse().unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, format!("\"{}\"", ACCOUNT));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }

    const BASE32_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

    proptest! {
        #[test]
        fn prop_seed_and_account_round_trip(bytes in any::<[u8; 32]>()) {
            let seed_text = encode_check(VersionByte::Seed, &bytes);
            let account = derive_account_id(&decode_seed(&seed_text).unwrap());
            let account_text = account.to_string();
            prop_assert_eq!(decode_account_id(&account_text).unwrap(), *account.as_bytes());
        }

        #[test]
        fn prop_single_char_corruption_is_rejected(
            bytes in any::<[u8; 32]>(),
            position in 0usize..ENCODED_KEY_LENGTH,
            replacement in 0usize..32,
        ) {
            let text = encode_check(VersionByte::AccountId, &bytes);
            let mut corrupted = text.clone().into_bytes();
            let new_char = BASE32_CHARS[replacement];
            prop_assume!(corrupted[position] != new_char);
            corrupted[position] = new_char;
            let corrupted = String::from_utf8(corrupted).unwrap();
            prop_assert!(matches!(
                decode_account_id(&corrupted),
                Err(TxAsmError::InvalidKey(_))
            ));
        }
    }
}
