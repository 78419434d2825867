//! Error types for TxAsm

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxAsmError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Precision loss: {0} has more than 7 fractional digits")]
    PrecisionLoss(String),

    #[error("Amount overflow: {0} exceeds the ledger maximum")]
    Overflow(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Memo too long: {len} bytes, at most 28 allowed")]
    MemoTooLong { len: usize },

    #[error("Invalid memo: {0}")]
    InvalidMemo(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("No signer available for account {0}")]
    MissingSigner(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Horizon error {status}: {title}")]
    Horizon { status: u16, title: String },

    #[error("Transaction rejected: {title} (transaction: {transaction}, operations: {operations:?})")]
    SubmissionRejected {
        title: String,
        transaction: String,
        operations: Vec<String>,
    },

    #[error("Result accessor misuse: {0}")]
    OutcomeMismatch(&'static str),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Federation error: {0}")]
    Federation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Buffer too small: needed {needed} bytes, got {available}")]
    BufferTooSmall {
        needed: usize,
        available: usize,
    },

    #[error("Signature error: {0}")]
    SignatureError(String),
}

impl From<std::io::Error> for TxAsmError {
    fn from(err: std::io::Error) -> Self {
        TxAsmError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for TxAsmError {
    fn from(err: serde_json::Error) -> Self {
        TxAsmError::DeserializationError(err.to_string())
    }
}

impl From<reqwest::Error> for TxAsmError {
    fn from(err: reqwest::Error) -> Self {
        TxAsmError::NetworkError(err.to_string())
    }
}

impl From<base64::DecodeError> for TxAsmError {
    fn from(err: base64::DecodeError) -> Self {
        TxAsmError::DeserializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TxAsmError>;
