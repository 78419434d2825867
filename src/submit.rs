//! Submission outcome interpretation
//!
//! A submission response is a success (`{hash, ledger}`) unless it carries a
//! top-level `status`, in which case it is a ledger rejection with a title
//! and optional transaction and per-operation result codes. A rejection is
//! a value to inspect, not an error: [`TransactionResult::result`] and
//! [`TransactionResult::errors`] are mutually exclusive and each fails when
//! called on the wrong outcome.

use crate::error::{Result, TxAsmError};
use serde::Deserialize;

/// Hash and ledger of an accepted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub hash: String,
    pub ledger: u64,
}

/// Result codes of a rejected transaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionErrors {
    pub status: u16,
    pub title: String,
    /// Transaction-level result code, empty when absent
    pub transaction: String,
    /// One result code per operation, empty when absent
    pub operations: Vec<String>,
}

/// Terminal state of a submitted envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    Success(Submitted),
    Failure(SubmissionErrors),
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    status: Option<u16>,
    title: Option<String>,
    hash: Option<String>,
    ledger: Option<LedgerNumber>,
    extras: Option<Extras>,
}

/// Horizon has sent ledger numbers both as JSON numbers and strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LedgerNumber {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct Extras {
    result_codes: Option<ResultCodes>,
}

#[derive(Debug, Deserialize)]
struct ResultCodes {
    #[serde(default)]
    transaction: String,
    #[serde(default)]
    operations: Vec<String>,
}

impl TransactionResult {
    /// Classify a submission response body
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let raw: RawResponse = serde_json::from_value(value)?;

        if let Some(status) = raw.status {
            let codes = raw.extras.and_then(|extras| extras.result_codes);
            let (transaction, operations) = match codes {
                Some(codes) => (codes.transaction, codes.operations),
                None => (String::new(), Vec::new()),
            };
            return Ok(TransactionResult::Failure(SubmissionErrors {
                status,
                title: raw.title.unwrap_or_default(),
                transaction,
                operations,
            }));
        }

        let hash = raw.hash.ok_or_else(|| {
            TxAsmError::DeserializationError("submission response has no hash".to_string())
        })?;
        let ledger = match raw.ledger {
            Some(LedgerNumber::Number(ledger)) => ledger,
            Some(LedgerNumber::Text(text)) => text.parse().map_err(|_| {
                TxAsmError::DeserializationError(format!("invalid ledger number {:?}", text))
            })?,
            None => {
                return Err(TxAsmError::DeserializationError(
                    "submission response has no ledger".to_string(),
                ))
            }
        };
        Ok(TransactionResult::Success(Submitted { hash, ledger }))
    }

    pub fn parse_body(body: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(body)?)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionResult::Success(_))
    }

    /// Hash and ledger of an accepted transaction; fails on a rejection
    pub fn result(&self) -> Result<&Submitted> {
        match self {
            TransactionResult::Success(submitted) => Ok(submitted),
            TransactionResult::Failure(_) => Err(TxAsmError::OutcomeMismatch(
                "transaction failed, inspect errors() instead",
            )),
        }
    }

    /// Result codes of a rejection; fails on an accepted transaction
    pub fn errors(&self) -> Result<&SubmissionErrors> {
        match self {
            TransactionResult::Failure(errors) => Ok(errors),
            TransactionResult::Success(_) => Err(TxAsmError::OutcomeMismatch(
                "transaction succeeded, inspect result() instead",
            )),
        }
    }

    /// Turn a rejection into [`TxAsmError::SubmissionRejected`]
    pub fn into_result(self) -> Result<Submitted> {
        match self {
            TransactionResult::Success(submitted) => Ok(submitted),
            TransactionResult::Failure(errors) => Err(TxAsmError::SubmissionRejected {
                title: errors.title,
                transaction: errors.transaction,
                operations: errors.operations,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_response() {
        let result = TransactionResult::from_json(json!({"hash": "cafebabe", "ledger": "42"})).unwrap();
        assert!(result.is_success());
        let submitted = result.result().unwrap();
        assert_eq!(submitted.hash, "cafebabe");
        assert_eq!(submitted.ledger, 42);
        assert!(matches!(result.errors(), Err(TxAsmError::OutcomeMismatch(_))));
    }

    #[test]
    fn test_numeric_ledger() {
        let result = TransactionResult::from_json(json!({"hash": "ab", "ledger": 7})).unwrap();
        assert_eq!(result.result().unwrap().ledger, 7);
    }

    #[test]
    fn test_failure_with_result_codes() {
        let body = r#"{
            "type": "https://stellar.org/horizon-errors/transaction_failed",
            "title": "Transaction Failed",
            "status": 400,
            "extras": {
                "envelope_xdr": "AAAA",
                "result_codes": {
                    "transaction": "tx_failed",
                    "operations": ["op_underfunded", "op_success"]
                }
            }
        }"#;
        let result = TransactionResult::parse_body(body).unwrap();
        assert!(!result.is_success());
        assert!(matches!(result.result(), Err(TxAsmError::OutcomeMismatch(_))));

        let errors = result.errors().unwrap();
        assert_eq!(errors.status, 400);
        assert_eq!(errors.title, "Transaction Failed");
        assert_eq!(errors.transaction, "tx_failed");
        assert_eq!(errors.operations, vec!["op_underfunded", "op_success"]);
    }

    #[test]
    fn test_failure_without_extras() {
        let result = TransactionResult::from_json(json!({"status": 504, "title": "Timeout"})).unwrap();
        let errors = result.errors().unwrap();
        assert_eq!(errors.title, "Timeout");
        assert!(errors.transaction.is_empty());
        assert!(errors.operations.is_empty());
    }

    #[test]
    fn test_into_result_maps_rejection() {
        let result = TransactionResult::from_json(json!({
            "status": 400,
            "title": "Transaction Failed",
            "extras": {"result_codes": {"transaction": "tx_bad_seq"}}
        }))
        .unwrap();
        match result.into_result() {
            Err(TxAsmError::SubmissionRejected { transaction, operations, .. }) => {
                assert_eq!(transaction, "tx_bad_seq");
                assert!(operations.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_success() {
        assert!(TransactionResult::from_json(json!({"ledger": 1})).is_err());
        assert!(TransactionResult::from_json(json!({"hash": "ab", "ledger": "x"})).is_err());
    }
}
