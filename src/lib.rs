//! TxAsm - Stellar Transaction Assembler
//!
//! Builds Stellar transactions at the byte level: strkey account and seed
//! codecs, the canonical XDR encoding of assets, amounts, memos and the
//! eleven operation kinds, envelope signing, and submission and queries
//! against a Horizon server.

pub mod amount;
pub mod asset;
pub mod config;
pub mod error;
pub mod federation;
pub mod fee_calculator;
pub mod horizon;
pub mod keys;
pub mod logging;
pub mod memo;
pub mod network;
pub mod operation;
pub mod serialization;
pub mod set_options;
pub mod submit;
pub mod transaction;

pub use amount::{Amount, Price};
pub use asset::{Asset, AssetCode};
pub use error::{Result, TxAsmError};
pub use horizon::HorizonClient;
pub use keys::{AccountId, KeyPair, SecretSeed};
pub use memo::Memo;
pub use network::NetworkConfig;
pub use submit::TransactionResult;
pub use transaction::{TransactionBuilder, TransactionEnvelope};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::amount::{Amount, Price};
    pub use crate::asset::{Asset, AssetCode};
    pub use crate::error::TxAsmError;
    pub use crate::fee_calculator::FeeCalculator;
    pub use crate::horizon::{HorizonClient, Order, PageRequest, Scope};
    pub use crate::keys::{AccountId, KeyPair, SecretSeed};
    pub use crate::memo::Memo;
    pub use crate::network::NetworkConfig;
    pub use crate::operation::{AuthFlags, Operation, SignerKey};
    pub use crate::submit::TransactionResult;
    pub use crate::transaction::{TimeBounds, Transaction, TransactionBuilder, TransactionEnvelope};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_library_imports() {
        let builder = TransactionBuilder::new(KeyPair::random(), NetworkConfig::testnet());
        assert!(builder.needs_sequence());
        assert!(builder.build(Some(1)).is_err());
    }
}
