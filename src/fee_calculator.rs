//! Transaction fee calculation
//!
//! The network charges a flat base fee per operation. A transaction's fee
//! is the caller's explicit fee when given, otherwise the base fee times
//! the number of operations in the finalized operation list.

use crate::error::{Result, TxAsmError};

/// Base fee per operation, in stroops
pub const BASE_FEE: u32 = 100;

/// Fee breakdown for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub base_fee_per_operation: u32,
    pub operation_count: usize,
    /// Fee written into the transaction
    pub total: u32,
    /// True when the caller supplied the fee
    pub explicit: bool,
}

/// Per-operation fee calculator
#[derive(Debug, Clone, Copy)]
pub struct FeeCalculator {
    base_fee: u32,
}

impl FeeCalculator {
    pub fn new() -> Self {
        Self { base_fee: BASE_FEE }
    }

    /// Create with a custom per-operation base fee
    pub fn with_base_fee(base_fee: u32) -> Self {
        Self { base_fee }
    }

    pub fn base_fee(&self) -> u32 {
        self.base_fee
    }

    /// Default fee for `operation_count` operations
    pub fn calculate_fee(&self, operation_count: usize) -> Result<u32> {
        u32::try_from(operation_count)
            .ok()
            .and_then(|count| count.checked_mul(self.base_fee))
            .ok_or_else(|| {
                TxAsmError::InvalidTransaction(format!(
                    "fee for {} operations overflows",
                    operation_count
                ))
            })
    }

    /// Resolve the fee of a transaction, preferring an explicit override
    pub fn estimate(&self, explicit_fee: Option<u32>, operation_count: usize) -> Result<FeeEstimate> {
        let total = match explicit_fee {
            Some(fee) => fee,
            None => self.calculate_fee(operation_count)?,
        };
        Ok(FeeEstimate {
            base_fee_per_operation: self.base_fee,
            operation_count,
            total,
            explicit: explicit_fee.is_some(),
        })
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new()
    }
}
