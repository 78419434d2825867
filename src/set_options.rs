//! Deferred set-options accumulation
//!
//! Option changes requested on a transaction are collected here, one slot
//! per option, and merged into a single set-options operation when the
//! transaction is finalized. Combining them costs one operation fee instead
//! of one per call.

use crate::error::Result;
use crate::keys::AccountId;
use crate::operation::{check_home_domain, AuthFlags, Operation, SetOptionsOp, Signer, SignerKey};

/// One optional slot per account option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptionsBuilder {
    options: SetOptionsOp,
    calls: usize,
}

impl SetOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no option has been requested
    pub fn is_empty(&self) -> bool {
        self.options == SetOptionsOp::default()
    }

    /// Number of option calls folded into this builder
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn inflation_destination(&mut self, account: AccountId) -> &mut Self {
        self.calls += 1;
        self.options.inflation_dest = Some(account);
        self
    }

    /// Flags accumulate across calls; no slot is written when `flags` is empty
    pub fn set_flags(&mut self, flags: AuthFlags) -> &mut Self {
        self.calls += 1;
        if let Some(bits) = flags.bits() {
            self.options.set_flags = Some(self.options.set_flags.unwrap_or(0) | bits);
        }
        self
    }

    pub fn clear_flags(&mut self, flags: AuthFlags) -> &mut Self {
        self.calls += 1;
        if let Some(bits) = flags.bits() {
            self.options.clear_flags = Some(self.options.clear_flags.unwrap_or(0) | bits);
        }
        self
    }

    /// Thresholds left as `None` keep their previous value
    pub fn thresholds(&mut self, high: Option<u8>, medium: Option<u8>, low: Option<u8>) -> &mut Self {
        self.calls += 1;
        if let Some(high) = high {
            self.options.high_threshold = Some(u32::from(high));
        }
        if let Some(medium) = medium {
            self.options.med_threshold = Some(u32::from(medium));
        }
        if let Some(low) = low {
            self.options.low_threshold = Some(u32::from(low));
        }
        self
    }

    pub fn master_weight(&mut self, weight: u8) -> &mut Self {
        self.calls += 1;
        self.options.master_weight = Some(u32::from(weight));
        self
    }

    /// Add, update or (weight 0) remove a signer. The last call wins.
    pub fn signer(&mut self, key: SignerKey, weight: u8) -> &mut Self {
        self.calls += 1;
        self.options.signer = Some(Signer {
            key,
            weight: u32::from(weight),
        });
        self
    }

    pub fn home_domain(&mut self, domain: &str) -> Result<&mut Self> {
        check_home_domain(domain)?;
        self.calls += 1;
        self.options.home_domain = Some(domain.to_string());
        Ok(self)
    }

    /// Merge every requested option into one operation
    pub fn build(&self) -> Result<Option<Operation>> {
        if self.is_empty() {
            return Ok(None);
        }
        Operation::set_options(self.options.clone()).map(Some)
    }
}
