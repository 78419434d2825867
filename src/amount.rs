//! Fixed-point amounts and rational prices
//!
//! Amounts travel on the wire as a signed 64-bit count of stroops
//! (1 unit = 10^7 stroops). Decimal strings are converted exactly; any
//! digit that would be dropped by the scaling is an error rather than a
//! rounding.

use crate::error::{Result, TxAsmError};
use crate::serialization::{decode_i32, decode_i64, encode_i32, encode_i64};
use crate::serialization::{ByteDeserialize, ByteSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Number of fractional digits carried by an amount
pub const DECIMAL_PLACES: usize = 7;

/// Stroops per whole unit
pub const ONE: i64 = 10_000_000;

/// A non-negative ledger amount in stroops
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    /// 922337203685.4775807
    pub const MAX: Amount = Amount(i64::MAX);

    pub fn from_stroops(stroops: i64) -> Result<Self> {
        if stroops < 0 {
            return Err(TxAsmError::InvalidAmount(format!(
                "negative stroop count {}",
                stroops
            )));
        }
        Ok(Amount(stroops))
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Convert a decimal string to stroops
pub fn encode_amount(text: &str) -> Result<i64> {
    text.parse::<Amount>().map(|amount| amount.0)
}

impl FromStr for Amount {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self> {
        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(TxAsmError::InvalidAmount(s.to_string()));
        }

        // digits past the seventh must be zero to scale exactly
        let (kept, dropped) = fraction.split_at(fraction.len().min(DECIMAL_PLACES));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(TxAsmError::PrecisionLoss(s.to_string()));
        }

        let overflow = || TxAsmError::Overflow(s.to_string());
        let mut stroops: i64 = 0;
        for digit in whole.bytes() {
            stroops = stroops
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }
        stroops = stroops.checked_mul(ONE).ok_or_else(overflow)?;

        let mut scaled_fraction: i64 = 0;
        for position in 0..DECIMAL_PLACES {
            let digit = kept.as_bytes().get(position).map_or(0, |b| b - b'0');
            scaled_fraction = scaled_fraction * 10 + i64::from(digit);
        }
        stroops = stroops.checked_add(scaled_fraction).ok_or_else(overflow)?;

        Ok(Amount(stroops))
    }
}

impl TryFrom<&str> for Amount {
    type Error = TxAsmError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:07}", self.0 / ONE, self.0 % ONE)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl ByteSerialize for Amount {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_i64(self.0, writer)
    }
}

impl ByteDeserialize for Amount {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let stroops = decode_i64(cursor)?;
        Amount::from_stroops(stroops)
            .map_err(|e| TxAsmError::DeserializationError(e.to_string()))
    }
}

/// A price as an unreduced fraction of two positive 32-bit integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    /// The neutral 1:1 price
    pub const ONE: Price = Price { n: 1, d: 1 };

    pub fn new(n: i32, d: i32) -> Result<Self> {
        if n <= 0 || d <= 0 {
            return Err(TxAsmError::InvalidPrice(format!("{}/{}", n, d)));
        }
        Ok(Price { n, d })
    }

    /// Best rational approximation of `value` with 32-bit terms.
    ///
    /// Walks the continued fraction expansion and stops at the last
    /// convergent whose numerator and denominator both fit in an `i32`.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(TxAsmError::InvalidPrice(value.to_string()));
        }

        let max = f64::from(i32::MAX);
        let (mut h_prev, mut h) = (0f64, 1f64);
        let (mut k_prev, mut k) = (1f64, 0f64);
        let mut number = value;

        loop {
            if number > max {
                break;
            }
            let a = number.floor();
            let fraction = number - a;
            let h_next = a * h + h_prev;
            let k_next = a * k + k_prev;
            if h_next > max || k_next > max {
                break;
            }
            h_prev = h;
            h = h_next;
            k_prev = k;
            k = k_next;
            if fraction == 0.0 {
                break;
            }
            number = 1.0 / fraction;
        }

        Price::new(h as i32, k as i32)
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.n) / f64::from(self.d)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

impl FromStr for Price {
    type Err = TxAsmError;

    /// Parses `n/d` or a decimal approximated by [`Price::from_f64`]
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TxAsmError::InvalidPrice(s.to_string());
        match s.split_once('/') {
            Some((n, d)) => {
                let n = n.trim().parse().map_err(|_| invalid())?;
                let d = d.trim().parse().map_err(|_| invalid())?;
                Price::new(n, d)
            }
            None => Price::from_f64(s.trim().parse().map_err(|_| invalid())?),
        }
    }
}

impl ByteSerialize for Price {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_i32(self.n, writer)?;
        encode_i32(self.d, writer)
    }
}

impl ByteDeserialize for Price {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let n = decode_i32(cursor)?;
        let d = decode_i32(cursor)?;
        Ok(Price { n, d })
    }
}
