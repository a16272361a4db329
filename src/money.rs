//! Money handling for rupiah amounts
//!
//! All amounts are stored as `u64` whole rupiah (the smallest currency unit
//! in use). There is no fractional sub-unit anywhere in the system, so the
//! internal representation needs no scale factor; the work this module does
//! is strict boundary validation and display formatting.
//!
//! ## Usage
//! ```text
//! // Client sends "500000"
//! let amount = parse_rupiah("500000")?;   // 500_000
//!
//! // Notification text
//! let display = format_rupiah(500_000);   // "Rp 500.000"
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Money parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount has a fractional part; rupiah amounts are whole units")]
    FractionalRupiah,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Parse: Client → Internal (String → u64)
// ============================================================================

/// Parse a client-provided amount string into whole rupiah.
///
/// Strict format rules, no silent coercion:
/// - rejects empty strings, signs, scientific notation
/// - rejects `.5` / `5.` shapes
/// - accepts a fractional part only when it is all zeros (`"50000.00"`)
/// - rejects zero and negative amounts
pub fn parse_rupiah(amount_str: &str) -> Result<u64, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidAmount);
    }

    if amount_str.contains('e') || amount_str.contains('E') {
        return Err(MoneyError::InvalidFormat(
            "scientific notation not allowed".into(),
        ));
    }

    if amount_str.starts_with('.') {
        return Err(MoneyError::InvalidFormat(
            "missing leading zero (e.g., use 0.5 instead of .5)".into(),
        ));
    }
    if amount_str.ends_with('.') {
        return Err(MoneyError::InvalidFormat(
            "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
        ));
    }

    let d = Decimal::from_str(amount_str)
        .map_err(|e| MoneyError::InvalidFormat(format!("invalid decimal: {}", e)))?;

    parse_decimal(d)
}

/// Convert a validated Decimal into whole rupiah.
///
/// Used at the gateway boundary where JSON amounts deserialize to
/// `rust_decimal::Decimal`.
pub fn parse_decimal(d: Decimal) -> Result<u64, MoneyError> {
    if d.is_sign_negative() {
        return Err(MoneyError::InvalidAmount);
    }
    if !d.fract().is_zero() {
        return Err(MoneyError::FractionalRupiah);
    }

    let amount = d.trunc().to_u64().ok_or(MoneyError::Overflow)?;
    if amount == 0 {
        return Err(MoneyError::InvalidAmount);
    }

    Ok(amount)
}

// ============================================================================
// Format: Internal → Client (u64 → String)
// ============================================================================

/// Format whole rupiah for display: `"Rp 1.500.000"`.
///
/// Indonesian convention: dot as the thousands separator, no decimals.
pub fn format_rupiah(amount: u64) -> String {
    format!("Rp {}", group_thousands(amount))
}

/// Digit grouping without the currency prefix, for API payloads.
pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// StrictRupiah: Format-Validated Amount at Serde Layer
// ============================================================================

/// Strict rupiah amount - validated during deserialization
///
/// Only accepts JSON strings so the format rules above apply before any
/// business validation runs. Serializes back as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictRupiah(u64);

impl StrictRupiah {
    /// Get the inner whole-rupiah value
    pub fn inner(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub fn from_u64(v: u64) -> Self {
        Self(v)
    }
}

impl<'de> Deserialize<'de> for StrictRupiah {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        let amount = parse_rupiah(&s).map_err(D::Error::custom)?;
        Ok(StrictRupiah(amount))
    }
}

impl Serialize for StrictRupiah {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
