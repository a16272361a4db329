//! Withdrawal Core Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fee::FeeBreakdown;

use super::state::WithdrawalState;

/// Withdrawal ID type - ULID-based unique identifier
///
/// Using ULID provides:
/// - Monotonic, sortable IDs
/// - No coordination needed between gateway instances
/// - 128-bit with good entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WithdrawalId(ulid::Ulid);

impl WithdrawalId {
    /// Generate a new unique WithdrawalId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for WithdrawalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WithdrawalId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for WithdrawalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for WithdrawalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| D::Error::custom("invalid ULID"))
    }
}

/// Payout destination, one fixed shape per supported method.
///
/// Serialized as a tagged object so each method keeps its typed fields
/// instead of an open-ended key-value map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PayoutAccount {
    BankTransfer {
        bank_name: String,
        account_number: String,
        account_holder: String,
    },
    EWallet {
        provider: String,
        phone_number: String,
        holder_name: String,
    },
}

impl PayoutAccount {
    /// Method name for storage and API responses
    pub fn method(&self) -> &'static str {
        match self {
            PayoutAccount::BankTransfer { .. } => "bank_transfer",
            PayoutAccount::EWallet { .. } => "e_wallet",
        }
    }

    /// Validate the destination fields for the chosen method.
    ///
    /// Returns the name of the first offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            PayoutAccount::BankTransfer {
                bank_name,
                account_number,
                account_holder,
            } => {
                if bank_name.trim().is_empty() {
                    return Err("bank_name");
                }
                if account_number.trim().is_empty()
                    || !account_number.chars().all(|c| c.is_ascii_digit())
                {
                    return Err("account_number");
                }
                if account_holder.trim().is_empty() {
                    return Err("account_holder");
                }
                Ok(())
            }
            PayoutAccount::EWallet {
                provider,
                phone_number,
                holder_name,
            } => {
                if provider.trim().is_empty() {
                    return Err("provider");
                }
                let digits = phone_number.strip_prefix('+').unwrap_or(phone_number);
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err("phone_number");
                }
                if holder_name.trim().is_empty() {
                    return Err("holder_name");
                }
                Ok(())
            }
        }
    }
}

/// Withdrawal record
///
/// `amount`, `fee_amount` and `net_amount` are immutable after creation;
/// only the state, audit fields and timestamps mutate, and each timestamp
/// is set exactly once in transition order.
#[derive(Debug, Clone)]
pub struct WithdrawalRecord {
    pub withdrawal_id: WithdrawalId,
    pub campaign_id: i64,
    /// Gross requested amount in whole rupiah
    pub amount: u64,
    /// Platform fee deducted from the gross amount
    pub fee_amount: u64,
    /// Amount actually paid out (`amount - fee_amount`)
    pub net_amount: u64,
    /// Payout destination
    pub account: PayoutAccount,
    /// Current FSM state
    pub state: WithdrawalState,
    /// Rejection reason (set only on reject)
    pub notes: Option<String>,
    /// External payout confirmation (set only on completion)
    pub reference_number: Option<String>,
    /// Admin who approved or rejected
    pub approved_by: Option<i64>,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WithdrawalRecord {
    /// Create a new record in PENDING state from a validated fee split
    pub fn new(campaign_id: i64, split: FeeBreakdown, account: PayoutAccount) -> Self {
        Self {
            withdrawal_id: WithdrawalId::new(),
            campaign_id,
            amount: split.gross,
            fee_amount: split.fee,
            net_amount: split.net,
            account,
            state: WithdrawalState::Pending,
            notes: None,
            reference_number: None,
            approved_by: None,
            requested_at: Utc::now(),
            approved_at: None,
            processed_at: None,
            completed_at: None,
        }
    }
}

impl fmt::Display for WithdrawalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Withdrawal[{}] campaign={} gross={} net={} method={} state={}",
            self.withdrawal_id,
            self.campaign_id,
            self.amount,
            self.net_amount,
            self.account.method(),
            self.state
        )
    }
}

/// Field patch applied together with a CAS state update.
///
/// Only the fields a transition touches are `Some`; the store never
/// clears a previously set field.
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    pub new_state: Option<WithdrawalState>,
    pub notes: Option<String>,
    pub reference_number: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransitionPatch {
    pub fn approve(admin_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            new_state: Some(WithdrawalState::Approved),
            approved_by: Some(admin_id),
            approved_at: Some(now),
            ..Default::default()
        }
    }

    pub fn reject(admin_id: i64, reason: String, now: DateTime<Utc>) -> Self {
        Self {
            new_state: Some(WithdrawalState::Rejected),
            notes: Some(reason),
            approved_by: Some(admin_id),
            approved_at: Some(now),
            ..Default::default()
        }
    }

    pub fn process(now: DateTime<Utc>) -> Self {
        Self {
            new_state: Some(WithdrawalState::Processing),
            processed_at: Some(now),
            ..Default::default()
        }
    }

    pub fn complete(reference_number: String, now: DateTime<Utc>) -> Self {
        Self {
            new_state: Some(WithdrawalState::Completed),
            reference_number: Some(reference_number),
            completed_at: Some(now),
            ..Default::default()
        }
    }

    pub fn cancel() -> Self {
        Self {
            new_state: Some(WithdrawalState::Cancelled),
            ..Default::default()
        }
    }

    /// Apply this patch to an in-memory record
    pub fn apply(&self, record: &mut WithdrawalRecord) {
        if let Some(state) = self.new_state {
            record.state = state;
        }
        if let Some(notes) = &self.notes {
            record.notes = Some(notes.clone());
        }
        if let Some(reference) = &self.reference_number {
            record.reference_number = Some(reference.clone());
        }
        if let Some(admin_id) = self.approved_by {
            record.approved_by = Some(admin_id);
        }
        if let Some(at) = self.approved_at {
            record.approved_at = Some(at);
        }
        if let Some(at) = self.processed_at {
            record.processed_at = Some(at);
        }
        if let Some(at) = self.completed_at {
            record.completed_at = Some(at);
        }
    }
}
