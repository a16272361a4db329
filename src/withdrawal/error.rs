//! Withdrawal Error Types

use thiserror::Error;

use super::state::WithdrawalState;

/// Withdrawal error taxonomy
///
/// Error codes map to stable strings for API responses; the HTTP status
/// suggestion keeps the gateway mapping in one place.
#[derive(Error, Debug, Clone)]
pub enum WithdrawalError {
    // === Validation Errors ===
    #[error("Amount is below the minimum withdrawal of {minimum}")]
    AmountBelowMinimum { minimum: u64 },

    #[error("Amount does not cover the withdrawal fee")]
    AmountNotCoveringFee,

    #[error("Invalid payout account: {0}")]
    InvalidPayoutAccount(&'static str),

    #[error("Rejection reason must not be empty")]
    EmptyReason,

    #[error("Reference number must not be empty")]
    EmptyReference,

    // === Balance Errors ===
    #[error("Insufficient campaign funds")]
    InsufficientFunds,

    #[error("Campaign status does not allow withdrawals")]
    CampaignNotWithdrawable,

    // === Authorization Errors ===
    #[error("Actor is not authorized for this operation")]
    Forbidden,

    // === State Errors ===
    #[error("Cannot {operation} a withdrawal in state {from}")]
    InvalidState {
        from: WithdrawalState,
        operation: &'static str,
    },

    #[error("Concurrent modification detected, retry after re-reading state")]
    Conflict,

    // === Lookup Errors ===
    #[error("Withdrawal not found: {0}")]
    WithdrawalNotFound(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(i64),

    // === System Errors ===
    #[error("Database error: {0}")]
    Database(String),
}

impl WithdrawalError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            WithdrawalError::AmountBelowMinimum { .. } => "AMOUNT_BELOW_MINIMUM",
            WithdrawalError::AmountNotCoveringFee => "AMOUNT_NOT_COVERING_FEE",
            WithdrawalError::InvalidPayoutAccount(_) => "INVALID_PAYOUT_ACCOUNT",
            WithdrawalError::EmptyReason => "EMPTY_REASON",
            WithdrawalError::EmptyReference => "EMPTY_REFERENCE",
            WithdrawalError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            WithdrawalError::CampaignNotWithdrawable => "CAMPAIGN_NOT_WITHDRAWABLE",
            WithdrawalError::Forbidden => "FORBIDDEN",
            WithdrawalError::InvalidState { .. } => "INVALID_STATE",
            WithdrawalError::Conflict => "CONFLICT",
            WithdrawalError::WithdrawalNotFound(_) => "WITHDRAWAL_NOT_FOUND",
            WithdrawalError::CampaignNotFound(_) => "CAMPAIGN_NOT_FOUND",
            WithdrawalError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            WithdrawalError::AmountBelowMinimum { .. }
            | WithdrawalError::AmountNotCoveringFee
            | WithdrawalError::InvalidPayoutAccount(_)
            | WithdrawalError::EmptyReason
            | WithdrawalError::EmptyReference => 400,
            WithdrawalError::Forbidden => 403,
            WithdrawalError::WithdrawalNotFound(_) | WithdrawalError::CampaignNotFound(_) => 404,
            WithdrawalError::Conflict => 409,
            WithdrawalError::InsufficientFunds
            | WithdrawalError::CampaignNotWithdrawable
            | WithdrawalError::InvalidState { .. } => 422,
            WithdrawalError::Database(_) => 500,
        }
    }
}

impl From<sqlx::Error> for WithdrawalError {
    fn from(e: sqlx::Error) -> Self {
        WithdrawalError::Database(e.to_string())
    }
}
