//! Withdrawal FSM State Definitions
//!
//! State IDs are designed for PostgreSQL storage as SMALLINT.
//! Terminal states: COMPLETED (40), REJECTED (-10), CANCELLED (-20)

use std::fmt;

/// Withdrawal FSM States
///
/// ```text
/// PENDING → APPROVED → PROCESSING → COMPLETED
///    ↓          ↓
/// REJECTED  CANCELLED   (cancel is legal from PENDING and APPROVED)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum WithdrawalState {
    /// Requested by the campaign owner, awaiting admin review
    Pending = 10,

    /// Approved by an admin, queued for payout
    Approved = 20,

    /// Payout handed to the processor - funds are IN-FLIGHT
    Processing = 30,

    /// Terminal: payout confirmed, campaign balance debited
    Completed = 40,

    /// Terminal: declined by an admin, funds stay in the campaign
    Rejected = -10,

    /// Terminal: withdrawn by the owner before processing
    Cancelled = -20,
}

impl WithdrawalState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WithdrawalState::Completed | WithdrawalState::Rejected | WithdrawalState::Cancelled
        )
    }

    /// Check if the requested amount still counts against the campaign's
    /// available balance (everything short of a terminal state)
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether the owner may still cancel from this state.
    ///
    /// Once processing starts the payout may already be with the
    /// processor, so cancellation stops being legal.
    #[inline]
    pub fn can_cancel(&self) -> bool {
        matches!(self, WithdrawalState::Pending | WithdrawalState::Approved)
    }

    /// Get the numeric state ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL state ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            10 => Some(WithdrawalState::Pending),
            20 => Some(WithdrawalState::Approved),
            30 => Some(WithdrawalState::Processing),
            40 => Some(WithdrawalState::Completed),
            -10 => Some(WithdrawalState::Rejected),
            -20 => Some(WithdrawalState::Cancelled),
            _ => None,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalState::Pending => "PENDING",
            WithdrawalState::Approved => "APPROVED",
            WithdrawalState::Processing => "PROCESSING",
            WithdrawalState::Completed => "COMPLETED",
            WithdrawalState::Rejected => "REJECTED",
            WithdrawalState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for WithdrawalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for WithdrawalState {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        WithdrawalState::from_id(value).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(WithdrawalState::Completed.is_terminal());
        assert!(WithdrawalState::Rejected.is_terminal());
        assert!(WithdrawalState::Cancelled.is_terminal());

        assert!(!WithdrawalState::Pending.is_terminal());
        assert!(!WithdrawalState::Approved.is_terminal());
        assert!(!WithdrawalState::Processing.is_terminal());
    }

    #[test]
    fn in_flight_states() {
        assert!(WithdrawalState::Pending.is_in_flight());
        assert!(WithdrawalState::Approved.is_in_flight());
        assert!(WithdrawalState::Processing.is_in_flight());

        assert!(!WithdrawalState::Completed.is_in_flight());
        assert!(!WithdrawalState::Rejected.is_in_flight());
        assert!(!WithdrawalState::Cancelled.is_in_flight());
    }

    #[test]
    fn cancel_window() {
        assert!(WithdrawalState::Pending.can_cancel());
        assert!(WithdrawalState::Approved.can_cancel());

        assert!(!WithdrawalState::Processing.can_cancel());
        assert!(!WithdrawalState::Completed.can_cancel());
        assert!(!WithdrawalState::Rejected.can_cancel());
        assert!(!WithdrawalState::Cancelled.can_cancel());
    }

    #[test]
    fn state_id_roundtrip() {
        let states = [
            WithdrawalState::Pending,
            WithdrawalState::Approved,
            WithdrawalState::Processing,
            WithdrawalState::Completed,
            WithdrawalState::Rejected,
            WithdrawalState::Cancelled,
        ];

        for state in states {
            let id = state.id();
            let recovered = WithdrawalState::from_id(id).unwrap();
            assert_eq!(state, recovered);
        }
    }

    #[test]
    fn invalid_state_id() {
        assert!(WithdrawalState::from_id(0).is_none());
        assert!(WithdrawalState::from_id(999).is_none());
        assert!(WithdrawalState::from_id(-999).is_none());
    }

    #[test]
    fn display() {
        assert_eq!(WithdrawalState::Pending.to_string(), "PENDING");
        assert_eq!(WithdrawalState::Completed.to_string(), "COMPLETED");
        assert_eq!(WithdrawalState::Cancelled.to_string(), "CANCELLED");
    }
}
