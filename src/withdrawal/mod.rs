//! Withdrawal Lifecycle Engine
//!
//! Governs how a campaign's collected funds become an approved,
//! fee-adjusted, disbursed withdrawal.
//!
//! # State Machine
//!
//! ```text
//! PENDING → APPROVED → PROCESSING → COMPLETED
//!    ↓          ↓
//! REJECTED  CANCELLED   (cancel is legal from PENDING and APPROVED)
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Authorize-Before-State**: actor checks run before the state
//!    machine is consulted; a forbidden actor never learns the state.
//! 2. **CAS Transitions**: every state update is conditional on the
//!    expected current state; concurrent attempts serialize and the
//!    loser gets a Conflict error.
//! 3. **Debit-Once-At-Completion**: `collected_amount` is debited by the
//!    gross amount exactly once, on the PROCESSING → COMPLETED edge,
//!    inside the same transaction as the CAS.
//! 4. **Fire-And-Forget Notices**: notification delivery never blocks a
//!    transition and never rolls one back.

pub mod error;
pub mod notify;
pub mod pg;
pub mod service;
pub mod state;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use error::WithdrawalError;
pub use notify::{LogNotifier, NoticeContext, Notifier, RecordingNotifier, WithdrawalNotice};
pub use pg::PgStore;
pub use service::WithdrawalService;
pub use state::WithdrawalState;
pub use store::{CampaignStore, MemoryStore, WithdrawalStore};
pub use types::{PayoutAccount, TransitionPatch, WithdrawalId, WithdrawalRecord};
