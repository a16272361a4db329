//! GalangDana - Donation Platform Withdrawal Engine
//!
//! The service that turns a campaign's collected funds into approved,
//! fee-adjusted, disbursed withdrawals.
//!
//! # Modules
//!
//! - [`money`] - Whole-rupiah amounts: strict parsing and display formatting
//! - [`fee`] - Withdrawal fee policy and fee/net split
//! - [`withdrawal`] - The lifecycle engine: FSM, stores, service, notices
//! - [`campaign`] - Campaign entity and repository
//! - [`account`] - Users, roles, and the `Actor` authorization view
//! - [`gateway`] - axum HTTP surface
//! - [`config`] / [`logging`] / [`db`] - service plumbing

pub mod account;
pub mod campaign;
pub mod config;
pub mod db;
pub mod fee;
pub mod gateway;
pub mod logging;
pub mod money;
pub mod withdrawal;

// Convenient re-exports at crate root
pub use account::{Actor, Role, User};
pub use campaign::{Campaign, CampaignStatus};
pub use fee::{FeeBreakdown, FeePolicy};
pub use withdrawal::{
    MemoryStore, PayoutAccount, PgStore, WithdrawalError, WithdrawalId, WithdrawalRecord,
    WithdrawalService, WithdrawalState,
};
