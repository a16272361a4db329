//! Gateway request handlers

pub mod health;
pub mod helpers;
pub mod withdrawal;

pub use health::{HealthResponse, health_check};
pub use withdrawal::{
    WithdrawalApiRequest, WithdrawalApiResponse, approve_withdrawal, campaign_withdrawals,
    cancel_withdrawal, complete_withdrawal, get_withdrawal, process_withdrawal,
    reject_withdrawal, request_withdrawal,
};
