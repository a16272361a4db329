use std::sync::Arc;

use crate::db::Database;
use crate::withdrawal::WithdrawalService;

/// Gateway shared application state
#[derive(Clone)]
pub struct AppState {
    /// Withdrawal lifecycle engine
    pub service: Arc<WithdrawalService>,
    /// PostgreSQL database; `None` in in-memory dev mode, in which case
    /// actor roles come from request headers instead of `users_tb`
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(service: Arc<WithdrawalService>, db: Option<Arc<Database>>) -> Self {
        Self { service, db }
    }
}
