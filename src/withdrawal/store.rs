//! Storage seams for the withdrawal engine
//!
//! The service drives trait objects so the lifecycle logic stays testable
//! without Postgres. `PgStore` (see [`super::pg`]) is the production
//! implementation; [`MemoryStore`] mirrors the same CAS semantics under a
//! mutex and backs the integration tests and in-memory dev mode.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::campaign::Campaign;

use super::error::WithdrawalError;
use super::state::WithdrawalState;
use super::types::{TransitionPatch, WithdrawalId, WithdrawalRecord};

/// Persistence operations for withdrawal records.
///
/// All state updates are CAS (compare-and-swap): they apply only when the
/// stored state still matches `expected`, so concurrent transition
/// attempts on one withdrawal serialize and the loser observes `false`.
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Insert a freshly created PENDING record
    async fn insert(&self, record: &WithdrawalRecord) -> Result<(), WithdrawalError>;

    /// Fetch a record by id
    async fn get(&self, id: WithdrawalId) -> Result<Option<WithdrawalRecord>, WithdrawalError>;

    /// Withdrawal history for one campaign, newest first
    async fn list_for_campaign(
        &self,
        campaign_id: i64,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalError>;

    /// Sum of gross amounts of all non-terminal withdrawals for a campaign.
    ///
    /// This is what the request path subtracts from `collected_amount`, so
    /// concurrent pending requests cannot jointly exceed the balance.
    async fn in_flight_total(&self, campaign_id: i64) -> Result<u64, WithdrawalError>;

    /// Apply `patch` iff the record's current state equals `expected`.
    ///
    /// Returns `Ok(true)` when the update landed, `Ok(false)` when another
    /// transition got there first.
    async fn update_state_if(
        &self,
        id: WithdrawalId,
        expected: WithdrawalState,
        patch: TransitionPatch,
    ) -> Result<bool, WithdrawalError>;

    /// Completion edge: CAS to COMPLETED and debit the campaign's
    /// collected amount by `gross`, atomically.
    ///
    /// `Ok(false)` means the CAS lost; `InsufficientFunds` means the
    /// conditional debit found less than `gross` remaining (nothing is
    /// changed in that case).
    async fn complete_and_debit(
        &self,
        id: WithdrawalId,
        expected: WithdrawalState,
        patch: TransitionPatch,
        campaign_id: i64,
        gross: u64,
    ) -> Result<bool, WithdrawalError>;
}

/// Campaign reads the withdrawal engine depends on
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn get_campaign(&self, campaign_id: i64) -> Result<Option<Campaign>, WithdrawalError>;
}

// ============================================================================
// MemoryStore
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    campaigns: HashMap<i64, Campaign>,
    withdrawals: HashMap<WithdrawalId, WithdrawalRecord>,
    insertion_order: Vec<WithdrawalId>,
}

/// In-memory store with the same CAS semantics as `PgStore`.
///
/// Used by the integration tests and by the gateway's in-memory dev mode.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a campaign
    pub fn add_campaign(&self, campaign: Campaign) {
        let mut inner = self.inner.lock().unwrap();
        inner.campaigns.insert(campaign.campaign_id, campaign);
    }

    /// Current collected amount of a seeded campaign (test assertions)
    pub fn collected_amount(&self, campaign_id: i64) -> Option<u64> {
        let inner = self.inner.lock().unwrap();
        inner.campaigns.get(&campaign_id).map(|c| c.collected_amount)
    }
}

#[async_trait]
impl WithdrawalStore for MemoryStore {
    async fn insert(&self, record: &WithdrawalRecord) -> Result<(), WithdrawalError> {
        let mut inner = self.inner.lock().unwrap();
        inner.insertion_order.push(record.withdrawal_id);
        inner.withdrawals.insert(record.withdrawal_id, record.clone());
        Ok(())
    }

    async fn get(&self, id: WithdrawalId) -> Result<Option<WithdrawalRecord>, WithdrawalError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.withdrawals.get(&id).cloned())
    }

    async fn list_for_campaign(
        &self,
        campaign_id: i64,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalError> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<WithdrawalRecord> = inner
            .insertion_order
            .iter()
            .rev()
            .filter_map(|id| inner.withdrawals.get(id))
            .filter(|r| r.campaign_id == campaign_id)
            .cloned()
            .collect();
        records.truncate(50);
        Ok(records)
    }

    async fn in_flight_total(&self, campaign_id: i64) -> Result<u64, WithdrawalError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .withdrawals
            .values()
            .filter(|r| r.campaign_id == campaign_id && r.state.is_in_flight())
            .map(|r| r.amount)
            .sum())
    }

    async fn update_state_if(
        &self,
        id: WithdrawalId,
        expected: WithdrawalState,
        patch: TransitionPatch,
    ) -> Result<bool, WithdrawalError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.withdrawals.get_mut(&id) {
            Some(record) if record.state == expected => {
                patch.apply(record);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(WithdrawalError::WithdrawalNotFound(id.to_string())),
        }
    }

    async fn complete_and_debit(
        &self,
        id: WithdrawalId,
        expected: WithdrawalState,
        patch: TransitionPatch,
        campaign_id: i64,
        gross: u64,
    ) -> Result<bool, WithdrawalError> {
        let mut inner = self.inner.lock().unwrap();

        // Same verdict order as PgStore: CAS outcome first, then the
        // debit condition; nothing mutates unless both go through.
        match inner.withdrawals.get(&id) {
            Some(record) if record.state == expected => {}
            Some(_) => return Ok(false),
            None => return Err(WithdrawalError::WithdrawalNotFound(id.to_string())),
        }

        let collected = inner
            .campaigns
            .get(&campaign_id)
            .map(|c| c.collected_amount)
            .ok_or(WithdrawalError::CampaignNotFound(campaign_id))?;
        if collected < gross {
            return Err(WithdrawalError::InsufficientFunds);
        }

        patch.apply(inner.withdrawals.get_mut(&id).unwrap());
        inner
            .campaigns
            .get_mut(&campaign_id)
            .unwrap()
            .collected_amount -= gross;
        Ok(true)
    }
}

#[async_trait]
impl CampaignStore for MemoryStore {
    async fn get_campaign(&self, campaign_id: i64) -> Result<Option<Campaign>, WithdrawalError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.campaigns.get(&campaign_id).cloned())
    }
}
