//! Withdrawal Service
//!
//! Drives the withdrawal FSM. Every operation follows the same shape:
//! authorize the actor, validate the input, then apply the transition as a
//! CAS update so concurrent attempts on one withdrawal serialize.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::account::Actor;
use crate::campaign::Campaign;
use crate::fee::FeePolicy;
use crate::money::format_rupiah;

use super::error::WithdrawalError;
use super::notify::{self, NoticeContext, Notifier, WithdrawalNotice};
use super::state::WithdrawalState;
use super::store::{CampaignStore, WithdrawalStore};
use super::types::{PayoutAccount, TransitionPatch, WithdrawalId, WithdrawalRecord};

/// Withdrawal lifecycle engine
pub struct WithdrawalService {
    store: Arc<dyn WithdrawalStore>,
    campaigns: Arc<dyn CampaignStore>,
    notifier: Arc<dyn Notifier>,
    policy: FeePolicy,
    base_url: String,
}

impl WithdrawalService {
    pub fn new(
        store: Arc<dyn WithdrawalStore>,
        campaigns: Arc<dyn CampaignStore>,
        notifier: Arc<dyn Notifier>,
        policy: FeePolicy,
        base_url: String,
    ) -> Self {
        Self {
            store,
            campaigns,
            notifier,
            policy,
            base_url,
        }
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    /// Request a withdrawal (campaign owner)
    ///
    /// Creates a PENDING record with the fee split computed up front.
    /// The campaign balance is untouched until completion, but the
    /// available-balance check counts every in-flight withdrawal so
    /// pending requests cannot jointly exceed `collected_amount`.
    pub async fn request(
        &self,
        actor: Actor,
        campaign_id: i64,
        amount: u64,
        account: PayoutAccount,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        let campaign = self.load_campaign(campaign_id).await?;
        self.require_owner(actor, &campaign)?;

        if !campaign.allows_withdrawals() {
            return Err(WithdrawalError::CampaignNotWithdrawable);
        }

        account
            .validate()
            .map_err(WithdrawalError::InvalidPayoutAccount)?;

        if amount < self.policy.minimum_withdrawal {
            return Err(WithdrawalError::AmountBelowMinimum {
                minimum: self.policy.minimum_withdrawal,
            });
        }

        let split = self
            .policy
            .split(amount)
            .ok_or(WithdrawalError::AmountNotCoveringFee)?;

        let in_flight = self.store.in_flight_total(campaign_id).await?;
        let available = campaign.collected_amount.saturating_sub(in_flight);
        if amount > available {
            return Err(WithdrawalError::InsufficientFunds);
        }

        let record = WithdrawalRecord::new(campaign_id, split, account);
        self.store.insert(&record).await?;

        info!(
            withdrawal_id = %record.withdrawal_id,
            campaign_id,
            gross = record.amount,
            fee = record.fee_amount,
            net = record.net_amount,
            "Withdrawal requested"
        );

        Ok(record)
    }

    /// Approve a pending withdrawal (admin)
    pub async fn approve(
        &self,
        actor: Actor,
        id: WithdrawalId,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        self.require_admin(actor)?;
        let record = self.load(id).await?;
        Self::require_state(&record, WithdrawalState::Pending, "approve")?;

        let patch = TransitionPatch::approve(actor.user_id, Utc::now());
        if !self
            .store
            .update_state_if(id, WithdrawalState::Pending, patch.clone())
            .await?
        {
            return Err(WithdrawalError::Conflict);
        }

        let mut updated = record;
        patch.apply(&mut updated);

        info!(withdrawal_id = %id, admin_id = actor.user_id, "Withdrawal approved");
        self.notify_owner(&updated, |ctx| WithdrawalNotice::Approved { ctx })
            .await;

        Ok(updated)
    }

    /// Reject a pending withdrawal (admin)
    ///
    /// Funds stay in the campaign balance; the reason lands in `notes`.
    pub async fn reject(
        &self,
        actor: Actor,
        id: WithdrawalId,
        reason: String,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        self.require_admin(actor)?;
        if reason.trim().is_empty() {
            return Err(WithdrawalError::EmptyReason);
        }

        let record = self.load(id).await?;
        Self::require_state(&record, WithdrawalState::Pending, "reject")?;

        let patch = TransitionPatch::reject(actor.user_id, reason.clone(), Utc::now());
        if !self
            .store
            .update_state_if(id, WithdrawalState::Pending, patch.clone())
            .await?
        {
            return Err(WithdrawalError::Conflict);
        }

        let mut updated = record;
        patch.apply(&mut updated);

        info!(withdrawal_id = %id, admin_id = actor.user_id, "Withdrawal rejected");
        self.notify_owner(&updated, |ctx| WithdrawalNotice::Rejected { ctx, reason })
            .await;

        Ok(updated)
    }

    /// Hand an approved withdrawal to the payout processor (admin)
    pub async fn mark_processing(
        &self,
        actor: Actor,
        id: WithdrawalId,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        self.require_admin(actor)?;
        let record = self.load(id).await?;
        Self::require_state(&record, WithdrawalState::Approved, "process")?;

        let patch = TransitionPatch::process(Utc::now());
        if !self
            .store
            .update_state_if(id, WithdrawalState::Approved, patch.clone())
            .await?
        {
            return Err(WithdrawalError::Conflict);
        }

        let mut updated = record;
        patch.apply(&mut updated);

        info!(withdrawal_id = %id, "Withdrawal processing");
        Ok(updated)
    }

    /// Confirm the payout and settle the campaign balance (admin)
    ///
    /// The only edge that touches `collected_amount`: the CAS to COMPLETED
    /// and the conditional debit commit in one transaction, so the debit
    /// happens exactly once and the balance never goes negative.
    pub async fn complete(
        &self,
        actor: Actor,
        id: WithdrawalId,
        reference_number: String,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        self.require_admin(actor)?;
        if reference_number.trim().is_empty() {
            return Err(WithdrawalError::EmptyReference);
        }

        let record = self.load(id).await?;
        Self::require_state(&record, WithdrawalState::Processing, "complete")?;

        let patch = TransitionPatch::complete(reference_number.clone(), Utc::now());
        if !self
            .store
            .complete_and_debit(
                id,
                WithdrawalState::Processing,
                patch.clone(),
                record.campaign_id,
                record.amount,
            )
            .await?
        {
            return Err(WithdrawalError::Conflict);
        }

        let mut updated = record;
        patch.apply(&mut updated);

        info!(
            withdrawal_id = %id,
            reference_number = %reference_number,
            gross = updated.amount,
            "Withdrawal completed, campaign balance debited"
        );
        self.notify_owner(&updated, |ctx| WithdrawalNotice::Completed {
            ctx,
            reference_number,
        })
        .await;

        Ok(updated)
    }

    /// Cancel a withdrawal before it reaches the processor (campaign owner)
    pub async fn cancel(
        &self,
        actor: Actor,
        id: WithdrawalId,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        let record = self.load(id).await?;
        let campaign = self.load_campaign(record.campaign_id).await?;
        self.require_owner(actor, &campaign)?;

        if !record.state.can_cancel() {
            return Err(WithdrawalError::InvalidState {
                from: record.state,
                operation: "cancel",
            });
        }

        let patch = TransitionPatch::cancel();
        if !self
            .store
            .update_state_if(id, record.state, patch.clone())
            .await?
        {
            return Err(WithdrawalError::Conflict);
        }

        let mut updated = record;
        patch.apply(&mut updated);

        info!(withdrawal_id = %id, "Withdrawal cancelled by owner");
        Ok(updated)
    }

    /// Fetch one withdrawal (owner of its campaign, or admin)
    pub async fn get(
        &self,
        actor: Actor,
        id: WithdrawalId,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        let record = self.load(id).await?;
        if !actor.is_admin() {
            let campaign = self.load_campaign(record.campaign_id).await?;
            self.require_owner(actor, &campaign)?;
        }
        Ok(record)
    }

    /// Withdrawal history for a campaign (its owner, or admin)
    pub async fn history(
        &self,
        actor: Actor,
        campaign_id: i64,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalError> {
        if !actor.is_admin() {
            let campaign = self.load_campaign(campaign_id).await?;
            self.require_owner(actor, &campaign)?;
        }
        self.store.list_for_campaign(campaign_id).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require_admin(&self, actor: Actor) -> Result<(), WithdrawalError> {
        if !actor.is_admin() {
            return Err(WithdrawalError::Forbidden);
        }
        Ok(())
    }

    fn require_owner(&self, actor: Actor, campaign: &Campaign) -> Result<(), WithdrawalError> {
        if !actor.is_creator() || actor.user_id != campaign.owner_id {
            return Err(WithdrawalError::Forbidden);
        }
        Ok(())
    }

    fn require_state(
        record: &WithdrawalRecord,
        expected: WithdrawalState,
        operation: &'static str,
    ) -> Result<(), WithdrawalError> {
        if record.state != expected {
            return Err(WithdrawalError::InvalidState {
                from: record.state,
                operation,
            });
        }
        Ok(())
    }

    async fn load(&self, id: WithdrawalId) -> Result<WithdrawalRecord, WithdrawalError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| WithdrawalError::WithdrawalNotFound(id.to_string()))
    }

    async fn load_campaign(&self, campaign_id: i64) -> Result<Campaign, WithdrawalError> {
        self.campaigns
            .get_campaign(campaign_id)
            .await?
            .ok_or(WithdrawalError::CampaignNotFound(campaign_id))
    }

    /// Build and dispatch an owner notice; transitions never fail on this.
    async fn notify_owner<F>(&self, record: &WithdrawalRecord, build: F)
    where
        F: FnOnce(NoticeContext) -> WithdrawalNotice,
    {
        let campaign = match self.campaigns.get_campaign(record.campaign_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!(
                    withdrawal_id = %record.withdrawal_id,
                    campaign_id = record.campaign_id,
                    "Campaign vanished before notification, notice dropped"
                );
                return;
            }
            Err(e) => {
                warn!(
                    withdrawal_id = %record.withdrawal_id,
                    error = %e,
                    "Campaign lookup for notification failed, notice dropped"
                );
                return;
            }
        };

        let ctx = NoticeContext {
            withdrawal_id: record.withdrawal_id,
            campaign_title: campaign.title,
            recipient_id: campaign.owner_id,
            amount: record.amount,
            formatted_amount: format_rupiah(record.amount),
            action_url: format!("{}/withdrawals/{}", self.base_url, record.withdrawal_id),
        };

        notify::dispatch(self.notifier.clone(), build(ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Role;
    use crate::campaign::CampaignStatus;
    use crate::withdrawal::notify::RecordingNotifier;
    use crate::withdrawal::store::MemoryStore;

    fn bank_account() -> PayoutAccount {
        PayoutAccount::BankTransfer {
            bank_name: "BCA".to_string(),
            account_number: "1234567890".to_string(),
            account_holder: "Siti Rahayu".to_string(),
        }
    }

    fn active_campaign(campaign_id: i64, owner_id: i64, collected: u64) -> Campaign {
        Campaign {
            campaign_id,
            owner_id,
            title: "Bantu Korban Banjir".to_string(),
            target_amount: 10_000_000,
            collected_amount: collected,
            donors_count: 12,
            status: CampaignStatus::Active,
            created_at: Utc::now(),
        }
    }

    struct Harness {
        service: WithdrawalService,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = WithdrawalService::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            FeePolicy::default(),
            "http://localhost:8080".to_string(),
        );
        Harness {
            service,
            store,
            notifier,
        }
    }

    const OWNER: Actor = Actor {
        user_id: 100,
        role: Role::Creator,
    };
    const OTHER_CREATOR: Actor = Actor {
        user_id: 101,
        role: Role::Creator,
    };
    const ADMIN: Actor = Actor {
        user_id: 1,
        role: Role::Admin,
    };
    const DONOR: Actor = Actor {
        user_id: 200,
        role: Role::Donor,
    };

    #[tokio::test]
    async fn request_computes_fee_split() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));

        let record = h
            .service
            .request(OWNER, 1, 500_000, bank_account())
            .await
            .unwrap();

        assert_eq!(record.state, WithdrawalState::Pending);
        assert_eq!(record.fee_amount, 15_000);
        assert_eq!(record.net_amount, 485_000);
        // Balance untouched at request time
        assert_eq!(h.store.collected_amount(1), Some(1_000_000));
    }

    #[tokio::test]
    async fn request_below_minimum_rejected() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));

        let result = h.service.request(OWNER, 1, 30_000, bank_account()).await;
        assert!(matches!(
            result,
            Err(WithdrawalError::AmountBelowMinimum { minimum: 50_000 })
        ));
        // No record created
        assert!(h.service.history(ADMIN, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_over_balance_rejected() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 400_000));

        let result = h.service.request(OWNER, 1, 500_000, bank_account()).await;
        assert!(matches!(result, Err(WithdrawalError::InsufficientFunds)));
    }

    #[tokio::test]
    async fn request_counts_in_flight_withdrawals() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));

        h.service
            .request(OWNER, 1, 700_000, bank_account())
            .await
            .unwrap();

        // 700k already reserved; only 300k available
        let result = h.service.request(OWNER, 1, 400_000, bank_account()).await;
        assert!(matches!(result, Err(WithdrawalError::InsufficientFunds)));

        // A request inside the remainder still passes
        assert!(
            h.service
                .request(OWNER, 1, 300_000, bank_account())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn request_requires_campaign_owner() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));

        for actor in [OTHER_CREATOR, ADMIN, DONOR] {
            let result = h.service.request(actor, 1, 100_000, bank_account()).await;
            assert!(
                matches!(result, Err(WithdrawalError::Forbidden)),
                "actor {:?} must not request",
                actor
            );
        }
    }

    #[tokio::test]
    async fn request_rejects_non_withdrawable_campaign() {
        let h = harness();
        let mut campaign = active_campaign(1, 100, 1_000_000);
        campaign.status = CampaignStatus::Paused;
        h.store.add_campaign(campaign);

        let result = h.service.request(OWNER, 1, 100_000, bank_account()).await;
        assert!(matches!(
            result,
            Err(WithdrawalError::CampaignNotWithdrawable)
        ));
    }

    #[tokio::test]
    async fn request_rejects_bad_payout_account() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));

        let bad = PayoutAccount::BankTransfer {
            bank_name: "BCA".to_string(),
            account_number: "12 34".to_string(),
            account_holder: "Siti".to_string(),
        };
        let result = h.service.request(OWNER, 1, 100_000, bad).await;
        assert!(matches!(
            result,
            Err(WithdrawalError::InvalidPayoutAccount("account_number"))
        ));
    }

    #[tokio::test]
    async fn approve_requires_admin() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        let record = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();

        let result = h.service.approve(OWNER, record.withdrawal_id).await;
        assert!(matches!(result, Err(WithdrawalError::Forbidden)));

        let approved = h.service.approve(ADMIN, record.withdrawal_id).await.unwrap();
        assert_eq!(approved.state, WithdrawalState::Approved);
        assert_eq!(approved.approved_by, Some(ADMIN.user_id));
        assert!(approved.approved_at.is_some());
    }

    #[tokio::test]
    async fn reject_requires_reason() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        let record = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();

        let result = h
            .service
            .reject(ADMIN, record.withdrawal_id, "   ".to_string())
            .await;
        assert!(matches!(result, Err(WithdrawalError::EmptyReason)));

        let rejected = h
            .service
            .reject(ADMIN, record.withdrawal_id, "Data rekening tidak cocok".to_string())
            .await
            .unwrap();
        assert_eq!(rejected.state, WithdrawalState::Rejected);
        assert_eq!(rejected.notes.as_deref(), Some("Data rekening tidak cocok"));
        // Funds remain with the campaign
        assert_eq!(h.store.collected_amount(1), Some(1_000_000));
    }

    #[tokio::test]
    async fn approve_terminal_state_fails() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        let record = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();
        h.service
            .reject(ADMIN, record.withdrawal_id, "duplicate".to_string())
            .await
            .unwrap();

        let result = h.service.approve(ADMIN, record.withdrawal_id).await;
        assert!(matches!(
            result,
            Err(WithdrawalError::InvalidState {
                from: WithdrawalState::Rejected,
                operation: "approve",
            })
        ));
    }

    #[tokio::test]
    async fn cancel_owner_only_and_window() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        let record = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();

        // Another creator cannot cancel someone else's withdrawal
        let result = h.service.cancel(OTHER_CREATOR, record.withdrawal_id).await;
        assert!(matches!(result, Err(WithdrawalError::Forbidden)));

        // Cancel is legal from APPROVED
        h.service.approve(ADMIN, record.withdrawal_id).await.unwrap();
        let cancelled = h.service.cancel(OWNER, record.withdrawal_id).await.unwrap();
        assert_eq!(cancelled.state, WithdrawalState::Cancelled);

        // ... but not after processing starts
        let second = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();
        h.service.approve(ADMIN, second.withdrawal_id).await.unwrap();
        h.service
            .mark_processing(ADMIN, second.withdrawal_id)
            .await
            .unwrap();
        let result = h.service.cancel(OWNER, second.withdrawal_id).await;
        assert!(matches!(
            result,
            Err(WithdrawalError::InvalidState {
                from: WithdrawalState::Processing,
                operation: "cancel",
            })
        ));
    }

    #[tokio::test]
    async fn complete_requires_reference() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        let record = h
            .service
            .request(OWNER, 1, 500_000, bank_account())
            .await
            .unwrap();
        h.service.approve(ADMIN, record.withdrawal_id).await.unwrap();
        h.service
            .mark_processing(ADMIN, record.withdrawal_id)
            .await
            .unwrap();

        let result = h
            .service
            .complete(ADMIN, record.withdrawal_id, "".to_string())
            .await;
        assert!(matches!(result, Err(WithdrawalError::EmptyReference)));

        let completed = h
            .service
            .complete(ADMIN, record.withdrawal_id, "WDABC123".to_string())
            .await
            .unwrap();
        assert_eq!(completed.state, WithdrawalState::Completed);
        assert_eq!(completed.reference_number.as_deref(), Some("WDABC123"));
        // Gross amount debited exactly once
        assert_eq!(h.store.collected_amount(1), Some(500_000));
    }

    #[tokio::test]
    async fn complete_skipping_processing_fails() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        let record = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();
        h.service.approve(ADMIN, record.withdrawal_id).await.unwrap();

        let result = h
            .service
            .complete(ADMIN, record.withdrawal_id, "WD1".to_string())
            .await;
        assert!(matches!(
            result,
            Err(WithdrawalError::InvalidState {
                from: WithdrawalState::Approved,
                operation: "complete",
            })
        ));
    }

    #[tokio::test]
    async fn notices_fire_on_approve_reject_complete() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));

        let a = h
            .service
            .request(OWNER, 1, 500_000, bank_account())
            .await
            .unwrap();
        h.service.approve(ADMIN, a.withdrawal_id).await.unwrap();
        h.service.mark_processing(ADMIN, a.withdrawal_id).await.unwrap();
        h.service
            .complete(ADMIN, a.withdrawal_id, "WDABC123".to_string())
            .await
            .unwrap();

        let b = h
            .service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();
        h.service
            .reject(ADMIN, b.withdrawal_id, "incomplete data".to_string())
            .await
            .unwrap();

        // Delivery is spawned; yield until the dispatcher has run
        for _ in 0..10 {
            if h.notifier.count() >= 3 {
                break;
            }
            tokio::task::yield_now().await;
        }

        let delivered = h.notifier.delivered();
        assert_eq!(delivered.len(), 3);
        let kinds: Vec<&str> = delivered.iter().map(|n| n.kind()).collect();
        assert!(kinds.contains(&"withdrawal_approved"));
        assert!(kinds.contains(&"withdrawal_completed"));
        assert!(kinds.contains(&"withdrawal_rejected"));

        let ctx = delivered[0].context();
        assert_eq!(ctx.recipient_id, 100);
        assert_eq!(ctx.formatted_amount, "Rp 500.000");
        assert!(ctx.action_url.contains(&a.withdrawal_id.to_string()));
    }

    #[tokio::test]
    async fn history_visible_to_owner_and_admin_only() {
        let h = harness();
        h.store.add_campaign(active_campaign(1, 100, 1_000_000));
        h.service
            .request(OWNER, 1, 100_000, bank_account())
            .await
            .unwrap();

        assert_eq!(h.service.history(OWNER, 1).await.unwrap().len(), 1);
        assert_eq!(h.service.history(ADMIN, 1).await.unwrap().len(), 1);
        assert!(matches!(
            h.service.history(OTHER_CREATOR, 1).await,
            Err(WithdrawalError::Forbidden)
        ));
    }
}
