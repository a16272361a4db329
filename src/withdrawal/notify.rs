//! Notification dispatch hook
//!
//! The engine emits a typed notice on the transitions that inform the
//! campaign owner (approve, reject, complete). Delivery is fire-and-forget:
//! a state transition never waits on, and never rolls back for, the
//! notification channel.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::types::WithdrawalId;

/// Fields shared by every notice variant
#[derive(Debug, Clone)]
pub struct NoticeContext {
    pub withdrawal_id: WithdrawalId,
    pub campaign_title: String,
    /// Campaign owner receiving the notice
    pub recipient_id: i64,
    /// Gross amount in whole rupiah
    pub amount: u64,
    /// Display form, e.g. "Rp 500.000"
    pub formatted_amount: String,
    /// Link into the creator dashboard
    pub action_url: String,
}

/// One variant per notifying transition, each with a fixed payload shape
#[derive(Debug, Clone)]
pub enum WithdrawalNotice {
    Approved {
        ctx: NoticeContext,
    },
    Rejected {
        ctx: NoticeContext,
        reason: String,
    },
    Completed {
        ctx: NoticeContext,
        reference_number: String,
    },
}

impl WithdrawalNotice {
    pub fn context(&self) -> &NoticeContext {
        match self {
            WithdrawalNotice::Approved { ctx }
            | WithdrawalNotice::Rejected { ctx, .. }
            | WithdrawalNotice::Completed { ctx, .. } => ctx,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WithdrawalNotice::Approved { .. } => "withdrawal_approved",
            WithdrawalNotice::Rejected { .. } => "withdrawal_rejected",
            WithdrawalNotice::Completed { .. } => "withdrawal_completed",
        }
    }
}

/// Delivery channel for withdrawal notices.
///
/// Implementations must not assume the caller handles their errors;
/// failures are logged by the dispatcher and dropped.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notice: &WithdrawalNotice) -> anyhow::Result<()>;
}

/// Fire-and-forget dispatch.
///
/// Spawns the delivery so the state transition returns immediately;
/// a failed delivery is logged at warn and discarded.
pub fn dispatch(notifier: Arc<dyn Notifier>, notice: WithdrawalNotice) {
    tokio::spawn(async move {
        if let Err(e) = notifier.deliver(&notice).await {
            tracing::warn!(
                kind = notice.kind(),
                withdrawal_id = %notice.context().withdrawal_id,
                recipient_id = notice.context().recipient_id,
                error = %e,
                "Notification delivery failed (dropped)"
            );
        }
    });
}

/// Notifier that writes notices to the log.
///
/// Stands in for the platform's mail/push channel, which is an external
/// collaborator behind this trait.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notice: &WithdrawalNotice) -> anyhow::Result<()> {
        let ctx = notice.context();
        tracing::info!(
            kind = notice.kind(),
            withdrawal_id = %ctx.withdrawal_id,
            recipient_id = ctx.recipient_id,
            amount = ctx.amount,
            formatted_amount = %ctx.formatted_amount,
            action_url = %ctx.action_url,
            "Withdrawal notice"
        );
        Ok(())
    }
}

/// Notifier that records every notice, for tests
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<WithdrawalNotice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<WithdrawalNotice> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notice: &WithdrawalNotice) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Notifier that always fails, for verifying fire-and-forget semantics
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _notice: &WithdrawalNotice) -> anyhow::Result<()> {
        anyhow::bail!("mail service unreachable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> WithdrawalNotice {
        WithdrawalNotice::Rejected {
            ctx: NoticeContext {
                withdrawal_id: WithdrawalId::new(),
                campaign_title: "Bantu Korban Banjir".to_string(),
                recipient_id: 100,
                amount: 500_000,
                formatted_amount: "Rp 500.000".to_string(),
                action_url: "http://localhost:8080/withdrawals/x".to_string(),
            },
            reason: "Account holder mismatch".to_string(),
        }
    }

    #[test]
    fn notice_kind_and_context() {
        let n = notice();
        assert_eq!(n.kind(), "withdrawal_rejected");
        assert_eq!(n.context().amount, 500_000);
    }

    #[tokio::test]
    async fn recording_notifier_captures() {
        let recorder = RecordingNotifier::new();
        recorder.deliver(&notice()).await.unwrap();
        assert_eq!(recorder.count(), 1);
        assert!(matches!(
            recorder.delivered()[0],
            WithdrawalNotice::Rejected { .. }
        ));
    }

    #[tokio::test]
    async fn dispatch_swallows_delivery_failure() {
        // Must not panic or propagate anything
        dispatch(Arc::new(FailingNotifier), notice());
        tokio::task::yield_now().await;
    }
}
