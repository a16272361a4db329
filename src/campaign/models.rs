//! Data models for fundraising campaigns

use chrono::{DateTime, Utc};
use std::fmt;

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum CampaignStatus {
    Draft = 0,
    Active = 1,
    Completed = 2,
    Paused = 3,
}

impl CampaignStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(CampaignStatus::Draft),
            1 => Some(CampaignStatus::Active),
            2 => Some(CampaignStatus::Completed),
            3 => Some(CampaignStatus::Paused),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fundraising campaign
///
/// `collected_amount` is credited by donation settlement and debited only
/// when a withdrawal completes. It never goes negative.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub campaign_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub target_amount: u64,
    pub collected_amount: u64,
    pub donors_count: i64,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether the owner may request withdrawals in the current status.
    ///
    /// Draft campaigns have collected nothing; paused campaigns are
    /// frozen pending review.
    #[inline]
    pub fn allows_withdrawals(&self) -> bool {
        matches!(
            self.status,
            CampaignStatus::Active | CampaignStatus::Completed
        )
    }
}
