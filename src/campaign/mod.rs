//! Fundraising campaigns

pub mod models;
pub mod repository;

pub use models::{Campaign, CampaignStatus};
pub use repository::CampaignRepository;
