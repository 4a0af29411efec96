//! Staff dashboard module
//!
//! Provides a staff-only overview page with the total raised across all
//! campaigns, a funds-by-campaign chart, and a searchable donation table.

mod charts;
mod handlers;
mod query;

pub use handlers::get_dashboard_page;
pub use query::{CampaignFunds, DonationRecord, get_campaign_chart_data, search_donations};
