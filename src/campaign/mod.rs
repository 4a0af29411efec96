//! Campaign management: the campaign model, its progress computation, and
//! the public page listing campaigns.

mod campaigns_page;
mod core;

pub use campaigns_page::get_campaigns_page;
pub use self::core::{
    Campaign, CampaignId, create_campaign, create_campaign_table, get_all_campaigns, get_campaign,
    map_campaign_row,
};
