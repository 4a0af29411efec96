//! Donation management: the donation model, the atomic submission path that
//! keeps campaign totals consistent, impact aggregation, and the donor-facing
//! pages.

mod core;
mod donate_endpoint;
mod donate_page;
mod impact;
mod profile_page;

pub use self::core::{
    Donation, DonationReceipt, create_donation_table, get_donations_by_donor, map_donation_row,
    parse_donation_amount, submit_donation,
};
pub use donate_endpoint::create_donation_endpoint;
pub use donate_page::get_donate_page;
pub use impact::{get_campaign_donation_total, get_lifetime_impact};
pub use profile_page::get_profile_page;

#[cfg(test)]
pub(crate) use self::core::test_utils;
