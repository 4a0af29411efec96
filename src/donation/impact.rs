//! Aggregation queries for donor impact and campaign totals.

use rusqlite::Connection;

use crate::{Error, campaign::CampaignId, user::UserId};

/// Get the sum of all of a donor's donation amounts, or zero if they have none.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_lifetime_impact(donor_id: UserId, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM donation WHERE donor_id = :donor_id",
            &[(":donor_id", &donor_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the sum of all donations made to a campaign, or zero if it has none.
///
/// This is independently computed from the donation log, so it can be
/// cross-checked against the campaign's `raised_amount` column.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_campaign_donation_total(
    campaign_id: CampaignId,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM donation WHERE campaign_id = :campaign_id",
            &[(":campaign_id", &campaign_id)],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}
