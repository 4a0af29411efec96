//! Read-only queries backing the staff dashboard.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::Error;

/// A donation joined with its donor's name and campaign's title, for the
/// dashboard table.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationRecord {
    /// The ID of the donation.
    pub id: i64,
    /// The display name of the donor.
    pub donor_name: String,
    /// The title of the campaign the donation was made to.
    pub campaign_title: String,
    /// The amount of money donated.
    pub amount: f64,
    /// When the donation was made, in UTC.
    pub created_at: OffsetDateTime,
}

/// A campaign's title and running total, for chart rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignFunds {
    /// The campaign's display title.
    pub title: String,
    /// The amount of money donated to the campaign so far.
    pub raised_amount: f64,
}

/// Search donations by donor name or campaign title, newest first.
///
/// With a query, only donations whose donor name or campaign title contains
/// the query are returned (case-insensitive substring match). Without a
/// query, all donations are returned. Ties on the timestamp are broken by
/// descending ID so the ordering is stable.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn search_donations(
    query: Option<&str>,
    connection: &Connection,
) -> Result<Vec<DonationRecord>, Error> {
    connection
        .prepare(
            "SELECT d.id, u.name, c.title, d.amount, d.created_at
             FROM donation d
             INNER JOIN user u ON u.id = d.donor_id
             INNER JOIN campaign c ON c.id = d.campaign_id
             WHERE :query IS NULL
                OR u.name LIKE '%' || :query || '%'
                OR c.title LIKE '%' || :query || '%'
             ORDER BY d.created_at DESC, d.id DESC",
        )?
        .query_map(
            rusqlite::named_params! { ":query": query },
            map_donation_record_row,
        )?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

fn map_donation_record_row(row: &Row) -> Result<DonationRecord, rusqlite::Error> {
    Ok(DonationRecord {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        campaign_title: row.get(2)?,
        amount: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Retrieve each campaign's title and running total for chart rendering,
/// ordered alphabetically by title.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_campaign_chart_data(connection: &Connection) -> Result<Vec<CampaignFunds>, Error> {
    connection
        .prepare("SELECT title, raised_amount FROM campaign ORDER BY title ASC")?
        .query_map([], |row| {
            Ok(CampaignFunds {
                title: row.get(0)?,
                raised_amount: row.get(1)?,
            })
        })?
        .map(|maybe_funds| maybe_funds.map_err(|error| error.into()))
        .collect()
}

/// Get the total raised across all campaigns.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_total_raised(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(raised_amount), 0.0) FROM campaign",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}


#[cfg(test)]
mod chart_data_tests {
    use crate::{
        campaign::create_campaign,
        donation::{
            submit_donation,
            test_utils::{create_test_donor, get_test_connection},
        },
    };

    use super::{get_campaign_chart_data, get_total_raised};

    #[test]
    fn chart_data_reflects_raised_amounts() {
        let conn = get_test_connection();
        let alice = create_test_donor("Alice", "alice@example.com", &conn);
        let water = create_campaign("Clean Water", 1000.0, &conn).unwrap();
        create_campaign("Warm Meals", 500.0, &conn).unwrap();

        submit_donation(water.id, alice, "75", &conn).unwrap();

        let chart_data = get_campaign_chart_data(&conn).unwrap();

        assert_eq!(chart_data.len(), 2);
        assert_eq!(chart_data[0].title, "Clean Water");
        assert_eq!(chart_data[0].raised_amount, 75.0);
        assert_eq!(chart_data[1].title, "Warm Meals");
        assert_eq!(chart_data[1].raised_amount, 0.0);
    }

    #[test]
    fn total_raised_sums_all_campaigns() {
        let conn = get_test_connection();
        let alice = create_test_donor("Alice", "alice@example.com", &conn);
        let water = create_campaign("Clean Water", 1000.0, &conn).unwrap();
        let meals = create_campaign("Warm Meals", 500.0, &conn).unwrap();

        submit_donation(water.id, alice, "75", &conn).unwrap();
        submit_donation(meals.id, alice, "25", &conn).unwrap();

        assert_eq!(get_total_raised(&conn), Ok(100.0));
    }

    #[test]
    fn total_raised_is_zero_with_no_campaigns() {
        let conn = get_test_connection();

        assert_eq!(get_total_raised(&conn), Ok(0.0));
    }
}
