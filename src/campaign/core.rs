//! Defines the core data model and database queries for campaigns.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a campaign.
pub type CampaignId = i64;

/// A fundraising campaign with a goal and a running total of contributions.
///
/// `raised_amount` only ever increases, and only via donation submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// The ID of the campaign.
    pub id: CampaignId,
    /// The campaign's display title, e.g. "Clean Water for Kapiti".
    pub title: String,
    /// The amount of money the campaign aims to raise.
    pub goal_amount: f64,
    /// The amount of money donated to the campaign so far.
    pub raised_amount: f64,
}

impl Campaign {
    /// How far along the campaign is towards its goal, as a percentage in [0, 100].
    ///
    /// A campaign with a zero (or negative) goal reports zero percent, and
    /// progress is capped at 100 so the progress bar never overflows.
    pub fn progress_percent(&self) -> f64 {
        if self.goal_amount <= 0.0 {
            return 0.0;
        }

        let progress = (self.raised_amount / self.goal_amount) * 100.0;

        progress.min(100.0)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new campaign with a `raised_amount` of zero.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCampaignTitle] if `title` is empty or only whitespace,
/// - or [Error::InvalidGoal] if `goal_amount` is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_campaign(
    title: &str,
    goal_amount: f64,
    connection: &Connection,
) -> Result<Campaign, Error> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::EmptyCampaignTitle);
    }

    if goal_amount < 0.0 || !goal_amount.is_finite() {
        return Err(Error::InvalidGoal(goal_amount));
    }

    let campaign = connection
        .prepare(
            "INSERT INTO campaign (title, goal_amount, raised_amount)
             VALUES (?1, ?2, 0.0)
             RETURNING id, title, goal_amount, raised_amount",
        )?
        .query_one((title, goal_amount), map_campaign_row)?;

    Ok(campaign)
}

/// Retrieve a campaign from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid campaign,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_campaign(id: CampaignId, connection: &Connection) -> Result<Campaign, Error> {
    let campaign = connection
        .prepare("SELECT id, title, goal_amount, raised_amount FROM campaign WHERE id = :id")?
        .query_one(&[(":id", &id)], map_campaign_row)?;

    Ok(campaign)
}

/// Retrieve all campaigns ordered alphabetically by title.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_campaigns(connection: &Connection) -> Result<Vec<Campaign>, Error> {
    connection
        .prepare("SELECT id, title, goal_amount, raised_amount FROM campaign ORDER BY title ASC")?
        .query_map([], map_campaign_row)?
        .map(|maybe_campaign| maybe_campaign.map_err(|error| error.into()))
        .collect()
}

/// Create the campaign table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_campaign_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS campaign (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                goal_amount REAL NOT NULL CHECK (goal_amount >= 0.0),
                raised_amount REAL NOT NULL DEFAULT 0.0 CHECK (raised_amount >= 0.0)
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Campaign.
pub fn map_campaign_row(row: &Row) -> Result<Campaign, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let goal_amount = row.get(2)?;
    let raised_amount = row.get(3)?;

    Ok(Campaign {
        id,
        title,
        goal_amount,
        raised_amount,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{create_campaign, get_all_campaigns, get_campaign};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let campaign = create_campaign("Clean Water", 1000.0, &conn).unwrap();

        assert!(campaign.id > 0);
        assert_eq!(campaign.title, "Clean Water");
        assert_eq!(campaign.goal_amount, 1000.0);
        assert_eq!(campaign.raised_amount, 0.0);
    }

    #[test]
    fn create_trims_title() {
        let conn = get_test_connection();

        let campaign = create_campaign("  Clean Water  ", 1000.0, &conn).unwrap();

        assert_eq!(campaign.title, "Clean Water");
    }

    #[test]
    fn create_fails_on_empty_title() {
        let conn = get_test_connection();

        let result = create_campaign("\t \n", 1000.0, &conn);

        assert_eq!(result, Err(Error::EmptyCampaignTitle));
    }

    #[test]
    fn create_fails_on_negative_goal() {
        let conn = get_test_connection();

        let result = create_campaign("Clean Water", -5.0, &conn);

        assert_eq!(result, Err(Error::InvalidGoal(-5.0)));
    }

    #[test]
    fn create_allows_zero_goal() {
        let conn = get_test_connection();

        let campaign = create_campaign("Open Ended Fund", 0.0, &conn).unwrap();

        assert_eq!(campaign.goal_amount, 0.0);
        assert_eq!(campaign.progress_percent(), 0.0);
    }

    #[test]
    fn get_campaign_succeeds() {
        let conn = get_test_connection();
        let inserted = create_campaign("Clean Water", 1000.0, &conn).unwrap();

        let selected = get_campaign(inserted.id, &conn).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_campaign_fails_on_invalid_id() {
        let conn = get_test_connection();
        let inserted = create_campaign("Clean Water", 1000.0, &conn).unwrap();

        let result = get_campaign(inserted.id + 123, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_campaigns_orders_by_title() {
        let conn = get_test_connection();
        create_campaign("Warm Meals", 500.0, &conn).unwrap();
        create_campaign("Animal Shelter", 250.0, &conn).unwrap();

        let campaigns = get_all_campaigns(&conn).unwrap();

        let titles: Vec<&str> = campaigns
            .iter()
            .map(|campaign| campaign.title.as_str())
            .collect();
        assert_eq!(titles, ["Animal Shelter", "Warm Meals"]);
    }

    #[test]
    fn get_all_campaigns_with_empty_table() {
        let conn = get_test_connection();

        let campaigns = get_all_campaigns(&conn).unwrap();

        assert_eq!(campaigns, []);
    }
}
