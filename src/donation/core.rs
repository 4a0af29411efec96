//! Defines the core data model and the atomic submission path for donations.

use rusqlite::{Connection, Row, Transaction as SqlTransaction};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, campaign::CampaignId, donation::get_lifetime_impact, user::UserId};

/// A single, immutable contribution from a donor to a campaign.
///
/// Donations are only ever created by [submit_donation]; there are no update
/// or delete paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// The ID of the donation.
    pub id: i64,
    /// The donor who made the donation.
    pub donor_id: UserId,
    /// The campaign the donation was made to.
    pub campaign_id: CampaignId,
    /// The amount of money donated. Always greater than zero.
    pub amount: f64,
    /// When the donation was made, in UTC.
    pub created_at: OffsetDateTime,
}

/// The result of a successful donation submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationReceipt {
    /// The donation that was created.
    pub donation: Donation,
    /// The donor's lifetime total across all their donations, including this one.
    pub lifetime_total: f64,
}

/// Parse a raw donation amount from a form into a positive number.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `raw_amount` is not
/// parseable as a number, is not finite, or is zero or less.
pub fn parse_donation_amount(raw_amount: &str) -> Result<f64, Error> {
    let amount: f64 = raw_amount
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount(raw_amount.to_owned()))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(raw_amount.to_owned()));
    }

    Ok(amount)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a donation and add it to the campaign's running total.
///
/// Both writes happen inside a single SQLite transaction: either the donation
/// row exists and the campaign total includes it, or neither change is
/// visible. The campaign total is incremented in SQL against the latest
/// committed value rather than read into the application and written back,
/// so concurrent donations to the same campaign cannot lose updates.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `raw_amount` is not a positive number,
/// - or [Error::NotFound] if `campaign_id` does not refer to a campaign,
/// - or [Error::SqlError] if there is some other SQL error. The transaction
///   is rolled back and no partial write remains.
pub fn submit_donation(
    campaign_id: CampaignId,
    donor_id: UserId,
    raw_amount: &str,
    connection: &Connection,
) -> Result<DonationReceipt, Error> {
    let amount = parse_donation_amount(raw_amount)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Immediate)?;

    let rows_updated = transaction.execute(
        "UPDATE campaign SET raised_amount = raised_amount + ?1 WHERE id = ?2",
        (amount, campaign_id),
    )?;

    if rows_updated == 0 {
        // Dropping the transaction rolls it back.
        return Err(Error::NotFound);
    }

    let donation = transaction
        .prepare(
            "INSERT INTO donation (donor_id, campaign_id, amount, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, donor_id, campaign_id, amount, created_at",
        )?
        .query_one(
            (
                donor_id.as_i64(),
                campaign_id,
                amount,
                OffsetDateTime::now_utc(),
            ),
            map_donation_row,
        )?;

    transaction.commit()?;

    let lifetime_total = get_lifetime_impact(donor_id, connection)?;

    Ok(DonationReceipt {
        donation,
        lifetime_total,
    })
}

/// Retrieve all of a donor's donations, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_donations_by_donor(
    donor_id: UserId,
    connection: &Connection,
) -> Result<Vec<Donation>, Error> {
    connection
        .prepare(
            "SELECT id, donor_id, campaign_id, amount, created_at FROM donation
             WHERE donor_id = :donor_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":donor_id", &donor_id.as_i64())], map_donation_row)?
        .map(|maybe_donation| maybe_donation.map_err(|error| error.into()))
        .collect()
}

/// Create the donation table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_donation_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS donation (
                id INTEGER PRIMARY KEY,
                donor_id INTEGER NOT NULL,
                campaign_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0.0),
                created_at TEXT NOT NULL,
                FOREIGN KEY(donor_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(campaign_id) REFERENCES campaign(id) ON UPDATE CASCADE ON DELETE CASCADE
                );

        CREATE INDEX IF NOT EXISTS idx_donation_donor ON donation(donor_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_donation_campaign ON donation(campaign_id, created_at);",
    )?;

    Ok(())
}

/// Map a database row to a Donation.
pub fn map_donation_row(row: &Row) -> Result<Donation, rusqlite::Error> {
    let id = row.get(0)?;
    let donor_id = UserId::new(row.get(1)?);
    let campaign_id = row.get(2)?;
    let amount = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Donation {
        id,
        donor_id,
        campaign_id,
        amount,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_utils {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        db::initialize,
        user::{NewUser, UserId, create_user},
    };

    pub(crate) fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    pub(crate) fn create_test_donor(name: &str, email: &str, connection: &Connection) -> UserId {
        create_user(
            NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                is_staff: false,
            },
            connection,
        )
        .expect("Could not create test donor")
        .id
    }
}


#[cfg(test)]
mod submit_donation_tests {
    use std::sync::{Arc, Mutex};

    use crate::{
        Error,
        campaign::{create_campaign, get_campaign},
        donation::get_donations_by_donor,
    };

    use super::{
        submit_donation,
        test_utils::{create_test_donor, get_test_connection},
    };

    #[test]
    fn submit_creates_donation_and_increments_campaign() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
        let campaign = create_campaign("Clean Water", 100.0, &conn).unwrap();

        let receipt = submit_donation(campaign.id, donor_id, "25", &conn).unwrap();

        assert_eq!(receipt.donation.amount, 25.0);
        assert_eq!(receipt.donation.campaign_id, campaign.id);
        assert_eq!(receipt.donation.donor_id, donor_id);
        assert_eq!(receipt.lifetime_total, 25.0);

        let campaign = get_campaign(campaign.id, &conn).unwrap();
        assert_eq!(campaign.raised_amount, 25.0);
        assert_eq!(campaign.progress_percent(), 25.0);

        let donations = get_donations_by_donor(donor_id, &conn).unwrap();
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0], receipt.donation);
    }

    #[test]
    fn progress_example_from_forty_to_sixty_five_percent() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
        let campaign = create_campaign("Clean Water", 100.0, &conn).unwrap();
        submit_donation(campaign.id, donor_id, "40", &conn).unwrap();
        assert_eq!(get_campaign(campaign.id, &conn).unwrap().progress_percent(), 40.0);

        submit_donation(campaign.id, donor_id, "25", &conn).unwrap();

        let campaign = get_campaign(campaign.id, &conn).unwrap();
        assert_eq!(campaign.raised_amount, 65.0);
        assert_eq!(campaign.progress_percent(), 65.0);
    }

    #[test]
    fn invalid_amount_leaves_no_trace() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
        let campaign = create_campaign("Clean Water", 100.0, &conn).unwrap();

        for raw_amount in ["abc", "-5", "0", ""] {
            let result = submit_donation(campaign.id, donor_id, raw_amount, &conn);

            assert_eq!(
                result,
                Err(Error::InvalidAmount(raw_amount.to_owned())),
                "amount {raw_amount:?} should be rejected"
            );
        }

        let campaign = get_campaign(campaign.id, &conn).unwrap();
        assert_eq!(campaign.raised_amount, 0.0);

        let donations = get_donations_by_donor(donor_id, &conn).unwrap();
        assert_eq!(donations, []);
    }

    #[test]
    fn unknown_campaign_returns_not_found() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);

        let result = submit_donation(42, donor_id, "25", &conn);

        assert_eq!(result, Err(Error::NotFound));

        let donations = get_donations_by_donor(donor_id, &conn).unwrap();
        assert_eq!(donations, []);
    }

    #[test]
    fn failed_insert_rolls_back_campaign_increment() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
        let campaign = create_campaign("Clean Water", 100.0, &conn).unwrap();

        // Sabotage the donation table so the insert fails after the campaign
        // update succeeded. The whole transaction must roll back.
        conn.execute("DROP TABLE donation", ()).unwrap();

        let result = submit_donation(campaign.id, donor_id, "25", &conn);

        assert!(matches!(result, Err(Error::SqlError(_))));

        let campaign = get_campaign(campaign.id, &conn).unwrap();
        assert_eq!(
            campaign.raised_amount, 0.0,
            "campaign increment should have been rolled back"
        );
    }

    #[test]
    fn concurrent_donations_do_not_lose_updates() {
        let conn = Arc::new(Mutex::new(get_test_connection()));
        let (donor_id, campaign_id) = {
            let conn = conn.lock().unwrap();
            let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
            let campaign = create_campaign("Clean Water", 100.0, &conn).unwrap();
            (donor_id, campaign.id)
        };

        let handles: Vec<_> = ["10", "20"]
            .into_iter()
            .map(|raw_amount| {
                let conn = Arc::clone(&conn);
                std::thread::spawn(move || {
                    let conn = conn.lock().unwrap();
                    submit_donation(campaign_id, donor_id, raw_amount, &conn)
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().expect("donation should succeed");
        }

        let conn = conn.lock().unwrap();
        let campaign = get_campaign(campaign_id, &conn).unwrap();
        assert_eq!(campaign.raised_amount, 30.0);

        let donations = get_donations_by_donor(donor_id, &conn).unwrap();
        assert_eq!(donations.len(), 2);
    }

    #[test]
    fn donations_are_ordered_newest_first() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
        let campaign = create_campaign("Clean Water", 100.0, &conn).unwrap();

        for raw_amount in ["1", "2", "3"] {
            submit_donation(campaign.id, donor_id, raw_amount, &conn).unwrap();
        }

        let donations = get_donations_by_donor(donor_id, &conn).unwrap();

        let amounts: Vec<f64> = donations.iter().map(|donation| donation.amount).collect();
        assert_eq!(amounts, [3.0, 2.0, 1.0]);
    }

    #[test]
    fn lifetime_total_accumulates_across_campaigns() {
        let conn = get_test_connection();
        let donor_id = create_test_donor("Alice", "alice@example.com", &conn);
        let water = create_campaign("Clean Water", 100.0, &conn).unwrap();
        let meals = create_campaign("Warm Meals", 100.0, &conn).unwrap();

        submit_donation(water.id, donor_id, "5", &conn).unwrap();
        submit_donation(meals.id, donor_id, "15", &conn).unwrap();
        let receipt = submit_donation(water.id, donor_id, "7.5", &conn).unwrap();

        assert_eq!(receipt.lifetime_total, 27.5);
    }
}
