//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, campaign::create_campaign_table, donation::create_donation_table,
    user::create_user_table,
};

/// Create the tables for the application's domain models.
///
/// The tables are created inside a single exclusive transaction so that a
/// partially initialized database is never left behind.
///
/// # Errors
/// Returns an [Error::SqlError] if any table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_campaign_table(&transaction)?;
    create_donation_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
