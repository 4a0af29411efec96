//! Code for creating the user table and fetching donors from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application, either a donor or a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The display name shown alongside the user's donations.
    pub name: String,
    /// The email address the user logs in with. Unique across users.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether the user may view the staff dashboard.
    pub is_staff: bool,
}

/// The data needed to create a new user.
///
/// Donors self-register with `is_staff` set to `false`. Staff accounts are
/// provisioned out-of-band, e.g. by the demo database binary.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The display name shown alongside the user's donations.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether the user may view the staff dashboard.
    pub is_staff: bool,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                is_staff INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password, is_staff) VALUES (?1, ?2, ?3, ?4)",
        (
            &new_user.name,
            &new_user.email,
            new_user.password_hash.as_ref(),
            new_user.is_staff,
        ),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        is_staff: new_user.is_staff,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, is_staff FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// Used for log-in, where the client supplies an email rather than an ID.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, is_staff FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let email = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let is_staff = row.get(4)?;

    Ok(User {
        id: UserId::new(raw_id),
        name,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        is_staff,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        user::{NewUser, UserId, create_user, get_user_by_email, get_user_by_id},
    };

    use super::create_user_table;

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn test_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_owned(),
            email: email.to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            is_staff: false,
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();

        let inserted_user = create_user(test_user("alice@example.com"), &connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.name, "Alice");
        assert_eq!(inserted_user.email, "alice@example.com");
        assert!(!inserted_user.is_staff);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let connection = get_db_connection();
        create_user(test_user("alice@example.com"), &connection).unwrap();

        let result = create_user(test_user("alice@example.com"), &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let connection = get_db_connection();

        let id = UserId::new(42);

        assert_eq!(get_user_by_id(id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let connection = get_db_connection();
        let inserted_user = create_user(test_user("alice@example.com"), &connection).unwrap();

        let retrieved_user = get_user_by_id(inserted_user.id, &connection).unwrap();

        assert_eq!(retrieved_user, inserted_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let connection = get_db_connection();
        let inserted_user = create_user(test_user("alice@example.com"), &connection).unwrap();

        let retrieved_user = get_user_by_email("alice@example.com", &connection).unwrap();

        assert_eq!(retrieved_user, inserted_user);
    }

    #[test]
    fn get_user_by_email_fails_with_unknown_email() {
        let connection = get_db_connection();
        create_user(test_user("alice@example.com"), &connection).unwrap();

        let result = get_user_by_email("bob@example.com", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn staff_flag_round_trips() {
        let connection = get_db_connection();
        let staff = NewUser {
            is_staff: true,
            ..test_user("staff@example.com")
        };
        let inserted_user = create_user(staff, &connection).unwrap();

        let retrieved_user = get_user_by_id(inserted_user.id, &connection).unwrap();

        assert!(retrieved_user.is_staff);
    }
}
