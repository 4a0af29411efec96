//! Creates a database with demo campaigns, donors, and donations.
//!
//! Campaigns and staff accounts are provisioned out-of-band of the web app,
//! and this binary is the supported way to do that for local development.

use clap::Parser;
use rusqlite::Connection;

use donateur_rs::{
    Campaign, NewUser, PasswordHash, User, UserId, create_campaign, create_user, initialize_db,
    submit_donation,
};

/// Create a database populated with demo data for local development.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path at which to create the SQLite database.
    #[arg(long)]
    db_path: String,

    /// The password for every demo account.
    #[arg(long, default_value = "a demo password only")]
    password: String,
}

fn main() {
    let args = Args::parse();

    let connection = Connection::open(&args.db_path).expect("Could not create database file.");
    initialize_db(&connection).expect("Could not initialize the database.");

    let password_hash = PasswordHash::from_raw_password(&args.password, PasswordHash::DEFAULT_COST)
        .expect("Could not hash the demo password.");

    let staff = create_demo_user("Staff", "staff@example.com", true, &password_hash, &connection);
    let alice = create_demo_user("Alice", "alice@example.com", false, &password_hash, &connection);
    let bob = create_demo_user("Bob", "bob@example.com", false, &password_hash, &connection);

    let campaigns = create_demo_campaigns(&connection);

    seed_donations(&campaigns, &[alice.id, bob.id], &connection);

    println!(
        "Created demo database at {} with staff account {} and donors {}, {}.",
        args.db_path, staff.email, alice.email, bob.email
    );
}

fn create_demo_user(
    name: &str,
    email: &str,
    is_staff: bool,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> User {
    create_user(
        NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: password_hash.clone(),
            is_staff,
        },
        connection,
    )
    .expect("Could not create demo user.")
}

fn create_demo_campaigns(connection: &Connection) -> Vec<Campaign> {
    [
        ("Clean Water for Kapiti", 5000.0),
        ("Warm Meals", 1200.0),
        ("Community Library Fund", 0.0),
    ]
    .into_iter()
    .map(|(title, goal_amount)| {
        create_campaign(title, goal_amount, connection).expect("Could not create demo campaign.")
    })
    .collect()
}

fn seed_donations(campaigns: &[Campaign], donors: &[UserId], connection: &Connection) {
    let amounts = ["25", "12.50", "100", "7.5", "40"];

    for (i, raw_amount) in amounts.iter().enumerate() {
        let campaign = &campaigns[i % campaigns.len()];
        let donor_id = donors[i % donors.len()];

        submit_donation(campaign.id, donor_id, raw_amount, connection)
            .expect("Could not create demo donation.");
    }
}
