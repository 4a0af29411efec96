//! Defines the route handler for the donor's profile page showing their
//! donation history and lifetime impact.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::{Connection, Row};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error, endpoints,
    donation::get_lifetime_impact,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    user::UserId,
};

/// A donation with its campaign title, for the donor's history table.
#[derive(Debug, Clone, PartialEq)]
struct DonationHistoryRow {
    /// The title of the campaign the donation was made to.
    campaign_title: String,
    /// The amount of money donated.
    amount: f64,
    /// When the donation was made, in UTC.
    created_at: OffsetDateTime,
}

/// Retrieve a donor's donations with campaign titles, newest first.
fn get_donation_history(
    donor_id: UserId,
    connection: &Connection,
) -> Result<Vec<DonationHistoryRow>, Error> {
    connection
        .prepare(
            "SELECT c.title, d.amount, d.created_at
             FROM donation d
             INNER JOIN campaign c ON c.id = d.campaign_id
             WHERE d.donor_id = :donor_id
             ORDER BY d.created_at DESC, d.id DESC",
        )?
        .query_map(
            &[(":donor_id", &donor_id.as_i64())],
            map_donation_history_row,
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_donation_history_row(row: &Row) -> Result<DonationHistoryRow, rusqlite::Error> {
    Ok(DonationHistoryRow {
        campaign_title: row.get(0)?,
        amount: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfileViewState {
    /// The database connection for reading the donor's donations.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ProfileViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the logged-in donor's donation history and lifetime impact.
pub async fn get_profile_page(
    State(state): State<ProfileViewState>,
    Extension(donor_id): Extension<UserId>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let donations = get_donation_history(donor_id, &connection)
        .inspect_err(|error| tracing::error!("could not get donation history: {error}"))?;
    let total_impact = get_lifetime_impact(donor_id, &connection)
        .inspect_err(|error| tracing::error!("could not get lifetime impact: {error}"))?;

    Ok(profile_view(&donations, total_impact, local_offset).into_response())
}

fn profile_view(
    donations: &[DonationHistoryRow],
    total_impact: f64,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW, false).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md"
            {
                h2 class="text-2xl font-bold mb-2" { "My Impact" }

                p class="text-lg mb-6"
                {
                    "Lifetime impact: "
                    span class="font-semibold" { (format_currency(total_impact)) }
                }

                @if donations.is_empty() {
                    p
                    {
                        "You haven't donated yet. Browse the "
                        (link(endpoints::CAMPAIGNS_VIEW, "campaigns"))
                        " to make your first donation."
                    }
                } @else {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Campaign" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            }
                        }

                        tbody
                        {
                            @for donation in donations {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (donation.campaign_title) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(donation.amount)) }
                                    td class=(TABLE_CELL_STYLE) { (donation.created_at.to_offset(local_offset).date()) }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("My Impact", &[], &content)
}
