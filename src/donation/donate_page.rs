//! Defines the route handler for the page where a donor makes a donation.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::{Connection, Row};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error,
    campaign::{Campaign, CampaignId, get_campaign},
    endpoints,
    endpoints::format_endpoint,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        dollar_input_styles, format_currency, progress_bar,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// How many of a campaign's most recent donations are shown on the donate page.
const RECENT_DONATIONS_LIMIT: usize = 5;

/// A donation to a campaign with the donor's display name, for the recent
/// donations list.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RecentDonation {
    /// The display name of the donor.
    pub donor_name: String,
    /// The amount of money donated.
    pub amount: f64,
    /// When the donation was made, in UTC.
    pub created_at: OffsetDateTime,
}

/// Retrieve a campaign's most recent donations with donor names, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub(super) fn get_recent_campaign_donations(
    campaign_id: CampaignId,
    limit: usize,
    connection: &Connection,
) -> Result<Vec<RecentDonation>, Error> {
    connection
        .prepare(
            "SELECT u.name, d.amount, d.created_at
             FROM donation d
             INNER JOIN user u ON u.id = d.donor_id
             WHERE d.campaign_id = :campaign_id
             ORDER BY d.created_at DESC, d.id DESC
             LIMIT :limit",
        )?
        .query_map(
            rusqlite::named_params! {
                ":campaign_id": campaign_id,
                ":limit": limit as i64,
            },
            map_recent_donation_row,
        )?
        .map(|maybe_donation| maybe_donation.map_err(|error| error.into()))
        .collect()
}

fn map_recent_donation_row(row: &Row) -> Result<RecentDonation, rusqlite::Error> {
    Ok(RecentDonation {
        donor_name: row.get(0)?,
        amount: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// The state needed for the donate page.
#[derive(Debug, Clone)]
pub struct DonateViewState {
    /// The database connection for reading the campaign and its donations.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DonateViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a campaign's progress and the donation form.
pub async fn get_donate_page(
    State(state): State<DonateViewState>,
    Path(campaign_id): Path<CampaignId>,
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

    let campaign = get_campaign(campaign_id, &connection)?;
    let recent_donations =
        get_recent_campaign_donations(campaign_id, RECENT_DONATIONS_LIMIT, &connection)
            .inspect_err(|error| tracing::error!("could not get recent donations: {error}"))?;

    Ok(donate_view(&campaign, &recent_donations, local_offset).into_response())
}

fn donate_view(
    campaign: &Campaign,
    recent_donations: &[RecentDonation],
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CAMPAIGNS_VIEW, false).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md"
            {
                h2 class="text-2xl font-bold mb-4" { "Donate to " (campaign.title) }

                (campaign_progress_view(campaign, false))

                (recent_donations_view(recent_donations, local_offset, false))

                (donate_form_view(campaign.id, "", None))
            }
        }
    );

    base("Donate", &[dollar_input_styles()], &content)
}

/// The campaign's goal, running total, and progress bar.
///
/// Rendered with a stable element ID so the donation endpoint can refresh it
/// with an out-of-band swap. Pass `oob` as `true` to mark the fragment for an
/// out-of-band swap.
pub(super) fn campaign_progress_view(campaign: &Campaign, oob: bool) -> Markup {
    let percent = campaign.progress_percent();

    html!(
        section id="campaign-progress" class="mb-6" hx-swap-oob=[oob.then_some("true")]
        {
            p class="text-sm text-gray-600 dark:text-gray-400 mb-2"
            {
                (format_currency(campaign.raised_amount))
                " raised of "
                (format_currency(campaign.goal_amount))
                " goal"
            }

            (progress_bar(percent))

            p class="text-sm text-gray-600 dark:text-gray-400 mt-2"
            {
                (format!("{percent:.0}% funded"))
            }
        }
    )
}

/// The campaign's most recent donations.
///
/// Rendered with a stable element ID so the donation endpoint can refresh it
/// with an out-of-band swap. Pass `oob` as `true` to mark the fragment for an
/// out-of-band swap.
pub(super) fn recent_donations_view(
    recent_donations: &[RecentDonation],
    local_offset: UtcOffset,
    oob: bool,
) -> Markup {
    html!(
        div id="recent-donations" class="mb-6" hx-swap-oob=[oob.then_some("true")]
        {
            h3 class="text-lg font-semibold mb-2" { "Recent donations" }

            @if recent_donations.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Be the first to donate!"
                }
            } @else {
                ul class="space-y-1"
                {
                    @for donation in recent_donations {
                        li class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            span class="font-medium text-gray-900 dark:text-white"
                            {
                                (donation.donor_name)
                            }
                            " donated "
                            (format_currency(donation.amount))
                            " on "
                            (donation.created_at.to_offset(local_offset).date())
                        }
                    }
                }
            }
        }
    )
}

/// The donation form, optionally with an error message below the amount field.
pub(super) fn donate_form_view(
    campaign_id: CampaignId,
    amount: &str,
    error_message: Option<&str>,
) -> Markup {
    let donation_endpoint = format_endpoint(endpoints::POST_DONATION, campaign_id);

    html!(
        form
            hx-post=(donation_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="amount"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        placeholder="25.00"
                        step="0.01"
                        min="0.01"
                        required
                        autofocus
                        value=(amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if let Some(error_message) = error_message {
                    p class="text-red-600 dark:text-red-400"
                    {
                        (error_message)
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Donate" }
        }
    )
}
