//! Defines the endpoint that handles donation form submissions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::AlertTemplate,
    campaign::{CampaignId, get_campaign},
    donation::{
        donate_page::{
            campaign_progress_view, donate_form_view, get_recent_campaign_donations,
            recent_donations_view,
        },
        submit_donation,
    },
    html::format_currency,
    timezone::get_local_offset,
    user::UserId,
};

/// How many of a campaign's most recent donations are refreshed after a donation.
const RECENT_DONATIONS_LIMIT: usize = 5;

/// The state needed for submitting a donation.
#[derive(Debug, Clone)]
pub struct DonateEndpointState {
    /// The database connection for writing the donation.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DonateEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for submitting a donation.
///
/// The amount is kept as a raw string so that validation produces a typed
/// error rather than a framework-level rejection.
#[derive(Debug, Serialize, Deserialize)]
pub struct DonationForm {
    /// The raw amount entered by the donor.
    pub amount: String,
}

/// Handle donation form submission.
///
/// On success, responds with a fresh donation form plus out-of-band swaps
/// that refresh the campaign progress, the recent donations list, and show a
/// success alert carrying the donor's lifetime impact. On an invalid amount,
/// the form is re-rendered with an error message and nothing is written.
pub async fn create_donation_endpoint(
    State(state): State<DonateEndpointState>,
    Path(campaign_id): Path<CampaignId>,
    Extension(donor_id): Extension<UserId>,
    Form(donation_form): Form<DonationForm>,
) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            tracing::error!("Invalid timezone {}", state.local_timezone);
            return Error::InvalidTimezoneError(state.local_timezone.clone()).into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let receipt = match submit_donation(campaign_id, donor_id, &donation_form.amount, &connection)
    {
        Ok(receipt) => receipt,
        Err(Error::InvalidAmount(_)) => {
            return donate_form_view(
                campaign_id,
                &donation_form.amount,
                Some("Invalid amount. Please enter a valid number."),
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while submitting a donation: {error}");

            return error.into_alert_response();
        }
    };

    // Requery so the refreshed fragments show the committed state.
    let campaign = match get_campaign(campaign_id, &connection) {
        Ok(campaign) => campaign,
        Err(error) => {
            tracing::error!("could not reload campaign after donation: {error}");
            return error.into_alert_response();
        }
    };
    let recent_donations =
        match get_recent_campaign_donations(campaign_id, RECENT_DONATIONS_LIMIT, &connection) {
            Ok(recent_donations) => recent_donations,
            Err(error) => {
                tracing::error!("could not reload recent donations: {error}");
                return error.into_alert_response();
            }
        };

    let details = format!(
        "You donated {} to {}. Your lifetime impact is now {}!",
        format_currency(receipt.donation.amount),
        campaign.title,
        format_currency(receipt.lifetime_total),
    );

    html!(
        (donate_form_view(campaign_id, "", None))

        (campaign_progress_view(&campaign, true))

        (recent_donations_view(&recent_donations, local_offset, true))

        (AlertTemplate::success("Thank you!", &details).into_oob_markup())
    )
    .into_response()
}
