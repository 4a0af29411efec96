//! Staff dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    AppState, Error,
    dashboard::{
        DonationRecord,
        charts::{DashboardChart, campaign_funds_chart, charts_script, charts_view},
        query::{get_campaign_chart_data, get_total_raised, search_donations},
    },
    endpoints,
    html::{
        FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, currency_rounded_with_tooltip, format_currency,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading donations and campaigns.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the dashboard page.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Text to match against donor names and campaign titles.
    pub q: Option<String>,
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    total_raised: f64,
    charts: Vec<DashboardChart>,
    donations: Vec<DonationRecord>,
}

/// Display the staff overview page with totals, charts, and the donation search.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(search): Query<SearchQuery>,
) -> Result<Response, Error> {
    let query = search
        .q
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty());

    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(query, &connection)?;

    Ok(dashboard_view(query, &data, local_offset).into_response())
}

/// Fetches and builds all data needed for the dashboard display.
fn build_dashboard_data(
    query: Option<&str>,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let total_raised = get_total_raised(connection)
        .inspect_err(|error| tracing::error!("could not get total raised: {error}"))?;

    let chart_data = get_campaign_chart_data(connection)
        .inspect_err(|error| tracing::error!("could not get campaign chart data: {error}"))?;

    let charts = if chart_data.is_empty() {
        Vec::new()
    } else {
        vec![DashboardChart {
            id: "campaign-funds-chart",
            options: campaign_funds_chart(&chart_data).to_string(),
        }]
    };

    let donations = search_donations(query, connection)
        .inspect_err(|error| tracing::error!("could not search donations: {error}"))?;

    Ok(DashboardData {
        total_raised,
        charts,
        donations,
    })
}

fn dashboard_view(query: Option<&str>, data: &DashboardData, local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, true).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h2 class="text-2xl font-bold mb-2" { "Dashboard" }

                p class="text-lg mb-6"
                {
                    "Total raised across all campaigns: "
                    span class="font-semibold"
                    {
                        (currency_rounded_with_tooltip(data.total_raised))
                    }
                }

                (charts_view(&data.charts))

                (search_form_view(query))

                (donations_table_view(&data.donations, local_offset))
            }
        }
    );

    let mut scripts = Vec::new();
    if !data.charts.is_empty() {
        scripts.push(HeadElement::ScriptLink(
            "/static/echarts.6.0.0.min.js".to_owned(),
        ));
        scripts.push(charts_script(&data.charts));
    }

    base("Dashboard", &scripts, &content)
}

fn search_form_view(query: Option<&str>) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="mb-4 flex gap-2 max-w-md"
        {
            input
                id="q"
                type="search"
                name="q"
                placeholder="Search by donor or campaign"
                value=(query.unwrap_or(""))
                class=(FORM_TEXT_INPUT_STYLE);

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Search"
            }
        }
    )
}

fn donations_table_view(donations: &[DonationRecord], local_offset: UtcOffset) -> Markup {
    html!(
        @if donations.is_empty() {
            p class="text-gray-600 dark:text-gray-400"
            {
                "No donations found."
            }
        } @else {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Donor" }
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
                            td class=(TABLE_CELL_STYLE) { (donation.donor_name) }
                            td class=(TABLE_CELL_STYLE) { (donation.campaign_title) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(donation.amount)) }
                            td class=(TABLE_CELL_STYLE) { (donation.created_at.to_offset(local_offset).date()) }
                        }
                    }
                }
            }
        }
    )
}
