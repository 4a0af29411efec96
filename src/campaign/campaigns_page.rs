//! Defines the route handler for the public page that lists all campaigns.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    endpoints::format_endpoint,
    html::{PAGE_CONTAINER_STYLE, base, format_currency, link, progress_bar},
    navigation::NavBar,
};

use super::{Campaign, get_all_campaigns};

/// The state needed for the campaigns page.
#[derive(Debug, Clone)]
pub struct CampaignsViewState {
    /// The database connection for reading campaigns.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CampaignsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display all campaigns with their progress towards their goals.
pub async fn get_campaigns_page(
    State(state): State<CampaignsViewState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let campaigns = get_all_campaigns(&connection)
        .inspect_err(|error| tracing::error!("could not get campaigns: {error}"))?;

    Ok(campaigns_view(&campaigns).into_response())
}

fn campaigns_view(campaigns: &[Campaign]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CAMPAIGNS_VIEW, false).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-2xl font-bold mb-6" { "Campaigns" }

            @if campaigns.is_empty() {
                p
                {
                    "No campaigns are running right now. Check back soon!"
                }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 gap-4 w-full max-w-screen-lg"
                {
                    @for campaign in campaigns {
                        (campaign_card(campaign))
                    }
                }
            }
        }
    );

    base("Campaigns", &[], &content)
}

fn campaign_card(campaign: &Campaign) -> Markup {
    let donate_url = format_endpoint(endpoints::DONATE_VIEW, campaign.id);
    let percent = campaign.progress_percent();

    html!(
        div class="bg-white rounded-lg shadow p-6 dark:bg-gray-800"
        {
            h3 class="text-xl font-semibold mb-2" { (campaign.title) }

            p class="text-sm text-gray-600 dark:text-gray-400 mb-2"
            {
                (format_currency(campaign.raised_amount))
                " raised of "
                (format_currency(campaign.goal_amount))
                " goal"
            }

            (progress_bar(percent))

            p class="text-sm text-gray-600 dark:text-gray-400 mt-2 mb-4"
            {
                (format!("{percent:.0}% funded"))
            }

            (link(&donate_url, "Donate"))
        }
    )
}

#[cfg(test)]
mod campaigns_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        campaign::create_campaign,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{CampaignsViewState, get_campaigns_page};

    fn get_test_state() -> CampaignsViewState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CampaignsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn displays_campaigns_with_progress_bars() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_campaign("Clean Water", 1000.0, &connection).unwrap();
            create_campaign("Warm Meals", 500.0, &connection).unwrap();
        }

        let response = get_campaigns_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.html();
        assert!(text.contains("Clean Water"));
        assert!(text.contains("Warm Meals"));

        let progress_bars = Selector::parse("div[role='progressbar']").unwrap();
        assert_eq!(html.select(&progress_bars).count(), 2);
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_campaigns() {
        let state = get_test_state();

        let response = get_campaigns_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("No campaigns are running right now"));
    }
}
