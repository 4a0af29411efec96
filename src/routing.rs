//! Application router configuration with public, donor, and staff route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in, staff_guard},
    campaign::get_campaigns_page,
    dashboard::get_dashboard_page,
    donation::{create_donation_endpoint, get_donate_page, get_profile_page},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    register_user::{get_register_page, register_user},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CAMPAIGNS_VIEW, get(get_campaigns_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let donor_routes = Router::new()
        .route(endpoints::DONATE_VIEW, get(get_donate_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // This POST route needs to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let donor_routes = donor_routes.merge(
        Router::new()
            .route(endpoints::POST_DONATION, post(create_donation_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    // The staff guard runs after the auth guard, which inserts the user ID it checks.
    let staff_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .layer(middleware::from_fn_with_state(state.clone(), staff_guard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    donor_routes
        .merge(staff_routes)
        .merge(public_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the campaigns page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CAMPAIGNS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_campaigns() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::CAMPAIGNS_VIEW);
    }
}
