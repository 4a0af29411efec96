//! Defines the route handler for the 404 not found page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Display the 404 not found page.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Sorry, we couldn't find that page.",
            "Check the address, or head back to the campaigns page.",
        ),
    )
        .into_response()
}
