//! Alert partials for displaying success and error messages to users.
//!
//! Alerts are rendered as fragments targeted at the `#alert-container`
//! element in the base layout, either via `hx-target-error` or an
//! out-of-band swap.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertType {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling
pub struct AlertTemplate<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    /// Render the alert as a maud fragment.
    pub fn into_markup(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/alerts/
        let container_style = match self.alert_type {
            AlertType::Success => {
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                shadow-lg dark:bg-gray-800 dark:text-green-400"
            }
            AlertType::Error => {
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                shadow-lg dark:bg-gray-800 dark:text-red-400"
            }
        };

        html!(
            div class=(container_style) role="alert"
            {
                span class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    " " (self.details)
                }
            }
        )
    }

    /// Render the alert wrapped for an out-of-band swap into `#alert-container`.
    ///
    /// Append this to a normal response body to display the alert without
    /// changing the response's main swap target.
    pub fn into_oob_markup(self) -> Markup {
        html!(
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (self.into_markup())
            }
        )
    }
}

/// Render an alert fragment as a response with the given status code.
pub fn render(status_code: StatusCode, alert: AlertTemplate) -> Response {
    (status_code, alert.into_markup()).into_response()
}
