//! Cookie-based authentication: tokens, guards, and the log-in/log-out routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx, staff_guard};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub(super) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::{AuthState, StaffState};
