//! Defines the route handler for logging out the current user.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        endpoints,
        user::UserId,
    };

    use super::get_log_out;

    #[tokio::test]
    async fn invalidates_cookie_and_redirects() {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);
        let jar = set_auth_cookie(
            PrivateCookieJar::new(key),
            UserId::new(1),
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let response = get_log_out(jar).await;

        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("set-cookie header missing")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with(COOKIE_TOKEN));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
