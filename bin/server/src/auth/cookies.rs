//! Session cookie handling.
//!
//! The cookie carries only the session ID; everything else stays server-side.
//! It is signed with the configured secret, so a forged or altered ID is
//! ignored as if no cookie were present.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use log_gateway_access::Session;
use log_gateway_core::SessionId;
use time::Duration as TimeDuration;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Reads the session ID from a verified session cookie.
#[must_use]
pub fn session_id(jar: &SignedCookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)?.value().parse().ok()
}

/// Builds the cookie for `session`, living exactly as long as the session.
#[must_use]
pub fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    let max_age = TimeDuration::seconds(session.remaining_lifetime().num_seconds());

    Cookie::build((SESSION_COOKIE, session.id().to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Cookie that clears the session cookie in the browser.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};
    use axum_extra::extract::cookie::Key;
    use chrono::Duration;

    #[test]
    fn session_cookie_attributes() {
        let session = Session::new(SessionId::new(), Duration::hours(24));
        let cookie = session_cookie(&session, true);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), session.id().to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let max_age = cookie.max_age().expect("max age").whole_seconds();
        assert!(max_age > 23 * 3600 && max_age <= 24 * 3600);
    }

    #[test]
    fn insecure_cookie_for_local_development() {
        let session = Session::new(SessionId::new(), Duration::hours(1));
        assert_eq!(session_cookie(&session, false).secure(), Some(false));
    }

    #[test]
    fn signed_cookie_yields_session_id() {
        let session = Session::new(SessionId::new(), Duration::hours(1));
        let jar = SignedCookieJar::new(Key::generate()).add(session_cookie(&session, true));

        assert_eq!(session_id(&jar), Some(session.id()));
    }

    #[test]
    fn unsigned_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        let forged = format!("{SESSION_COOKIE}={}", SessionId::new());
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&forged).expect("header"),
        );

        let jar = SignedCookieJar::from_headers(&headers, Key::generate());
        assert!(session_id(&jar).is_none());
    }
}
