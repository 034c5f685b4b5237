//! Cookie plumbing shared by the credential endpoints and the pages.

use std::sync::Arc;

use tower_cookies::{
    Cookie, Cookies,
    cookie::{SameSite as CookieSameSite, time::Duration as CookieDuration},
};

use crate::{
    AppState,
    config::TokenCookieConfig,
    session::{SessionMirror, SessionUser},
};

pub(crate) fn token_cookie(
    config: &TokenCookieConfig,
    value: String,
    max_age: CookieDuration,
) -> Cookie<'static> {
    Cookie::build((config.name.clone(), value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(CookieSameSite::from(&config.same_site))
        .max_age(max_age)
        .build()
}

/// Session mirror bound to this response's cookies.
///
/// The mirror is not `Send`; build and drop it without crossing an await.
pub(crate) fn with_mirror<R>(
    state: &AppState,
    cookies: &Cookies,
    f: impl FnOnce(&SessionMirror) -> R,
) -> R {
    let mirror = SessionMirror::new(
        Arc::new(cookies.clone()),
        state.observers.clone(),
        &state.config.auth.session_cookie,
    );
    f(&mirror)
}

pub(crate) fn read_session(state: &AppState, cookies: &Cookies) -> Option<SessionUser> {
    with_mirror(state, cookies, SessionMirror::read)
}

/// Expire the token cookie and clear the mirror.
pub(crate) fn end_session(state: &AppState, cookies: &Cookies) {
    cookies.add(token_cookie(
        &state.config.auth.token_cookie,
        String::new(),
        CookieDuration::ZERO,
    ));
    with_mirror(state, cookies, SessionMirror::clear);
}

/// Only same-site paths are followed after sign-in.
pub(crate) fn safe_return_path(from: Option<&str>) -> Option<&str> {
    from.map(str::trim)
        .filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/dashboard/admin")), Some("/dashboard/admin"));
        assert_eq!(safe_return_path(Some("//evil.example")), None);
        assert_eq!(safe_return_path(Some("/\\evil.example")), None);
        assert_eq!(safe_return_path(Some("https://evil.example")), None);
        assert_eq!(safe_return_path(None), None);
    }
}
