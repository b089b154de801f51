//! Cookie-backed sessions. The cookie carries only the user id and is signed
//! with the key derived in [`AppState::new`](crate::state::AppState::new);
//! a missing, unsigned or tampered cookie reads as logged out.

use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use findit_types::models::User;

use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "findit_session";

pub fn login(jar: SignedCookieJar, user_id: i64) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

pub fn logout(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn session_user_id(jar: &SignedCookieJar) -> Option<i64> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

pub fn is_logged_in(jar: &SignedCookieJar) -> bool {
    session_user_id(jar).is_some()
}

/// The user the session points at, if that user still exists.
pub async fn current_user(state: &AppState, jar: &SignedCookieJar) -> Result<Option<User>, ApiError> {
    match session_user_id(jar) {
        Some(id) => state.with_db(move |db| db.get_user_by_id(id)).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    #[test]
    fn login_then_logout() {
        let jar = SignedCookieJar::new(Key::generate());
        assert!(!is_logged_in(&jar));

        let jar = login(jar, 42);
        assert!(is_logged_in(&jar));
        assert_eq!(session_user_id(&jar), Some(42));

        let jar = logout(jar);
        assert!(!is_logged_in(&jar));
    }
}
