//! Signed cookie sessions
//!
//! The whole [`Session`] is stored client side as base64url-encoded JSON in a
//! cookie signed with the application key. A cookie that fails verification
//! or decoding is treated as an empty session.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::model::Session;

pub const SESSION_COOKIE: &str = "session";

/// Reads the session from the jar, falling back to an empty one
pub fn load(jar: &SignedCookieJar) -> Session {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

/// Writes the session into the jar with the given max-age
pub fn save(
    jar: SignedCookieJar,
    session: &Session,
    max_age: time::Duration,
) -> Result<SignedCookieJar, serde_json::Error> {
    let cookie = Cookie::build((SESSION_COOKIE, encode(session)?))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age);

    Ok(jar.add(cookie))
}

pub fn encode(session: &Session) -> Result<String, serde_json::Error> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(session)?))
}

pub fn decode(value: &str) -> Option<Session> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}
