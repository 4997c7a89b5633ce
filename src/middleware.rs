use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::access::is_authenticated;
use crate::error::AppError;
use crate::session;

/// Id of the logged-in user, inserted into request extensions by [`require_login`]
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

/// Middleware that rejects requests without an authenticated session
///
/// Requests whose session carries no user id get a 403 response. Otherwise
/// the user id is made available to handlers as `Extension<CurrentUser>`.
/// Ownership of individual records is checked by the handlers themselves.
pub async fn require_login(
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = session::load(&jar);
    if !is_authenticated(&session) {
        tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
        return Err(AppError::Forbidden);
    }

    if let Some(user_id) = session.user_id {
        request.extensions_mut().insert(CurrentUser(user_id));
    }

    Ok(next.run(request).await)
}
