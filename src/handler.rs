//! HTTP request handlers for the URL shortener API
//!
//! This module implements:
//! - Registration, login and logout backed by the signed session cookie
//! - Creating, showing, editing and deleting short URLs owned by the caller
//! - Redirecting short URLs and tracking visits
//! - The error page used by clients to look up error messages

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde_json::json;

use crate::access::{can_access, unique_visitor_count, urls_owned_by};
use crate::database::AppState;
use crate::error::{resolve_error_message, Action, AppError, ErrorCode};
use crate::keygen::random_key;
use crate::middleware::CurrentUser;
use crate::model::{
    CreateResponse, Credentials, ErrorQuery, OwnedUrl, UrlRecord, UrlRequest, UserResponse,
    VisitEvent,
};
use crate::password::{hash_password, verify_password};
use crate::session;

/// Creates a new user and logs them in
///
/// # Response
///
/// - **201 Created** - user created, session cookie set
/// - **400 Bad Request** - email or password empty, or email already registered
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(Action::Register));
    }
    if state.store.user_by_email(&payload.email)?.is_some() {
        return Err(AppError::BadRequest(Action::Register));
    }

    let password_hash = hash_password(&payload.password)?;

    // The store re-checks the email inside its write transaction
    let user = state
        .store
        .register_user(&payload.email, password_hash)?
        .ok_or(AppError::BadRequest(Action::Register))?;

    tracing::info!(user_id = %user.id, "user registered");

    let mut session = session::load(&jar);
    session.user_id = Some(user.id.clone());
    let jar = session::save(jar, &session, state.session_max_age)?;

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(&user))))
}

/// Logs a user in with email and password
///
/// # Response
///
/// - **200 OK** - session cookie set
/// - **400 Bad Request** - email or password empty
/// - **401 Unauthorized** - unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(Action::Login));
    }

    let user = state
        .store
        .user_by_email(&payload.email)?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "wrong password");
        return Err(AppError::Unauthorized);
    }

    let mut session = session::load(&jar);
    session.user_id = Some(user.id.clone());
    let jar = session::save(jar, &session, state.session_max_age)?;

    Ok((jar, Json(UserResponse::from(&user))))
}

/// Clears the authenticated user from the session, keeping the visitor id
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let mut session = session::load(&jar);
    session.logout();
    let jar = session::save(jar, &session, state.session_max_age)?;

    Ok((jar, Json(json!({ "message": "Logged out" }))))
}

/// Lists the caller's URLs with their unique visitor counts
///
/// # Response
///
/// ```json
/// {
///   "b2xVn2": {
///     "long_url": "http://www.lighthouselabs.ca",
///     "owner_user_id": "userRandomID",
///     "created_date": "8/21/2022",
///     "visit_histories": [...],
///     "unique_visitors": 2
///   }
/// }
/// ```
pub async fn list_urls(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let urls = state.store.urls()?;
    Ok(Json(urls_owned_by(&user_id, &urls)))
}

/// Creates a new short URL owned by the caller
///
/// # Response
///
/// - **201 Created** - URL successfully created
pub async fn create_url(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<UrlRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = UrlRecord::new(payload.long_url, user_id);
    let id = state.store.create_url(&record)?;

    tracing::info!(id = %id, owner = %record.owner_user_id, "short url created");

    let response = CreateResponse {
        id,
        long_url: record.long_url,
        created_date: record.created_date,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Shows one of the caller's URLs
///
/// # Response
///
/// - **200 OK** - the record with its unique visitor count
/// - **403 Forbidden** - unknown key or owned by someone else
pub async fn show_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let mut urls = state.store.urls()?;
    if !can_access(&user_id, &id, &urls) {
        return Err(AppError::Forbidden);
    }

    let record = urls.remove(&id).ok_or(AppError::Forbidden)?;
    Ok(Json(OwnedUrl {
        unique_visitors: unique_visitor_count(&record),
        record,
    }))
}

/// Replaces the long URL of one of the caller's URLs
///
/// # Response
///
/// - **200 OK** - URL updated
/// - **403 Forbidden** - unknown key or owned by someone else
pub async fn update_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<UrlRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state
        .store
        .update_owned_url(&user_id, &id, &payload.long_url)?
    {
        return Err(AppError::Forbidden);
    }

    tracing::info!(id = %id, "short url updated");
    Ok(Json(json!({
        "message": "Short link updated successfully",
        "updated_id": id
    })))
}

/// Deletes one of the caller's URLs
///
/// # Response
///
/// - **200 OK** - URL deleted
/// - **403 Forbidden** - unknown key or owned by someone else
pub async fn delete_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_owned_url(&user_id, &id)? {
        return Err(AppError::Forbidden);
    }

    tracing::info!(id = %id, "short url deleted");
    Ok(Json(json!({
        "message": "Short link deleted successfully",
        "deleted_id": id
    })))
}

/// Redirects a short URL to its original destination and records the visit
///
/// A browser without a visitor id gets one assigned in its session first, so
/// repeated visits from the same browser count as one unique visitor.
///
/// # Response
///
/// - **307 Temporary Redirect** - Redirects to the original URL
/// - **404 Not Found** - Short URL does not exist
pub async fn redirect_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let mut session = session::load(&jar);
    let visitor_id = session.visitor_id.get_or_insert_with(random_key).clone();

    let long_url = state
        .store
        .record_visit(&id, VisitEvent::now(visitor_id))?
        .ok_or(AppError::NotFound)?;

    let jar = session::save(jar, &session, state.session_max_age)?;
    Ok((jar, Redirect::temporary(&long_url)))
}

/// Renders the message for an error code
///
/// The failing action is passed explicitly, e.g. `GET /error/400?action=register`.
/// Unknown codes respond with 404 and the generic message.
pub async fn error_page(
    Path(code): Path<String>,
    Query(params): Query<ErrorQuery>,
) -> impl IntoResponse {
    let status = ErrorCode::from_status(&code)
        .map(ErrorCode::status_code)
        .unwrap_or(StatusCode::NOT_FOUND);

    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "message": resolve_error_message(&code, params.action)
        })),
    )
}

/// Fallback for every unknown route
pub async fn not_found() -> AppError {
    AppError::NotFound
}
