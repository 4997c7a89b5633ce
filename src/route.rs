//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.
//! It creates the Axum router with the application state.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    create_url, delete_url, error_page, list_urls, login, logout, not_found, redirect_url,
    register, show_url, update_url,
};
use crate::middleware::require_login;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `POST /register`, `POST /login`, `POST /logout` - session management
/// - `GET /urls` - Lists the caller's URLs (login required)
/// - `POST /urls` - Creates a new short URL (login required)
/// - `GET|PUT|DELETE /urls/{id}` - Shows, edits or deletes an owned URL (login required)
/// - `GET /u/{id}` - Redirects to the original URL (public endpoint)
/// - `GET /error/{code}` - Error message lookup
///
/// # Example Usage
///
/// ```no_run
/// # use axum_extra::extract::cookie::Key;
/// # use tinylink::database::{init_db, AppState, Store};
/// # use tinylink::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState {
///     store: Store::new(db),
///     cookie_key: Key::generate(),
///     session_max_age: time::Duration::days(1),
/// };
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    // Routes that require a logged-in session
    let url_routes = Router::new()
        .route("/urls", get(list_urls).post(create_url))
        .route(
            "/urls/{id}",
            get(show_url).put(update_url).delete(delete_url),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        // Public redirect endpoint - converts short URL to original URL
        .route("/u/{id}", get(redirect_url))
        .route("/error/{code}", get(error_page))
        .merge(url_routes)
        .fallback(not_found)
        .with_state(state)
}
