//! Data models for the URL shortener application
//!
//! This module defines all the data structures used throughout the application,
//! including request/response models and database record structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Action;

/// Represents a short URL stored in the database
///
/// The short key itself is not part of the record; it is the key the record
/// is stored under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// The original long URL the short key redirects to
    pub long_url: String,

    /// Id of the user who created this URL
    /// Used for authorization and filtering URLs by owner
    pub owner_user_id: String,

    /// Creation date in en-US locale format (e.g., "8/21/2022")
    pub created_date: String,

    /// Every redirect traversal, oldest first
    /// Defaults to empty if not present during deserialization
    #[serde(default)]
    pub visit_histories: Vec<VisitEvent>,
}

impl UrlRecord {
    /// Creates a record owned by `owner_user_id` with today's date and no visits
    pub fn new(long_url: String, owner_user_id: String) -> Self {
        Self {
            long_url,
            owner_user_id,
            created_date: Utc::now().format("%-m/%-d/%Y").to_string(),
            visit_histories: Vec::new(),
        }
    }
}

/// A single redirect traversal
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VisitEvent {
    /// Per-browser pseudo identity taken from the visitor's session
    pub visitor_id: String,

    /// When the redirect happened
    pub time: DateTime<Utc>,
}

impl VisitEvent {
    pub fn now(visitor_id: String) -> Self {
        Self {
            visitor_id,
            time: Utc::now(),
        }
    }
}

/// A registered user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,

    /// Unique across all users
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,
}

/// Per-browser session state carried in the signed `session` cookie
///
/// A missing key and an explicit `null` both deserialize to `None`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Authenticated user, cleared on logout
    #[serde(default)]
    pub user_id: Option<String>,

    /// Visitor identity used for redirect tracking, survives logout
    #[serde(default)]
    pub visitor_id: Option<String>,
}

impl Session {
    /// Drops the authenticated identity and keeps the visitor id
    pub fn logout(&mut self) {
        self.user_id = None;
    }
}

/// A URL record as shown to its owner, enriched with visit statistics
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OwnedUrl {
    #[serde(flatten)]
    pub record: UrlRecord,

    /// Number of distinct visitor ids in `visit_histories`
    pub unique_visitors: usize,
}

/// Request payload for registration and login
///
/// # Example
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "purple-monkey-dinosaur"
/// }
/// ```
///
/// Missing fields are treated as empty strings so that they are rejected
/// with the same message as blank ones.
#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Public view of a user returned after register/login
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

/// Request payload for creating or editing a short URL
///
/// # Example
/// ```json
/// {
///   "long_url": "https://example.com/very/long/url"
/// }
/// ```
#[derive(Deserialize)]
pub struct UrlRequest {
    pub long_url: String,
}

/// Response returned after successfully creating a short URL
///
/// # Example
/// ```json
/// {
///   "id": "b2xVn2",
///   "long_url": "https://example.com/very/long/url",
///   "created_date": "1/17/2026"
/// }
/// ```
#[derive(Serialize)]
pub struct CreateResponse {
    /// The generated short key
    pub id: String,

    pub long_url: String,

    pub created_date: String,
}

/// Query parameters for the error page
///
/// # Example
/// Query string: `?action=login`
#[derive(Deserialize)]
pub struct ErrorQuery {
    /// The action that failed, if the caller knows it
    pub action: Option<Action>,
}
