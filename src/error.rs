//! Error types and user-facing error messages
//!
//! Client messages come from a single table keyed by the error code and the
//! action that failed. The action is always passed explicitly by the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::database::StoreError;
use crate::password::PasswordError;

pub const MSG_REGISTER_INVALID: &str =
    "The Email or password might be empty, or the email is already existing.";
pub const MSG_LOGIN_EMPTY: &str = "The Email or password might be empty.";
pub const MSG_BAD_CREDENTIALS: &str =
    "The Email or password is NOT correct, or the email is NOT existing.";
pub const MSG_FORBIDDEN: &str = "You can not access this page.";
pub const MSG_NOT_FOUND: &str = "The page is NOT Found.";

/// The user action an error originated from
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Register,
    Login,
}

/// Error codes that have their own messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl ErrorCode {
    /// Parses a numeric status such as `"403"`; `None` for anything unknown
    pub fn from_status(status: &str) -> Option<Self> {
        match status.trim() {
            "400" => Some(Self::BadRequest),
            "401" => Some(Self::Unauthorized),
            "403" => Some(Self::Forbidden),
            "404" => Some(Self::NotFound),
            _ => None,
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Message table
///
/// A bad request without a known action has no specific message and falls
/// back to the generic not-found text, like any unknown code.
pub fn message_for(code: ErrorCode, action: Option<Action>) -> &'static str {
    match (code, action) {
        (ErrorCode::BadRequest, Some(Action::Register)) => MSG_REGISTER_INVALID,
        (ErrorCode::BadRequest, Some(Action::Login)) => MSG_LOGIN_EMPTY,
        (ErrorCode::Unauthorized, _) => MSG_BAD_CREDENTIALS,
        (ErrorCode::Forbidden, _) => MSG_FORBIDDEN,
        (ErrorCode::BadRequest, None) | (ErrorCode::NotFound, _) => MSG_NOT_FOUND,
    }
}

/// Resolves the message for a raw status code string
pub fn resolve_error_message(status: &str, action: Option<Action>) -> &'static str {
    ErrorCode::from_status(status)
        .map(|code| message_for(code, action))
        .unwrap_or(MSG_NOT_FOUND)
}

/// Errors returned by request handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request during {0:?}")]
    BadRequest(Action),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Session encoding error: {0}")]
    Session(#[from] serde_json::Error),
}

impl AppError {
    fn code_and_action(&self) -> Option<(ErrorCode, Option<Action>)> {
        match self {
            AppError::BadRequest(action) => Some((ErrorCode::BadRequest, Some(*action))),
            AppError::Unauthorized => Some((ErrorCode::Unauthorized, Some(Action::Login))),
            AppError::Forbidden => Some((ErrorCode::Forbidden, None)),
            AppError::NotFound => Some((ErrorCode::NotFound, None)),
            AppError::Store(_) | AppError::Password(_) | AppError::Session(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.code_and_action() {
            Some((code, action)) => (code.status_code(), message_for(code, action)),
            None => {
                // Details stay in the server log
                tracing::error!(error = %self, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(json!({
                "error": status.canonical_reason().unwrap_or("Error"),
                "message": message
            })),
        )
            .into_response()
    }
}
