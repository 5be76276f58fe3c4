use std::fmt;
use std::io;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    Unreachable,
    UnexpectedStatus(u16),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::InvalidCredentials => f.write_str("invalid credentials"),
            AuthFailure::Unreachable => f.write_str("Jira site unreachable"),
            AuthFailure::UnexpectedStatus(status) => write!(f, "unexpected status {status}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    FieldWrite,
    Transition,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStage::FieldWrite => f.write_str("field-write"),
            UpdateStage::Transition => f.write_str("transition"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("login failed: {reason}")]
    Auth { reason: AuthFailure },
    #[error("unauthorized, please log in first")]
    Unauthorized,
    #[error("invalid status transition: \"{requested_value}\"")]
    InvalidTransition { requested_value: String },
    #[error("Jira responded with {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("failed to update ticket in Jira ({stage})")]
    UpdateFailed { stage: UpdateStage, details: Value },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// HTTP status reported to dashboard clients.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) | AppError::InvalidTransition { .. } => 400,
            AppError::Unauthorized => 401,
            AppError::Auth {
                reason: AuthFailure::InvalidCredentials,
            } => 401,
            AppError::Auth { .. }
            | AppError::Upstream { .. }
            | AppError::UpdateFailed { .. }
            | AppError::Configuration(_)
            | AppError::Io(_) => 500,
        }
    }

    /// Structured remote payload attached to the error, if any.
    pub fn details(&self) -> Option<Value> {
        match self {
            AppError::UpdateFailed { details, .. } => Some(details.clone()),
            AppError::Upstream { body, .. } => {
                Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())))
            }
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
