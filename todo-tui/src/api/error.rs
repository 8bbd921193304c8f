use serde::Deserialize;
use thiserror::Error;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 403. Handled globally by the shell.
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,
    #[error("{}", server_message(.status, .message))]
    Server { status: u16, message: Option<String> },
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response from {call}: {reason}")]
    Decode { call: String, reason: String },
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn server_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => m.clone(),
        None => format!("Server error ({status})"),
    }
}

impl ApiError {
    /// Classify a non-success response. 403 always means the session is gone;
    /// anything else keeps the body's `message` field when there is one.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if status == 403 {
            return ApiError::SessionExpired;
        }
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());
        ApiError::Server { status, message }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// The server-provided message, or `fallback` for everything else.
    /// Used by the login form, which never shows raw status codes.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(m), ..
            } => m.clone(),
            _ => fallback.to_string(),
        }
    }
}
