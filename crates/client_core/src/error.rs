use reqwest::StatusCode;
use shared::error::ApiError;
use thiserror::Error;

const MAX_RAW_BODY_CHARS: usize = 240;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("session expired; sign in again")]
    SessionExpired,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store error: {0}")]
    Session(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Builds the error for a non-success response from its status and raw
    /// body. JSON error bodies are unwrapped to their message.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = error_message_from_body(status, body);
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            s if s.is_server_error() => ClientError::Server {
                status: s.as_u16(),
                message,
            },
            s => ClientError::Rejected {
                status: s.as_u16(),
                message,
            },
        }
    }

    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated
                | ClientError::SessionExpired
                | ClientError::Unauthorized(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Rejected { status, .. } | ClientError::Server { status, .. } => {
                Some(*status)
            }
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn error_message_from_body(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(api_error) = serde_json::from_str::<ApiError>(trimmed) {
        if !api_error.message.trim().is_empty() {
            return api_error.message;
        }
    }
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }
    let mut raw: String = trimmed.chars().take(MAX_RAW_BODY_CHARS).collect();
    if trimmed.chars().count() > MAX_RAW_BODY_CHARS {
        raw.push('…');
    }
    raw
}
