use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not authorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Category {0} is locked")]
    CategoryLocked(i64),
}

/// Why an authentication attempt was refused, as far as the server tells us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    PendingApproval,
    Blocked,
    Other(String),
}

impl PortalError {
    /// Build an error from a non-success HTTP status and the response body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortalError::Unauthorized {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => PortalError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                PortalError::Validation(message)
            }
            _ => PortalError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortalError::Unauthorized { status: 401, .. })
    }

    /// Classify an authorization failure. Returns `None` for errors that are
    /// not about credentials or account state.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        let message = match self {
            PortalError::Unauthorized { message, .. } => message,
            PortalError::NotFound(message) => message,
            PortalError::Validation(message) => message,
            _ => return None,
        };

        let lowered = message.to_lowercase();
        if lowered.contains("blocked") {
            Some(AuthFailure::Blocked)
        } else if lowered.contains("pending") || lowered.contains("not approved") {
            Some(AuthFailure::PendingApproval)
        } else if lowered.contains("password")
            || lowered.contains("credentials")
            || lowered.contains("not found")
            || matches!(self, PortalError::Unauthorized { status: 401, .. })
        {
            Some(AuthFailure::InvalidCredentials)
        } else {
            Some(AuthFailure::Other(message.clone()))
        }
    }

    /// Text shown to the user in a notice or toast.
    pub fn user_message(&self) -> String {
        match self.auth_failure() {
            Some(AuthFailure::InvalidCredentials) => "Invalid email or password".to_string(),
            Some(AuthFailure::PendingApproval) => {
                "Your account is awaiting approval by an administrator".to_string()
            }
            Some(AuthFailure::Blocked) => "Your account has been blocked".to_string(),
            Some(AuthFailure::Other(message)) if !message.is_empty() => message,
            _ => match self {
                PortalError::Validation(message) => message.clone(),
                PortalError::CategoryLocked(_) => {
                    "This category is locked and cannot be edited".to_string()
                }
                _ => "Something went wrong, please try again".to_string(),
            },
        }
    }
}

/// Servers answer errors as `{"message": "..."}`; fall back to the raw body.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Decode(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for PortalError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        PortalError::Decode(format!("invalid token: {}", err))
    }
}
