use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0} credential missing")]
    MissingCredential(&'static str),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unexpected response code {status}: {body}")]
    UnexpectedResponseCode { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Session has been closed")]
    SessionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConnectError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ConnectError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn unexpected_status(status: u16, body: &str) -> Self {
        ConnectError::UnexpectedResponseCode {
            status,
            body: Self::truncate_body(body),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        ConnectError::InvalidParameter(message.into())
    }

    /// Status code carried by the error, if it came from an HTTP response
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectError::UnexpectedResponseCode { status, .. } => Some(*status),
            ConnectError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
