/// Errors surfaced by transport operations.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The server refused the command and said why.
    Rejected(String),
    /// Unexpected HTTP status with no usable reason.
    Status(u16),
    /// Network or decode failure at the transport boundary.
    Transport(String),
}

impl ApiError {
    /// The server-provided reason when present, else the fallback.
    pub fn reason_or(&self, fallback: &str) -> String {
        match self {
            Self::Rejected(reason) if !reason.is_empty() => reason.clone(),
            _ => fallback.to_string(),
        }
    }
    /// Whether this is a connectivity problem rather than a refusal.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "rejected: {}", reason),
            Self::Status(code) => write!(f, "unexpected status: {}", code),
            Self::Transport(detail) => write!(f, "transport failure: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
