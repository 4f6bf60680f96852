use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Read failed: {0}")]
    ReadError(String),

    #[error("Submission failed: {0}")]
    SubmissionError(String),

    #[error("Confirmation failed: {0}")]
    ConfirmationError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Wallet not connected: {0}")]
    WalletNotConnected(String),

    #[error("Operation already in progress: {0}")]
    Busy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("TLS configuration error: {0}")]
    Tls(String),
}

impl AdminError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AdminError::UnsupportedNetwork(_) => "UNSUPPORTED_NETWORK",
            AdminError::NotFound(_) => "NOT_FOUND",
            AdminError::ReadError(_) => "READ_ERROR",
            AdminError::SubmissionError(_) => "SUBMISSION_ERROR",
            AdminError::ConfirmationError(_) => "CONFIRMATION_ERROR",
            AdminError::InvalidAddress(_) => "INVALID_ADDRESS",
            AdminError::InvalidAmount(_) => "INVALID_AMOUNT",
            AdminError::WalletNotConnected(_) => "WALLET_NOT_CONNECTED",
            AdminError::Busy(_) => "BUSY",
            AdminError::Unauthorized(_) => "FORBIDDEN",
            AdminError::Config(_)
            | AdminError::Crypto(_)
            | AdminError::InvalidKey(_)
            | AdminError::Internal(_)
            | AdminError::Tls(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure came from operator input rather than the chain or the host
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AdminError::InvalidAddress(_) | AdminError::InvalidAmount(_)
        )
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        AdminError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Internal(format!("JSON error: {err}"))
    }
}

impl From<hex::FromHexError> for AdminError {
    fn from(err: hex::FromHexError) -> Self {
        AdminError::Crypto(format!("Hex decode error: {err}"))
    }
}
