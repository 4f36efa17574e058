use thiserror::Error;

/// Failure classes surfaced by the client core. Validation never leaves the
/// client; everything else is the normalized form of a network, server, or
/// gateway failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("No authentication token found. Please log in.")]
    AuthRequired,
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    ServerRejected { status: u16, message: String },
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
    #[error("Payment verification failed: {0}")]
    VerificationFailed(String),
}

impl ClientError {
    /// True when the error means the stored token is missing or no longer
    /// accepted, i.e. the session must be cleared and the user sent back to
    /// the authentication screen.
    pub fn is_auth_loss(&self) -> bool {
        match self {
            ClientError::AuthRequired => true,
            ClientError::ServerRejected { status, message } => {
                *status == 401 || message == "Invalid token"
            }
            _ => false,
        }
    }
}
