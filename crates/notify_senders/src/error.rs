/// Error raised while building or driving a sender.
///
/// The variants mirror the dispatcher's propagation policy: config and
/// secret problems abort one alert's dispatch, remote failures are logged
/// and dropped.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("invalid provider configuration: {0}")]
    ConfigInvalid(String),

    #[error("secret missing: {0}")]
    SecretMissing(String),

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("remote rejected the request ({status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("remote returned server error ({status}): {body}")]
    RemoteError { status: u16, body: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl SendError {
    /// Stable kind label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SendError::MalformedInput(_) => "malformed-input",
            SendError::AuthFailed(_) => "auth-failed",
            SendError::ConfigInvalid(_) => "config-invalid",
            SendError::SecretMissing(_) => "secret-missing",
            SendError::RemoteUnavailable(_) => "remote-unavailable",
            SendError::RemoteRejected { .. } => "remote-rejected",
            SendError::RemoteError { .. } => "remote-error",
            SendError::Internal(_) => "internal",
        }
    }

    /// Whether another delivery attempt may succeed.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            SendError::RemoteUnavailable(_) | SendError::RemoteError { .. }
        )
    }
}
