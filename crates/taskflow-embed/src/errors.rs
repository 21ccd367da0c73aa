//! Embedding error types.

use thiserror::Error;

/// Errors talking to the host page.
///
/// None of these are fatal: the handshake degrades to fallback credentials
/// and notifications are dropped with a warning.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EmbedError {
    /// The host side of the channel is gone.
    #[error("host channel closed")]
    ChannelClosed,

    /// The host did not answer in time.
    #[error("no credentials from host within {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The host answered with something that isn't valid credentials.
    #[error("malformed host message: {0}")]
    Malformed(String),

    /// Posting to the host failed.
    #[error("failed to post to host: {0}")]
    Post(String),
}

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            EmbedError::Timeout { timeout_ms: 3000 }.to_string(),
            "no credentials from host within 3000ms"
        );
        assert_eq!(EmbedError::ChannelClosed.to_string(), "host channel closed");
    }
}
