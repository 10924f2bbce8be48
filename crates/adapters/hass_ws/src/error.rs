//! WebSocket adapter error types.

use deckhand_domain::error::RemoteCommandError;

/// Errors specific to the WebSocket transport.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    /// The connection attempt failed.
    #[error("websocket connect failed")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    /// The established stream broke.
    #[error("websocket transport error")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The remote store refused the access token.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// A frame that does not parse as a known message.
    #[error("malformed message from remote store")]
    Malformed(#[from] serde_json::Error),

    /// The remote store answered a request with an error result.
    #[error("request {id} failed: {message}")]
    RequestFailed {
        /// Our message id the failure refers to.
        id: u64,
        /// Error message reported by the store.
        message: String,
    },

    /// The stream ended in the middle of the handshake.
    #[error("connection closed during handshake")]
    UnexpectedClose,
}

impl From<WsError> for RemoteCommandError {
    fn from(err: WsError) -> Self {
        Self::Unreachable(err.to_string())
    }
}
