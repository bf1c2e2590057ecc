//! Error types shared by the OAuth, catalogue and persistence layers.

use thiserror::Error;

/// Failure talking to the remote side at the transport level.
///
/// Cancellation is kept apart from every other transport fault so callers that
/// imposed a deadline can tell "we gave up" from "the network broke".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request was cancelled before a response arrived")]
    Cancelled,

    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Missing or placeholder client credentials. Raised before any request is sent.
    #[error("spotify credentials are not configured: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: u16, body: String },

    #[error("catalogue query failed with status {status}: {body}")]
    CatalogueQuery { status: u16, body: String },

    /// A 2xx response that lacks the field the caller needs.
    #[error("unexpected response body: {body}")]
    MalformedResponse { body: String },

    #[error("oauth state did not match the state issued for this session")]
    StateMismatch,

    #[error("failed to build authorize url: {0}")]
    AuthorizeUrl(String),
}

impl SpotifyError {
    /// True when the underlying request was abandoned through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SpotifyError::Transport(TransportError::Cancelled))
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    /// A row with the same key already exists.
    #[error("duplicate record {0}")]
    Duplicate(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
