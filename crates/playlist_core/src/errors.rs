use std::fmt;
use std::io;

use thiserror::Error;

/// Coarse classification of a remote failure, independent of HTTP shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Transient,
    Permanent,
    Authorization,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiErrorKind::Transient => "transient",
            ApiErrorKind::Permanent => "permanent",
            ApiErrorKind::Authorization => "authorization",
        };
        f.write_str(label)
    }
}

const TRANSIENT_REASONS: [&str; 3] = ["quotaExceeded", "rateLimitExceeded", "userRateLimitExceeded"];

impl ApiErrorKind {
    pub fn from_status(status: u16, reason: Option<&str>) -> Self {
        match status {
            401 => ApiErrorKind::Authorization,
            403 if reason.is_some_and(|r| TRANSIENT_REASONS.contains(&r)) => {
                ApiErrorKind::Transient
            }
            403 => ApiErrorKind::Authorization,
            429 | 500..=599 => ApiErrorKind::Transient,
            _ => ApiErrorKind::Permanent,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("invalid playlist reference: {0}")]
    InvalidPlaylist(String),
    #[error("network request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error ({kind}, status={status}): {message}")]
    Api {
        kind: ApiErrorKind,
        status: u16,
        message: String,
    },
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl PlaylistError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            PlaylistError::Api { kind, .. } => *kind,
            PlaylistError::Request(err) if err.is_timeout() || err.is_connect() => {
                ApiErrorKind::Transient
            }
            PlaylistError::Request(err) => err
                .status()
                .map(|status| ApiErrorKind::from_status(status.as_u16(), None))
                .unwrap_or(ApiErrorKind::Transient),
            _ => ApiErrorKind::Permanent,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no usable credentials: {0}")]
    MissingCredentials(String),
    #[error("client secrets file is invalid: {0}")]
    InvalidSecrets(String),
    #[error("failed to read credentials: {0}")]
    Io(#[from] io::Error),
    #[error("authorization was denied: {0}")]
    Denied(String),
    #[error("authorization callback rejected: {0}")]
    Callback(String),
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

/// A fetch that stopped part-way. Pages observed before the failure are discarded.
#[derive(Debug, Error)]
#[error("playlist fetch aborted after {pages_fetched} page(s): {source}")]
pub struct FetchError {
    pub pages_fetched: usize,
    #[source]
    pub source: PlaylistError,
}

impl FetchError {
    pub fn kind(&self) -> ApiErrorKind {
        self.source.kind()
    }
}

/// Failure of a single move. Recorded per item; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {reason}")]
pub struct MoveError {
    pub kind: ApiErrorKind,
    pub reason: String,
}

impl From<PlaylistError> for MoveError {
    fn from(err: PlaylistError) -> Self {
        Self {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SortError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("playlist {playlist_id} has no items")]
    EmptyPlaylist { playlist_id: String },
    #[error("playlist operation failed: {0}")]
    Core(#[from] PlaylistError),
    #[error("sort run failed: {0}")]
    Context(String),
}

impl SortError {
    pub fn context<T: Into<String>>(self, message: T) -> Self {
        let message = message.into();
        match self {
            SortError::Context(existing) => SortError::Context(format!("{message}: {existing}")),
            other => SortError::Context(format!("{message}: {other}")),
        }
    }
}
