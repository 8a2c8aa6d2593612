use thiserror::Error;

use crate::clients::rate_limit::RateLimitSnapshot;

/// Errors produced by the source-control layer.
///
/// Provider operations with a degrade-gracefully contract never surface these
/// directly; they log them and hand back an empty or failed value instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed remote url: {url}")]
    MalformedUrl { url: String },

    #[error("malformed git log line ({reason}): {line}")]
    MalformedLogLine { line: String, reason: &'static str },

    #[error("GitHub API rate limit exhausted: {0}")]
    RateLimitExceeded(RateLimitSnapshot),

    #[error("GitHub API error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("unexpected GitHub API payload (status {status}): {body}")]
    MalformedPayload { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("remote is unreachable: {url}")]
    UnreachableRemote { url: String },

    #[error("refusing git argument that starts with '-': {value}")]
    OptionLikeArgument { value: String },
}

impl Error {
    pub(crate) fn transport(err: anyhow::Error) -> Self {
        Self::Transport(format!("{err:#}"))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
