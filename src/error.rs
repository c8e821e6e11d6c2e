use std::io;
use thiserror::Error;

/// Errors produced by the token store and the reconciliation loop.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Store operation attempted while the actor loop is not running.
    #[error("token store not running")]
    NotRunning,

    #[error("token store already running")]
    AlreadyRunning,

    /// No entry for the name, or the stored secret is empty.
    #[error("unknown token name {0}")]
    NotFound(String),

    #[error("unable to read token '{name}' from '{path}': {source}")]
    ReadFailure {
        name: String,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to load config: {0}")]
    ConfigLoadFailure(String),
}

pub type Result<T> = std::result::Result<T, TokenError>;
