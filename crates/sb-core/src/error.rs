use std::path::PathBuf;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building a roster or persisting the ledger.
///
/// None of these ever surface from inside a turn: roster loading skips bad
/// entries and keeps going, and only a missing source aborts.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The roster source (file or directory) could not be read.
    #[error("cannot read roster source {path}: {source}")]
    RosterSource {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        /// Where the document came from (file name or "inline").
        origin: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// An agent definition failed validation.
    #[error("invalid agent \"{name}\": {reason}")]
    InvalidAgent {
        /// The offending agent's name (may be empty).
        name: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// An agent with the same name is already on the roster.
    #[error("agent already on roster: \"{0}\"")]
    DuplicateAgent(String),

    /// Writing the ledger failed.
    #[error("ledger write failed: {0}")]
    LedgerWrite(#[from] std::io::Error),
}
