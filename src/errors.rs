use std::io;

use thiserror::Error;

/// Error type for validation, store, and persistence failures.
#[derive(Debug, Error)]
pub enum LookupError {
    /// A required form field was blank after trimming; no store call is made.
    #[error("required field '{field}' is blank")]
    Validation {
        /// Name of the blank field (`acronym`, `definition`, or `team`).
        field: String,
    },
    /// The record store rejected a read, write, or subscription.
    #[error("record store failure: {reason}")]
    Store {
        /// Backend-reported failure detail.
        reason: String,
    },
    /// Filesystem failure while opening or preparing a store file.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid deployment configuration (e.g. a blank collection name).
    #[error("configuration error: {0}")]
    Configuration(String),
}
