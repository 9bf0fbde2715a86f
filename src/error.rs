//! Errors raised while selecting or loading a dialect profile.

use std::path::PathBuf;

use thiserror::Error;
use vsub_core::SyntaxError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("profile '{name}' not found in {}", .dir.display())]
    NotFound { name: String, dir: PathBuf },

    #[error("profile directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("profile '{name}' is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: SyntaxError,
    },
}
