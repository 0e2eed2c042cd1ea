//! Error types for openatlogin-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while resolving the environment or encoding a descriptor.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, tagged with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Property list encode/decode failure.
    #[error("plist error: {0}")]
    Plist(#[from] plist::Error),

    /// `dirs::home_dir()` returned `None` — cannot locate `~/Library/LaunchAgents`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
