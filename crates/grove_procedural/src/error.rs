//! # Procedural Error Types
//!
//! Generation itself cannot fail. These cover the fallible edges around it:
//! configuration loading and the modification store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur outside the generation pass.
#[derive(Error, Debug)]
pub enum GroveError {
    /// Filesystem failure reading or writing a store or config file.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for [`crate::GenerationConfig`].
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but a value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stored modification blob could not be decoded.
    #[error("corrupt modification record for chunk ({cx}, {cz}): {reason}")]
    CorruptModifications {
        /// Chunk X.
        cx: i32,
        /// Chunk Z.
        cz: i32,
        /// What was wrong with it.
        reason: String,
    },

    /// The modification source is not reachable right now.
    #[error("modification source unavailable: {0}")]
    SourceUnavailable(String),
}

impl GroveError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for fallible procedural operations.
pub type GroveResult<T> = Result<T, GroveError>;
