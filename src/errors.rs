//! Generator errors

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Debug, Error)]
pub enum GenError {
    /// The function uses a feature the glue cannot express
    #[error("cannot expose `{function}`: {reason}")]
    Unsupported { function: String, reason: String },

    /// A signature that is malformed rather than merely unsupported
    #[error("invalid signature for `{function}`: {reason}")]
    InvalidSignature { function: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no symbol information for module `{module}` in {}", .directory.display())]
    NoSymbols { module: String, directory: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed symbol file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl GenError {
    pub fn unsupported(function: &str, reason: impl Into<String>) -> Self {
        Self::Unsupported { function: function.to_string(), reason: reason.into() }
    }

    pub fn invalid(function: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSignature { function: function.to_string(), reason: reason.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
