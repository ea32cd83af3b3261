// Load-time error type. Analysis itself never fails; only acquiring the
// lexicon, dictionary or scoring model can.

use std::path::PathBuf;

/// Result alias defaulting to [`LoadError`].
pub type Result<T, E = LoadError> = std::result::Result<T, E>;

/// Failure to acquire one of the static input tables.
///
/// Fatal at startup: an analyser is never built from a partially loaded
/// lexicon.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source is not valid JSON.
    #[error("{source_name}: malformed JSON: {source}")]
    Json {
        source_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON is valid but the table does not have the expected shape.
    #[error("{source_name}: {msg}")]
    InvalidFormat {
        source_name: &'static str,
        msg: String,
    },

    /// A category occurs more than once in the rule table.
    #[error("rules: category {0:?} appears more than once in the ordering")]
    DuplicateCategory(String),

    /// The scoring model or its vocabulary has inconsistent dimensions.
    #[error("model: {0}")]
    InvalidModel(String),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(source_name: &'static str, source: serde_json::Error) -> Self {
        Self::Json {
            source_name,
            source,
        }
    }

    pub(crate) fn invalid_format<S>(source_name: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat {
            source_name,
            msg: msg.into(),
        }
    }

    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(msg.into())
    }
}
