use std::path::PathBuf;

/// Failures that abort a query. Individual malformed records are not errors:
/// sources skip and count them.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("tweet file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("invalid tweet file {}: {reason}", path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("archive {} contains no entries", path.display())]
    EmptyArchive { path: PathBuf },

    #[error("i/o error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The input could not be located or opened.
    Input,
    /// The input exists but could not be decoded.
    Data,
    /// Caller-supplied settings were rejected.
    Usage,
    Internal,
}

impl QueryError {
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            Self::NotFound { .. } | Self::Io { .. } => QueryErrorKind::Input,
            Self::InvalidFormat { .. } | Self::EmptyArchive { .. } => QueryErrorKind::Data,
            Self::Config(_) => QueryErrorKind::Usage,
            Self::Worker(_) => QueryErrorKind::Internal,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        Self::Io { path, source }
    }

    pub(crate) fn invalid_format(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for QueryError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
