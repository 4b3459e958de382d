use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the detection and generation core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("root directory is required")]
    MissingRoot,

    #[error("service catalog not found (searched {})", display_paths(.searched))]
    CatalogNotFound { searched: Vec<PathBuf> },

    #[error("parse service catalog {path:?}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid service catalog: {0}")]
    InvalidCatalog(String),

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid file pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("{action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} already exists")]
    AlreadyExists(String),
}

/// Coarse classification used by callers that only care about the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigMissing,
    Parse,
    Validation,
    Filesystem,
    Conflict,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CatalogNotFound { .. } => ErrorKind::ConfigMissing,
            Self::CatalogParse { .. } => ErrorKind::Parse,
            Self::MissingRoot
            | Self::InvalidCatalog(_)
            | Self::UnknownService(_)
            | Self::UnsupportedLanguage(_) => ErrorKind::Validation,
            Self::Pattern { .. } | Self::Io { .. } => ErrorKind::Filesystem,
            Self::AlreadyExists(_) => ErrorKind::Conflict,
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("{:?}", p))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
