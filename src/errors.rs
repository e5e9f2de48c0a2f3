use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by the analyzer entry points.
///
/// Semantic oddities inside analyzed programs never become `Error`s; they
/// degrade to diagnostic values inside the analysis instead. This type covers
/// the boundary failures only: unreadable files, unparseable sources, bad
/// configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error in {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("file system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn file_system(message: impl Into<String>) -> Self {
        Error::FileSystem {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    pub fn file_read(path: &Path, source: std::io::Error) -> Self {
        Error::FileSystem {
            message: format!("failed to read {}", path.display()),
            path: Some(path.to_path_buf()),
            source: Some(source),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
