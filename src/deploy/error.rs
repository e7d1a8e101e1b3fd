//! Errors raised before a deploy result can be classified

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeployError>;

/// Failures that stop the import pipeline before any report is produced
#[derive(Error, Debug)]
pub enum DeployError {
    /// The input path could not be turned into a usable root directory
    #[error("{0}")]
    Config(String),

    /// The manifest is missing from the root directory
    #[error(" \n{}\ndoes not exist", path.display())]
    NotFound { path: PathBuf },

    /// Walking or reading the source tree failed
    #[error("failed to read {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Packaging the file set into an archive failed
    #[error("failed to build deploy archive: {0}")]
    Archive(String),

    /// The remote call itself failed (network, auth, malformed response)
    #[error("{0}")]
    Transport(String),
}

impl DeployError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

impl From<reqwest::Error> for DeployError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<zip::result::ZipError> for DeployError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}
