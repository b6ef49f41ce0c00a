use std::path::PathBuf;

use rescomp_preprocess::PreprocessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("root directory not found: {path}")]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to preprocess {path}")]
    Preprocess {
        path: String,
        #[source]
        source: PreprocessError,
    },

    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("tree invariant violated: {0}")]
    Invariant(String),

    #[error("failed to start preprocessing pool: {0}")]
    Pool(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;
