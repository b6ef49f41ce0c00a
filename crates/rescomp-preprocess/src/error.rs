use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while building the preprocessor registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("preprocessor directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read preprocessor directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while running a single preprocessor.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to spawn preprocessor {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("preprocessor {program} terminated with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("IO error while talking to preprocessor {program}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
