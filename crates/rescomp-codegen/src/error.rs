use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("invalid {what} identifier: {value:?}")]
    InvalidIdentifier { what: &'static str, value: String },

    #[error("row width must be at least 1")]
    InvalidRowWidth,

    #[error("node {path:?} has index {found}, expected {expected}")]
    OutOfOrder {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("node {path:?} references child {child} before it was emitted")]
    ForwardReference { path: String, child: usize },

    #[error("node sequence does not end with the root directory")]
    MissingRoot,
}
