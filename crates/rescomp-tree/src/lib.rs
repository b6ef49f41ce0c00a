pub mod error;
pub mod node;
pub mod resolve;
pub mod tree;
pub mod walker;

// Re-exports
pub use error::{Result, TreeError};
pub use node::{NodeIndex, NodeKind, ResourceNode, ROOT_PATH};
pub use resolve::{Deferred, PayloadResolver};
pub use tree::ResourceTree;
pub use walker::{SkippedEntry, Walker};
