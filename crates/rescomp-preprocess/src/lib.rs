pub mod error;
pub mod interpreter;
pub mod process;
pub mod registry;

// Re-exports
pub use error::{PreprocessError, RegistryError};
pub use interpreter::{InterpreterTable, Launcher};
pub use registry::{default_registry_dir, Preprocessor, Registry};
