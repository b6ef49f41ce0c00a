pub mod context;
pub mod error;
pub mod escape;
pub mod generator;
pub mod options;
pub mod traits;

// Target emitters
pub mod emitters;

// Re-exports
pub use context::{EmitContext, IndentStyle};
pub use error::CodegenError;
pub use generator::CodeGenerator;
pub use options::{EmitOptions, Target};
pub use traits::TargetEmitter;
