pub mod cpp;
pub mod rust_lang;

use crate::options::Target;
use crate::traits::TargetEmitter;

/// Create the emitter for the given target.
pub fn create_emitter(target: Target) -> Box<dyn TargetEmitter> {
    match target {
        Target::Cpp => Box::new(cpp::CppEmitter),
        Target::Rust => Box::new(rust_lang::RustEmitter),
    }
}
