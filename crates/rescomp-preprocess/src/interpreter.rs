use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Interpreters used when no override is configured, keyed by the
/// preprocessor script's own extension.
const BUILTIN_INTERPRETERS: &[(&str, &str)] = &[
    ("js", "node"),
    ("pl", "perl"),
    ("py", "python3"),
    ("rb", "ruby"),
    ("sh", "sh"),
];

/// How a preprocessor executable gets started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// Execute the candidate file itself.
    Direct,
    /// Run the candidate file as the first argument of an interpreter.
    Interpreter(PathBuf),
}

impl Launcher {
    /// Build the command that runs `program` through this launcher.
    pub fn command(&self, program: &Path) -> Command {
        match self {
            Launcher::Direct => Command::new(program),
            Launcher::Interpreter(interpreter) => {
                let mut command = Command::new(interpreter);
                command.arg(program);
                command
            }
        }
    }
}

/// Maps a script extension (e.g. `py`) to the program that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterTable {
    by_extension: BTreeMap<String, String>,
}

impl Default for InterpreterTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl InterpreterTable {
    /// Table with the built-in interpreter choices.
    pub fn builtin() -> Self {
        let by_extension = BUILTIN_INTERPRETERS
            .iter()
            .map(|(ext, program)| (ext.to_string(), program.to_string()))
            .collect();
        Self { by_extension }
    }

    /// Table without any interpreter: every candidate is executed directly.
    pub fn empty() -> Self {
        Self {
            by_extension: BTreeMap::new(),
        }
    }

    /// Add or replace the interpreter for one script extension.
    pub fn with_override(mut self, extension: impl Into<String>, program: impl Into<String>) -> Self {
        self.by_extension.insert(extension.into(), program.into());
        self
    }

    /// Interpreter program configured for the given script, if any.
    pub fn lookup(&self, script: &Path) -> Option<&str> {
        let ext = script.extension()?.to_str()?;
        self.by_extension.get(ext).map(String::as_str)
    }

    /// Decide how to start `script`, resolving the interpreter on `PATH`.
    ///
    /// An interpreter that cannot be found is kept by name so that the
    /// failure surfaces when the preprocessor is actually spawned.
    pub fn launcher_for(&self, script: &Path) -> Launcher {
        let Some(program) = self.lookup(script) else {
            return Launcher::Direct;
        };

        match which::which(program) {
            Ok(resolved) => Launcher::Interpreter(resolved),
            Err(e) => {
                log::warn!(
                    "interpreter {} for {} not found on PATH: {}",
                    program,
                    script.display(),
                    e
                );
                Launcher::Interpreter(PathBuf::from(program))
            }
        }
    }
}
