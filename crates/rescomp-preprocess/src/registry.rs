use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{PreprocessError, RegistryError};
use crate::interpreter::{InterpreterTable, Launcher};
use crate::process;

/// Name of the registry directory next to the compiler executable.
pub const REGISTRY_DIR_NAME: &str = "rc";

/// `<extension>_<description>`; the extension part holds no `_`, `.` or separators.
fn candidate_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<ext>[^_./\\]+)_(?P<desc>.+)$").expect("candidate name regex is valid")
    })
}

/// Default registry location: `<directory of the running executable>/rc`.
pub fn default_registry_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(REGISTRY_DIR_NAME))
}

/// An external content transformer registered for one file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessor {
    /// File extension this preprocessor handles (without the dot)
    pub extension: String,
    /// Free-form part of the candidate name after the first `_`
    pub description: String,
    /// Path of the candidate executable or script
    pub program: PathBuf,
    /// How the candidate is started
    pub launcher: Launcher,
}

impl Preprocessor {
    /// Display name used in diagnostics.
    pub fn name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Feed `input` to the preprocessor and return its complete standard output.
    pub fn run(&self, input: &[u8]) -> Result<Vec<u8>, PreprocessError> {
        process::run(self, input)
    }
}

/// Immutable extension → preprocessor mapping, built once before traversal.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Preprocessor>,
}

impl Registry {
    /// A registry without any preprocessor; every file is embedded as is.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `dir` for preprocessor candidates.
    ///
    /// Candidates are visited in lexicographic file-name order and the first
    /// registration of an extension wins. A missing directory yields an empty
    /// registry.
    pub fn load(dir: &Path, interpreters: &InterpreterTable) -> Result<Self, RegistryError> {
        if !dir.exists() {
            log::debug!("no preprocessor directory at {}", dir.display());
            return Ok(Self::empty());
        }
        if !dir.is_dir() {
            return Err(RegistryError::NotADirectory(dir.to_path_buf()));
        }

        let io_err = |source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            candidates.push(entry.path());
        }
        candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut registry = Self::empty();
        for path in candidates {
            registry.consider(path, interpreters);
        }

        log::debug!(
            "loaded {} preprocessor(s) from {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    fn consider(&mut self, path: PathBuf, interpreters: &InterpreterTable) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("ignoring preprocessor with non UTF-8 name {}", path.display());
            return;
        };
        if name.starts_with('.') {
            return;
        }
        if !path.is_file() {
            log::warn!("ignoring preprocessor candidate {}: not a regular file", path.display());
            return;
        }

        let Some(caps) = candidate_name_re().captures(name) else {
            log::warn!(
                "ignoring preprocessor candidate {}: name is not <extension>_<description>",
                path.display()
            );
            return;
        };
        let extension = caps["ext"].to_string();
        let description = caps["desc"].to_string();

        if let Some(existing) = self.entries.get(&extension) {
            log::warn!(
                "preprocessor {} ignored: extension {:?} already handled by {}",
                name,
                extension,
                existing.name()
            );
            return;
        }

        let launcher = interpreters.launcher_for(&path);
        log::debug!("registered preprocessor {} for .{}", name, extension);
        self.entries.insert(
            extension.clone(),
            Preprocessor {
                extension,
                description,
                program: path,
                launcher,
            },
        );
    }

    /// Register a preprocessor programmatically. First registration wins.
    pub fn register(&mut self, preprocessor: Preprocessor) -> bool {
        if self.entries.contains_key(&preprocessor.extension) {
            return false;
        }
        self.entries
            .insert(preprocessor.extension.clone(), preprocessor);
        true
    }

    /// Preprocessor registered for an extension (without the dot).
    pub fn get(&self, extension: &str) -> Option<&Preprocessor> {
        self.entries.get(extension)
    }

    /// Preprocessor that applies to the final extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<&Preprocessor> {
        let ext = path.extension()?.to_str()?;
        self.get(ext)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered preprocessors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Preprocessor> {
        self.entries.values()
    }
}
