use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rescomp_codegen::Target;
use serde::Deserialize;

/// Config file picked up from the working directory when `-c` is not given.
pub const CONFIG_FILE_NAME: &str = "rescomp.config.json";

/// Contents of `rescomp.config.json`. Every key is optional; command-line
/// flags take precedence over it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerConfig {
    /// Preprocessor directory, relative to the config file
    pub rc_dir: Option<PathBuf>,
    pub target: Option<Target>,
    pub namespace: Option<String>,
    pub guard: Option<String>,
    pub row_width: Option<usize>,
    pub jobs: Option<usize>,
    /// Extension of a preprocessor script to the program that runs it
    #[serde(default)]
    pub interpreters: BTreeMap<String, String>,
}

impl CompilerConfig {
    /// Parse a config file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config: CompilerConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;

        if let (Some(rc_dir), Some(base)) = (&config.rc_dir, path.parent()) {
            if rc_dir.is_relative() {
                config.rc_dir = Some(base.join(rc_dir));
            }
        }
        Ok(config)
    }

    /// Load the explicit config file, or `rescomp.config.json` from `cwd` if
    /// there is one.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let implicit = cwd.join(CONFIG_FILE_NAME);
                if implicit.is_file() {
                    log::debug!("using config file {}", implicit.display());
                    Self::load(&implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
