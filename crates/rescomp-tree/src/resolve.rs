use std::path::Path;

use rescomp_preprocess::Registry;

use crate::error::{Result, TreeError};

/// Computes the embedded bytes of a file node.
pub trait PayloadResolver {
    /// `source` is the file on disk, `path` its `/`-separated path from the scan root.
    fn resolve(&self, source: &Path, path: &str) -> Result<Vec<u8>>;
}

impl PayloadResolver for Registry {
    fn resolve(&self, source: &Path, path: &str) -> Result<Vec<u8>> {
        let raw = std::fs::read(source).map_err(|e| TreeError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

        match self.for_path(Path::new(path)) {
            Some(preprocessor) => {
                log::info!("preprocessing file {:?} with {}", path, preprocessor.name());
                preprocessor.run(&raw).map_err(|e| TreeError::Preprocess {
                    path: path.to_string(),
                    source: e,
                })
            }
            None => {
                log::info!("including file {:?} as is", path);
                Ok(raw)
            }
        }
    }
}

/// Leaves every payload empty; used when payloads are resolved after the walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deferred;

impl PayloadResolver for Deferred {
    fn resolve(&self, _source: &Path, _path: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}
