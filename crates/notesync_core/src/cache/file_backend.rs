//! JSON file cache backend.

use crate::cache::local_cache::{CacheBackend, CacheResult, CacheSnapshot};
use crate::json_file::{read_json, write_json_atomic};
use std::path::{Path, PathBuf};

/// Stores the snapshot as one JSON document, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileCacheBackend {
    path: PathBuf,
}

impl JsonFileCacheBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheBackend for JsonFileCacheBackend {
    fn get(&self) -> CacheResult<Option<CacheSnapshot>> {
        Ok(read_json(&self.path)?)
    }

    fn set(&mut self, snapshot: &CacheSnapshot) -> CacheResult<()> {
        write_json_atomic(&self.path, snapshot)?;
        Ok(())
    }
}
