//! JSON document helpers shared by file-backed components.
//!
//! # Invariants
//! - A missing file reads as `None`, never as an error.
//! - Writes go to a sibling temp file and are renamed into place, so readers
//!   never observe a half-written document.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum JsonFileError {
    Io { path: PathBuf, source: std::io::Error },
    Serde { path: PathBuf, source: serde_json::Error },
}

impl Display for JsonFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error on `{}`: {source}", path.display()),
            Self::Serde { path, source } => {
                write!(f, "invalid json in `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for JsonFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serde { source, .. } => Some(source),
        }
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, JsonFileError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(JsonFileError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| JsonFileError::Serde {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), JsonFileError> {
    let io_err = |source: std::io::Error| JsonFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let payload = serde_json::to_vec_pretty(value).map_err(|source| JsonFileError::Serde {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    std::fs::write(&staging, payload).map_err(io_err)?;
    std::fs::rename(&staging, path).map_err(io_err)?;
    Ok(())
}
