//! Named-schematic lookup.
//!
//! The engine never defines its own storage; it consumes whatever block list
//! a source returns for a name. The directory source reads `{name}.json`
//! files laid out the way the map editor exports them; the memory source
//! backs tests and embedded definitions.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::BlockRecord;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to read schematic file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schematic file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider of named block lists.
///
/// `Ok(None)` means the name is unknown; errors are reserved for sources
/// that found the name but could not produce the list.
pub trait SchematicSource {
    fn try_get(
        &self,
        name: &str,
        folder: Option<&str>,
    ) -> Result<Option<Vec<BlockRecord>>, LookupError>;
}

/// On-disk schematic document
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchematicDocument {
    pub blocks: Vec<BlockRecord>,
}

/// Source reading `{name}.json` documents under a base directory, with an
/// optional per-request subfolder
pub struct DirectorySource {
    base: PathBuf,
}

impl DirectorySource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn path_for(&self, name: &str, folder: Option<&str>) -> PathBuf {
        let dir = match folder {
            Some(folder) => self.base.join(folder),
            None => self.base.clone(),
        };
        dir.join(format!("{name}.json"))
    }
}

impl SchematicSource for DirectorySource {
    fn try_get(
        &self,
        name: &str,
        folder: Option<&str>,
    ) -> Result<Option<Vec<BlockRecord>>, LookupError> {
        let path = self.path_for(name, folder);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| LookupError::Io {
            path: path.clone(),
            source,
        })?;
        let document: SchematicDocument =
            serde_json::from_str(&text).map_err(|source| LookupError::Parse { path, source })?;
        Ok(Some(document.blocks))
    }
}

/// In-memory source for tests and programmatic definitions
#[derive(Default)]
pub struct MemorySource {
    schematics: AHashMap<String, Vec<BlockRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, blocks: Vec<BlockRecord>) {
        self.schematics.insert(name.to_string(), blocks);
    }
}

impl SchematicSource for MemorySource {
    fn try_get(
        &self,
        name: &str,
        _folder: Option<&str>,
    ) -> Result<Option<Vec<BlockRecord>>, LookupError> {
        Ok(self.schematics.get(name).cloned())
    }
}

/// Write a document next to the others in `base`, creating the directory if
/// needed; the editor-facing save path
pub fn save_document(
    base: &Path,
    name: &str,
    document: &SchematicDocument,
) -> Result<(), LookupError> {
    let path = base.join(format!("{name}.json"));
    let text = serde_json::to_string_pretty(document).map_err(|source| LookupError::Parse {
        path: path.clone(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| LookupError::Io {
            path: path.clone(),
            source,
        })?;
    }
    fs::write(&path, text).map_err(|source| LookupError::Io { path, source })
}
