//! Destinations for exported artifacts.

use crate::error::{AppError, AppResult};
use paintbox_render::ExportArtifact;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Receives finished exports, the native stand-in for a browser download.
pub trait ArtifactSink {
    fn save(&mut self, artifact: &ExportArtifact) -> AppResult<()>;
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&mut self, artifact: &ExportArtifact) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| AppError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes).map_err(|source| AppError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

/// Keeps artifacts in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: Rc<RefCell<Vec<ExportArtifact>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<ExportArtifact> {
        self.artifacts.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.artifacts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.borrow().is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&mut self, artifact: &ExportArtifact) -> AppResult<()> {
        self.artifacts.borrow_mut().push(artifact.clone());
        Ok(())
    }
}
