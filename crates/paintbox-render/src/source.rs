//! Image sources for backgrounds and watermarks.

use crate::error::{RenderError, RenderResult};
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use url::Url;

/// Boxed future for async loads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Something that can fetch encoded image bytes for a URL.
///
/// Loading is the only asynchronous step of the canvas. Implementations may
/// finish in any order; the surface discards results that were superseded.
pub trait ImageSource {
    /// Fetch the raw (still encoded) bytes behind `url`.
    fn fetch(&self, url: &Url) -> BoxFuture<'_, RenderResult<Vec<u8>>>;
}

/// Reads `file://` URLs from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageSource;

impl FileImageSource {
    pub fn new() -> Self {
        Self
    }
}

impl ImageSource for FileImageSource {
    fn fetch(&self, url: &Url) -> BoxFuture<'_, RenderResult<Vec<u8>>> {
        let url = url.clone();
        Box::pin(async move {
            if url.scheme() != "file" {
                return Err(RenderError::Load {
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            let path = url.to_file_path().map_err(|()| RenderError::Load {
                url: url.to_string(),
                reason: "not a local path".to_string(),
            })?;
            fs::read(&path).map_err(|e| RenderError::Load {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })
    }
}

/// In-memory image source for testing and embedded assets.
#[derive(Default)]
pub struct MemoryImageSource {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under a URL.
    pub fn insert(&self, url: &Url, bytes: Vec<u8>) {
        match self.images.write() {
            Ok(mut images) => {
                images.insert(url.to_string(), bytes);
            }
            Err(e) => log::warn!("Image source lock poisoned: {}", e),
        }
    }
}

impl ImageSource for MemoryImageSource {
    fn fetch(&self, url: &Url) -> BoxFuture<'_, RenderResult<Vec<u8>>> {
        let key = url.to_string();
        Box::pin(async move {
            let images = self.images.read().map_err(|e| RenderError::Load {
                url: key.clone(),
                reason: format!("lock error: {e}"),
            })?;
            images.get(&key).cloned().ok_or_else(|| RenderError::Load {
                url: key.clone(),
                reason: "not found".to_string(),
            })
        })
    }
}
