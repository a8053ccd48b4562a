//! Renderer errors.

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("Image encode failed: {0}")]
    Encode(String),
    #[error("Failed to load {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("Export failed: {0}")]
    Export(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
