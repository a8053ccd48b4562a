//! Paintbox Render Library
//!
//! CPU raster side of Paintbox: the two-layer canvas surface, stroke
//! rasterization with tiny-skia, image decoding and PNG/PDF export.

pub mod codec;
mod error;
pub mod export;
pub mod fit;
pub mod source;
pub mod stroke;
pub mod surface;

pub use codec::{decode_image, encode_png, pixmap_from_snapshot, snapshot_from_pixmap};
pub use error::{RenderError, RenderResult};
pub use export::{ExportArtifact, ExportKind, Watermark, export, export_file_name, today};
pub use fit::contain_fit;
pub use source::{BoxFuture, FileImageSource, ImageSource, MemoryImageSource};
pub use stroke::{StrokeStyle, render_stroke};
pub use surface::{CanvasSurface, LoadTicket};

/// Re-exported so hosts can hand decoded images back without their own dependency.
pub use tiny_skia::Pixmap;
