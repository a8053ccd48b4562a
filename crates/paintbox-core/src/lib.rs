//! Paintbox Core Library
//!
//! Platform-agnostic drawing state for the Paintbox canvas: tools and paint
//! parameters, the zoom/pan camera, the background reference and the bounded
//! undo/redo snapshot history. Nothing in this crate renders pixels.

pub mod background;
pub mod camera;
pub mod history;
pub mod input;
pub mod paint;
pub mod snapshot;
pub mod store;
pub mod tools;

pub use background::{BackgroundError, BackgroundRef};
pub use camera::Camera;
pub use history::{History, HistoryStatus, MAX_HISTORY};
pub use input::{KeyPress, Modifiers, MouseButton, PointerEvent};
pub use paint::{PaintParams, Rgb};
pub use snapshot::{Snapshot, SnapshotId};
pub use store::{DrawingState, DrawingStore, StoreEvent, SubscriptionId};
pub use tools::{BrushShape, CompositeMode, StrokeGeometry, ToolKind, ToolProfile};
