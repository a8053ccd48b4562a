//! The drawing state store.
//!
//! One cohesive [`DrawingState`] value plus the snapshot history. Every
//! mutation is an explicit method that updates the state and then notifies
//! subscribers with [`StoreEvent`]s.

use crate::background::BackgroundRef;
use crate::camera::Camera;
use crate::history::{History, HistoryStatus};
use crate::paint::{PaintParams, Rgb, sanitize_opacity, sanitize_size};
use crate::snapshot::Snapshot;
use crate::tools::{BrushShape, ToolKind};
use kurbo::{Point, Vec2};

/// Everything the toolbar, gallery and view controls can change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingState {
    pub tool: ToolKind,
    pub paint: PaintParams,
    pub camera: Camera,
    pub background: Option<BackgroundRef>,
}

/// Change notification broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ToolChanged(ToolKind),
    ColorChanged(Rgb),
    SizeChanged(f32),
    OpacityChanged(f32),
    ShapeChanged(BrushShape),
    ZoomChanged(f64),
    PanChanged(Vec2),
    BackgroundChanged(Option<BackgroundRef>),
    HistoryChanged(HistoryStatus),
}

/// Handle returned by [`DrawingStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Single source of truth for paint parameters, view, background and history.
#[derive(Default)]
pub struct DrawingStore {
    state: DrawingState,
    history: History<Snapshot>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl std::fmt::Debug for DrawingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingStore")
            .field("state", &self.state)
            .field("history", &self.history.status())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl DrawingStore {
    /// Create a store with default state and an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn tool(&self) -> ToolKind {
        self.state.tool
    }

    pub fn paint(&self) -> PaintParams {
        self.state.paint
    }

    pub fn camera(&self) -> Camera {
        self.state.camera
    }

    pub fn background(&self) -> Option<&BackgroundRef> {
        self.state.background.as_ref()
    }

    /// Register a callback invoked after every state change.
    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn broadcast(&mut self, event: StoreEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.state.tool = tool;
        self.broadcast(StoreEvent::ToolChanged(tool));
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.state.paint.color = color;
        self.broadcast(StoreEvent::ColorChanged(color));
    }

    /// Set the stroke width, clamped to the supported range.
    pub fn set_size(&mut self, size: f32) {
        let Some(size) = sanitize_size(size) else {
            log::debug!("Ignoring non-finite brush size");
            return;
        };
        self.state.paint.size = size;
        self.broadcast(StoreEvent::SizeChanged(size));
    }

    /// Set the stroke opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, opacity: f32) {
        let Some(opacity) = sanitize_opacity(opacity) else {
            log::debug!("Ignoring non-finite opacity");
            return;
        };
        self.state.paint.opacity = opacity;
        self.broadcast(StoreEvent::OpacityChanged(opacity));
    }

    pub fn set_shape(&mut self, shape: BrushShape) {
        self.state.paint.shape = shape;
        self.broadcast(StoreEvent::ShapeChanged(shape));
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if !self.state.camera.set_zoom(zoom) {
            log::debug!("Ignoring non-finite zoom");
            return;
        }
        let zoom = self.state.camera.zoom;
        self.broadcast(StoreEvent::ZoomChanged(zoom));
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            log::debug!("Ignoring non-finite pan");
            return;
        }
        self.state.camera.set_pan(x, y);
        self.broadcast(StoreEvent::PanChanged(self.state.camera.pan));
    }

    /// Zoom by `factor` around a view point, keeping it fixed on screen.
    pub fn zoom_at(&mut self, view_point: Point, factor: f64) {
        if !self.state.camera.zoom_at(view_point, factor) {
            log::debug!("Zoom at {view_point:?} by {factor} changed nothing");
            return;
        }
        let camera = self.state.camera;
        self.broadcast(StoreEvent::ZoomChanged(camera.zoom));
        self.broadcast(StoreEvent::PanChanged(camera.pan));
    }

    /// Back to 100% with no pan.
    pub fn reset_view(&mut self) {
        self.state.camera.reset();
        let camera = self.state.camera;
        self.broadcast(StoreEvent::ZoomChanged(camera.zoom));
        self.broadcast(StoreEvent::PanChanged(camera.pan));
    }

    /// Replace the background reference. Rendering is up to the observer.
    pub fn set_background_url(&mut self, background: Option<BackgroundRef>) {
        self.state.background = background.clone();
        self.broadcast(StoreEvent::BackgroundChanged(background));
    }

    /// Current history position.
    pub fn history_status(&self) -> HistoryStatus {
        self.history.status()
    }

    /// Snapshot at the history cursor.
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.history.current()
    }

    /// Append a snapshot after the cursor, dropping redo entries and
    /// evicting the oldest entry once the history is full.
    pub fn push_snapshot(&mut self, snapshot: Snapshot) {
        self.history.push(snapshot);
        self.broadcast(StoreEvent::HistoryChanged(self.history.status()));
    }

    /// Step back. No-op (and no broadcast) at the start of history.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let snapshot = self.history.undo().cloned()?;
        self.broadcast(StoreEvent::HistoryChanged(self.history.status()));
        Some(snapshot)
    }

    /// Step forward. No-op (and no broadcast) at the end of history.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.history.redo().cloned()?;
        self.broadcast(StoreEvent::HistoryChanged(self.history.status()));
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.broadcast(StoreEvent::HistoryChanged(self.history.status()));
    }
}
