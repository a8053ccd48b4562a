//! A painting session: the drawing store and the canvas surface wired together.

use crate::commands::{Command, CommandQueue, CommandSender};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::sink::ArtifactSink;
use kurbo::Point;
use paintbox_core::input::to_surface_local;
use paintbox_core::{BackgroundRef, DrawingStore, KeyPress, PointerEvent, Rgb, Snapshot};
use paintbox_render::{
    BoxFuture, CanvasSurface, ExportArtifact, ExportKind, ImageSource, LoadTicket, Pixmap,
    RenderResult, Watermark, decode_image, encode_png,
};
use std::path::PathBuf;
use std::rc::Rc;
use url::Url;

/// A background fetch in flight. The host drives `future` and hands the
/// result to [`PaintSession::complete_background_load`].
pub struct BackgroundLoad {
    pub ticket: LoadTicket,
    pub url: Url,
    pub future: BoxFuture<'static, RenderResult<Vec<u8>>>,
}

impl std::fmt::Debug for BackgroundLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundLoad")
            .field("ticket", &self.ticket)
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

pub struct PaintSession {
    store: DrawingStore,
    surface: CanvasSurface,
    source: Rc<dyn ImageSource>,
    asset_root: PathBuf,
    /// Where the surface starts inside the host, in device pixels.
    origin: Point,
    watermark: Option<Watermark>,
    sink: Box<dyn ArtifactSink>,
    commands: CommandQueue,
    pending_loads: Vec<BackgroundLoad>,
}

impl PaintSession {
    /// Build a session, record the blank canvas as the first history entry
    /// and start loading the background named by the initial query, if any.
    pub fn new(config: &AppConfig, source: Rc<dyn ImageSource>, sink: Box<dyn ArtifactSink>) -> Self {
        let mut session = Self {
            store: DrawingStore::new(),
            surface: CanvasSurface::new(config.width, config.height),
            source,
            asset_root: config.resolved_asset_root(),
            origin: config.origin,
            watermark: None,
            sink,
            commands: CommandQueue::new(),
            pending_loads: Vec::new(),
        };
        session.commit_snapshot();

        if let Some(query) = config.initial_query.as_deref() {
            match BackgroundRef::from_query(query, &session.asset_root) {
                Some(Ok(background)) => session.set_background(Some(background)),
                Some(Err(e)) => log::warn!("Ignoring background from query {query:?}: {e}"),
                None => {}
            }
        }
        session
    }

    pub fn store(&self) -> &DrawingStore {
        &self.store
    }

    /// Mutable store access, mainly for subscribing to changes.
    pub fn store_mut(&mut self) -> &mut DrawingStore {
        &mut self.store
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn watermark(&self) -> Option<&Watermark> {
        self.watermark.as_ref()
    }

    /// Decode and install a watermark logo. A bad image leaves exports unstamped.
    pub fn load_watermark(&mut self, bytes: &[u8]) -> bool {
        match Watermark::decode(bytes) {
            Ok(watermark) => {
                self.watermark = Some(watermark);
                true
            }
            Err(e) => {
                log::warn!("Watermark could not be decoded: {e}");
                self.watermark = None;
                false
            }
        }
    }

    /// Handle for queuing commands from elsewhere in the host.
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Apply every queued command. Returns how many were applied.
    pub fn process_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Some(command) = self.commands.next() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, command: Command) {
        log::debug!("Applying {command:?}");
        match command {
            Command::SetTool(tool) => self.store.set_tool(tool),
            Command::SetColor(hex) => match Rgb::from_hex(&hex) {
                Ok(color) => self.store.set_color(color),
                Err(e) => log::warn!("Ignoring color {hex:?}: {e}"),
            },
            Command::SetSize(size) => self.store.set_size(size),
            Command::SetOpacity(opacity) => self.store.set_opacity(opacity),
            Command::SetShape(shape) => self.store.set_shape(shape),
            Command::SetZoom(zoom) => self.store.set_zoom(zoom),
            Command::SetPan { x, y } => self.store.set_pan(x, y),
            Command::ZoomAt { x, y, factor } => self.store.zoom_at(Point::new(x, y), factor),
            Command::ResetView => self.store.reset_view(),
            Command::SetBackground(reference) => self.set_background_reference(reference.as_deref()),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Export(kind) => {
                if let Err(e) = self.export(kind) {
                    log::warn!("Export failed: {e}");
                }
            }
        }
    }

    /// Route a device-space pointer event to the surface. A finished stroke
    /// is committed to the history. Returns true if the event was consumed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let point = to_surface_local(event.position(), self.origin);
        match event {
            PointerEvent::Down { button, .. } => {
                let params = self.store.paint();
                self.surface.pointer_down(point, button, self.store.tool(), &params)
            }
            PointerEvent::Move { .. } => self.surface.pointer_move(point),
            PointerEvent::Up { button, .. } if !button.is_primary() => false,
            PointerEvent::Up { .. } | PointerEvent::Leave { .. } => {
                let finished = self.surface.pointer_up();
                if finished {
                    self.commit_snapshot();
                }
                finished
            }
        }
    }

    /// Run the shortcut bound to `press`. Returns true if one matched.
    pub fn handle_key(&mut self, press: &KeyPress) -> bool {
        match ShortcutRegistry::action_for(press) {
            Some(ShortcutAction::Undo) => {
                self.undo();
                true
            }
            Some(ShortcutAction::Redo) => {
                self.redo();
                true
            }
            Some(ShortcutAction::CancelStroke) => {
                self.surface.cancel_stroke();
                true
            }
            None => false,
        }
    }

    /// Step back through the history and repaint. Returns false at the start.
    pub fn undo(&mut self) -> bool {
        match self.store.undo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Step forward through the history and repaint. Returns false at the end.
    pub fn redo(&mut self) -> bool {
        match self.store.redo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.surface.restore(snapshot) {
            log::warn!("Failed to restore snapshot: {e}");
        }
    }

    /// Flatten the canvas and push it onto the history.
    pub fn commit_snapshot(&mut self) {
        match self.surface.snapshot() {
            Ok(Some(snapshot)) => self.store.push_snapshot(snapshot),
            Ok(None) => {}
            Err(e) => log::warn!("Failed to snapshot canvas: {e}"),
        }
    }

    /// Resize the canvas. Gaining a rendering context on an empty history
    /// records the blank canvas as the first entry.
    pub fn resize(&mut self, width: u32, height: u32) {
        let had_context = self.surface.has_context();
        self.surface.resize(width, height);
        if !had_context && self.surface.has_context() && self.store.history_status().len == 0 {
            self.commit_snapshot();
        }
    }

    /// Resolve a gallery reference and load it. `None` or blank removes the
    /// background; an unparseable reference is ignored.
    pub fn set_background_reference(&mut self, reference: Option<&str>) {
        match reference.map(str::trim).filter(|r| !r.is_empty()) {
            None => self.set_background(None),
            Some(reference) => match BackgroundRef::parse(reference, &self.asset_root) {
                Ok(background) => self.set_background(Some(background)),
                Err(e) => log::warn!("Ignoring background {reference:?}: {e}"),
            },
        }
    }

    fn set_background(&mut self, background: Option<BackgroundRef>) {
        self.store.set_background_url(background.clone());
        match background {
            Some(background) => {
                let load = self.begin_background_load(background.url());
                self.pending_loads.push(load);
            }
            None => self.surface.clear_background(),
        }
    }

    /// Start fetching `url`. Any earlier load becomes stale.
    pub fn begin_background_load(&mut self, url: &Url) -> BackgroundLoad {
        let ticket = self.surface.request_background();
        log::info!("Loading background {url}");

        let source = Rc::clone(&self.source);
        let fetch_url = url.clone();
        BackgroundLoad {
            ticket,
            url: url.clone(),
            future: Box::pin(async move { source.fetch(&fetch_url).await }),
        }
    }

    /// Finish a load started by [`Self::begin_background_load`]. Stale or
    /// failed loads change nothing. Returns true if the background was applied.
    pub fn complete_background_load(&mut self, ticket: LoadTicket, result: RenderResult<Vec<u8>>) -> bool {
        if !self.surface.is_current(ticket) {
            log::debug!("Background load {ticket:?} was superseded");
            return false;
        }
        let image = match result.and_then(|bytes| decode_image(&bytes)) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Background image failed to load: {e}");
                return false;
            }
        };
        if !self.surface.apply_background(ticket, image) {
            return false;
        }
        self.commit_snapshot();
        true
    }

    /// Loads started by commands that the host has not picked up yet.
    pub fn take_pending_loads(&mut self) -> Vec<BackgroundLoad> {
        std::mem::take(&mut self.pending_loads)
    }

    pub fn has_pending_loads(&self) -> bool {
        !self.pending_loads.is_empty()
    }

    /// Drive every pending load to completion on the current thread.
    /// Returns how many backgrounds were applied.
    pub fn await_background(&mut self) -> usize {
        let mut applied = 0;
        for load in self.take_pending_loads() {
            let result = pollster::block_on(load.future);
            if self.complete_background_load(load.ticket, result) {
                applied += 1;
            }
        }
        applied
    }

    /// The canvas as the host presents it, with the camera's zoom and pan
    /// applied. `None` without a rendering context.
    pub fn render_view(&self, width: u32, height: u32) -> Option<Pixmap> {
        self.surface.render_view(&self.store.camera(), width, height)
    }

    /// Render the presented view and hand it to the sink as `<name>.png`.
    /// Returns false when there was nothing to present.
    pub fn present(&mut self, width: u32, height: u32, name: &str) -> AppResult<bool> {
        let Some(view) = self.render_view(width, height) else {
            log::debug!("View {name} skipped: no rendering context");
            return Ok(false);
        };
        let artifact = ExportArtifact {
            kind: ExportKind::Image,
            file_name: format!("{name}.png"),
            mime_type: ExportKind::Image.mime_type(),
            bytes: encode_png(&view)?,
        };
        self.sink.save(&artifact)?;
        Ok(true)
    }

    /// Export the canvas and hand it to the sink. Returns false when there
    /// was nothing to export.
    pub fn export(&mut self, kind: ExportKind) -> AppResult<bool> {
        let artifact =
            paintbox_render::export(kind, &self.surface, self.watermark.as_ref(), paintbox_render::today())?;
        match artifact {
            Some(artifact) => {
                self.sink.save(&artifact)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
