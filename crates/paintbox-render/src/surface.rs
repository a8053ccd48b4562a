//! The canvas surface: two stacked pixel buffers and the stroke state machine.

use crate::codec::{pixmap_from_snapshot, snapshot_from_pixmap};
use crate::error::RenderResult;
use crate::fit::contain_fit;
use crate::stroke::{StrokeStyle, render_stroke};
use kurbo::{Point, Rect, Size};
use paintbox_core::tools::mix_seed;
use paintbox_core::{Camera, MouseButton, PaintParams, Snapshot, ToolKind};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

/// Background and drawing buffers. Only present once the surface has a size.
struct Layers {
    background: Pixmap,
    drawing: Pixmap,
}

impl Layers {
    fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            background: Pixmap::new(width, height)?,
            drawing: Pixmap::new(width, height)?,
        })
    }
}

/// Stroke in progress.
struct ActiveStroke {
    style: StrokeStyle,
    points: Vec<Point>,
    /// Drawing layer as it was before the stroke began.
    base: Pixmap,
}

/// State of the pointer-driven stroke machine.
#[derive(Default)]
enum StrokeState {
    #[default]
    Idle,
    Drawing(Box<ActiveStroke>),
}

/// Identifies one background load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Raster canvas made of a background surface and a drawing surface.
///
/// Without a size the surface has no rendering context and every rendering
/// operation is skipped.
pub struct CanvasSurface {
    width: u32,
    height: u32,
    layers: Option<Layers>,
    /// Last decoded background image, re-fit on resize.
    background_image: Option<Pixmap>,
    background_generation: u64,
    /// Strokes started so far; seeds the spray pattern of the next one.
    stroke_count: u32,
    stroke: StrokeState,
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("has_context", &self.has_context())
            .field("has_background", &self.background_image.is_some())
            .field("drawing", &self.is_drawing())
            .finish()
    }
}

impl CanvasSurface {
    /// Create a surface. A zero dimension leaves it without a rendering context.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Layers::new(width, height),
            background_image: None,
            background_generation: 0,
            stroke_count: 0,
            stroke: StrokeState::Idle,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether pixel buffers exist.
    pub fn has_context(&self) -> bool {
        self.layers.is_some()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.stroke, StrokeState::Drawing(_))
    }

    pub fn background_layer(&self) -> Option<&Pixmap> {
        self.layers.as_ref().map(|l| &l.background)
    }

    pub fn drawing_layer(&self) -> Option<&Pixmap> {
        self.layers.as_ref().map(|l| &l.drawing)
    }

    /// Start a stroke at a surface-local point. Non-primary buttons are ignored.
    /// Returns true if a stroke started.
    pub fn pointer_down(
        &mut self,
        point: Point,
        button: MouseButton,
        tool: ToolKind,
        params: &PaintParams,
    ) -> bool {
        if !button.is_primary() {
            return false;
        }
        let Some(layers) = self.layers.as_mut() else {
            log::debug!("Pointer down ignored: no rendering context");
            return false;
        };

        self.stroke_count = self.stroke_count.wrapping_add(1);
        let active = ActiveStroke {
            style: StrokeStyle::new(tool, params, mix_seed(self.stroke_count)),
            points: vec![point],
            base: layers.drawing.clone(),
        };
        render_stroke(&mut layers.drawing, &active.points, &active.style);
        self.stroke = StrokeState::Drawing(Box::new(active));
        true
    }

    /// Extend the stroke in progress. Returns false while idle.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let (StrokeState::Drawing(active), Some(layers)) = (&mut self.stroke, self.layers.as_mut())
        else {
            return false;
        };
        if active.points.last() == Some(&point) {
            return true;
        }
        active.points.push(point);

        layers.drawing.data_mut().copy_from_slice(active.base.data());
        render_stroke(&mut layers.drawing, &active.points, &active.style);
        true
    }

    /// Finish the stroke in progress (pointer up or leave).
    /// Returns true if a stroke was completed and should be committed.
    pub fn pointer_up(&mut self) -> bool {
        matches!(std::mem::take(&mut self.stroke), StrokeState::Drawing(_))
    }

    /// Abandon a stroke, restoring the drawing layer to its pre-stroke pixels.
    pub fn cancel_stroke(&mut self) {
        if let (StrokeState::Drawing(active), Some(layers)) =
            (std::mem::take(&mut self.stroke), self.layers.as_mut())
        {
            layers.drawing = active.base;
        }
    }

    /// Reserve a ticket for a new background load. Any older ticket becomes stale.
    pub fn request_background(&mut self) -> LoadTicket {
        self.background_generation += 1;
        LoadTicket(self.background_generation)
    }

    /// Whether `ticket` belongs to the newest background request.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.background_generation
    }

    /// Install a decoded background image for `ticket`, scale-fitting it into
    /// the background surface. Stale tickets are ignored. Returns true if applied.
    pub fn apply_background(&mut self, ticket: LoadTicket, image: Pixmap) -> bool {
        if !self.is_current(ticket) {
            log::debug!("Discarding stale background load {:?}", ticket);
            return false;
        }
        self.background_image = Some(image);
        self.render_background();
        true
    }

    /// Remove the background image and invalidate pending loads.
    pub fn clear_background(&mut self) {
        self.background_generation += 1;
        self.background_image = None;
        self.render_background();
    }

    fn render_background(&mut self) {
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        layers.background.fill(Color::TRANSPARENT);

        if let Some(image) = &self.background_image {
            let frame = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
            let content = Size::new(f64::from(image.width()), f64::from(image.height()));
            draw_fitted(&mut layers.background, image, contain_fit(content, frame));
        }
    }

    /// Resize both buffers. Pixel content is cleared; the background image is
    /// re-fit and any stroke in progress is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.stroke = StrokeState::Idle;
        self.layers = Layers::new(width, height);
        self.render_background();
    }

    /// Composite background then drawing into one transparent image.
    pub fn flatten(&self) -> Option<Pixmap> {
        self.flatten_onto(Color::TRANSPARENT)
    }

    /// Composite background then drawing onto a solid base color.
    pub fn flatten_onto(&self, base: Color) -> Option<Pixmap> {
        let layers = self.layers.as_ref()?;
        self.composite(base, &layers.background, &layers.drawing)
    }

    /// Like [`Self::flatten`], but a stroke in progress is left out.
    pub fn flatten_settled(&self) -> Option<Pixmap> {
        let layers = self.layers.as_ref()?;
        let drawing = match &self.stroke {
            StrokeState::Drawing(active) => &active.base,
            StrokeState::Idle => &layers.drawing,
        };
        self.composite(Color::TRANSPARENT, &layers.background, drawing)
    }

    fn composite(&self, base: Color, background: &Pixmap, drawing: &Pixmap) -> Option<Pixmap> {
        let mut out = Pixmap::new(self.width, self.height)?;
        out.fill(base);
        let paint = PixmapPaint::default();
        out.draw_pixmap(0, 0, background.as_ref(), &paint, Transform::identity(), None);
        out.draw_pixmap(0, 0, drawing.as_ref(), &paint, Transform::identity(), None);
        Some(out)
    }

    /// Flatten and encode the canvas for the history. A stroke in progress
    /// is not part of it. `Ok(None)` when there is no rendering context.
    pub fn snapshot(&self) -> RenderResult<Option<Snapshot>> {
        match self.flatten_settled() {
            Some(flat) => snapshot_from_pixmap(&flat).map(Some),
            None => {
                log::debug!("Snapshot skipped: no rendering context");
                Ok(None)
            }
        }
    }

    /// Repaint the drawing surface from a history snapshot. The snapshot
    /// already contains the background, so the background surface is untouched.
    pub fn restore(&mut self, snapshot: &Snapshot) -> RenderResult<()> {
        if self.layers.is_none() {
            log::debug!("Restore skipped: no rendering context");
            return Ok(());
        }
        let image = pixmap_from_snapshot(snapshot)?;

        self.stroke = StrokeState::Idle;
        if let Some(layers) = self.layers.as_mut() {
            layers.drawing.fill(Color::TRANSPARENT);
            layers.drawing.draw_pixmap(
                0,
                0,
                image.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Ok(())
    }

    /// Present the canvas in a `view_width` x `view_height` viewport with the
    /// camera's zoom and pan applied.
    pub fn render_view(&self, camera: &Camera, view_width: u32, view_height: u32) -> Option<Pixmap> {
        let flat = self.flatten_onto(Color::WHITE)?;
        let mut view = Pixmap::new(view_width, view_height)?;
        view.fill(Color::from_rgba8(250, 250, 250, 255));

        let a = camera.transform().as_coeffs();
        let transform = Transform::from_row(
            a[0] as f32, a[1] as f32, a[2] as f32, a[3] as f32, a[4] as f32, a[5] as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        view.draw_pixmap(0, 0, flat.as_ref(), &paint, transform, None);
        Some(view)
    }
}

/// Draw `image` scaled into `target` on `canvas`.
pub(crate) fn draw_fitted(canvas: &mut Pixmap, image: &Pixmap, target: Rect) {
    if target.is_zero_area() {
        return;
    }
    let sx = (target.width() / f64::from(image.width())) as f32;
    let sy = (target.height() / f64::from(image.height())) as f32;
    let transform = Transform::from_row(sx, 0.0, 0.0, sy, target.x0 as f32, target.y0 as f32);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use paintbox_core::Rgb;
    use tiny_skia::Paint;

    fn fill_rect(canvas: &mut Pixmap, rect: Rect, color: Color) {
        let r = tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
            .unwrap();
        let mut paint = Paint::default();
        paint.set_color(color);
        canvas.fill_rect(r, &paint, Transform::identity(), None);
    }

    fn solid(width: u32, height: u32, color: Color) -> Pixmap {
        let mut p = Pixmap::new(width, height).unwrap();
        p.fill(color);
        p
    }

    fn pen(color: Rgb) -> PaintParams {
        PaintParams {
            color,
            size: 6.0,
            ..PaintParams::default()
        }
    }

    fn alpha(p: &Pixmap, x: u32, y: u32) -> u8 {
        p.pixel(x, y).map_or(0, |px| px.alpha())
    }

    fn draw_line(surface: &mut CanvasSurface, tool: ToolKind, params: &PaintParams, from: Point, to: Point) {
        assert!(surface.pointer_down(from, MouseButton::Left, tool, params));
        assert!(surface.pointer_move(to));
        assert!(surface.pointer_up());
    }

    #[test]
    fn test_zero_size_has_no_context() {
        let mut surface = CanvasSurface::new(0, 100);
        assert!(!surface.has_context());
        assert!(!surface.pointer_down(Point::ZERO, MouseButton::Left, ToolKind::Pen, &PaintParams::default()));
        assert!(surface.snapshot().unwrap().is_none());
        assert!(surface.flatten().is_none());

        surface.resize(10, 10);
        assert!(surface.has_context());
    }

    #[test]
    fn test_stroke_state_machine() {
        let mut surface = CanvasSurface::new(50, 50);
        assert!(!surface.pointer_move(Point::new(1.0, 1.0)));
        assert!(!surface.pointer_up());

        let params = pen(Rgb::BLACK);
        assert!(surface.pointer_down(Point::new(5.0, 25.0), MouseButton::Left, ToolKind::Pen, &params));
        assert!(surface.is_drawing());
        assert!(surface.pointer_move(Point::new(45.0, 25.0)));
        assert!(surface.pointer_up());
        assert!(!surface.is_drawing());

        assert_eq!(alpha(surface.drawing_layer().unwrap(), 25, 25), 255);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut surface = CanvasSurface::new(20, 20);
        let params = pen(Rgb::BLACK);
        assert!(!surface.pointer_down(Point::new(10.0, 10.0), MouseButton::Right, ToolKind::Pen, &params));
        assert!(!surface.is_drawing());
        assert!(surface.drawing_layer().unwrap().pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_eraser_removes_content() {
        let mut surface = CanvasSurface::new(60, 60);
        let red = pen(Rgb::new(255, 0, 0));
        let wide = PaintParams { size: 30.0, ..red };
        draw_line(&mut surface, ToolKind::Pen, &wide, Point::new(0.0, 30.0), Point::new(60.0, 30.0));
        assert_eq!(alpha(surface.drawing_layer().unwrap(), 30, 30), 255);

        draw_line(&mut surface, ToolKind::Eraser, &red, Point::new(30.0, 0.0), Point::new(30.0, 60.0));
        let drawing = surface.drawing_layer().unwrap();
        assert_eq!(alpha(drawing, 30, 30), 0);
        // Painted area outside the eraser path survives, still red.
        let kept = drawing.pixel(5, 30).unwrap();
        assert_eq!((kept.red(), kept.alpha()), (255, 255));
    }

    #[test]
    fn test_flatten_composites_background_under_drawing() {
        let mut surface = CanvasSurface::new(40, 40);
        let ticket = surface.request_background();
        assert!(surface.apply_background(ticket, solid(40, 40, Color::from_rgba8(0, 0, 255, 255))));
        draw_line(
            &mut surface,
            ToolKind::Pen,
            &pen(Rgb::new(255, 0, 0)),
            Point::new(0.0, 20.0),
            Point::new(40.0, 20.0),
        );

        let flat = surface.flatten().unwrap();
        let on_line = flat.pixel(20, 20).unwrap();
        let off_line = flat.pixel(20, 2).unwrap();
        assert_eq!((on_line.red(), on_line.blue()), (255, 0));
        assert_eq!((off_line.red(), off_line.blue()), (0, 255));
    }

    #[test]
    fn test_background_is_contain_fit() {
        let mut surface = CanvasSurface::new(100, 50);
        let ticket = surface.request_background();
        surface.apply_background(ticket, solid(10, 10, Color::from_rgba8(0, 255, 0, 255)));

        let bg = surface.background_layer().unwrap();
        // Square image centered in a wide surface: 25..75 horizontally.
        assert_eq!(alpha(bg, 50, 25), 255);
        assert_eq!(alpha(bg, 10, 25), 0);
        assert_eq!(alpha(bg, 90, 25), 0);
    }

    #[test]
    fn test_stale_background_load_is_discarded() {
        let mut surface = CanvasSurface::new(20, 20);
        let first = surface.request_background();
        let second = surface.request_background();

        assert!(surface.apply_background(second, solid(20, 20, Color::from_rgba8(0, 255, 0, 255))));
        assert!(!surface.apply_background(first, solid(20, 20, Color::from_rgba8(255, 0, 0, 255))));

        let px = surface.background_layer().unwrap().pixel(10, 10).unwrap();
        assert_eq!((px.red(), px.green()), (0, 255));
    }

    #[test]
    fn test_clear_background_invalidates_pending_load() {
        let mut surface = CanvasSurface::new(20, 20);
        let ticket = surface.request_background();
        surface.clear_background();
        assert!(!surface.apply_background(ticket, solid(20, 20, Color::BLACK)));
        assert_eq!(alpha(surface.background_layer().unwrap(), 10, 10), 0);
    }

    #[test]
    fn test_stroke_during_pending_load() {
        let mut surface = CanvasSurface::new(40, 40);
        let ticket = surface.request_background();
        draw_line(&mut surface, ToolKind::Pen, &pen(Rgb::BLACK), Point::new(0.0, 20.0), Point::new(40.0, 20.0));
        assert!(surface.apply_background(ticket, solid(40, 40, Color::WHITE)));

        // The stroke survives the background arriving.
        assert_eq!(alpha(surface.drawing_layer().unwrap(), 20, 20), 255);
    }

    #[test]
    fn test_restore_snapshot() {
        let mut surface = CanvasSurface::new(30, 30);
        let blank = surface.snapshot().unwrap().unwrap();
        draw_line(&mut surface, ToolKind::Pen, &pen(Rgb::BLACK), Point::new(0.0, 15.0), Point::new(30.0, 15.0));
        assert_eq!(alpha(surface.drawing_layer().unwrap(), 15, 15), 255);

        surface.restore(&blank).unwrap();
        assert_eq!(alpha(surface.drawing_layer().unwrap(), 15, 15), 0);
    }

    #[test]
    fn test_resize_clears_and_refits_background() {
        let mut surface = CanvasSurface::new(20, 20);
        let ticket = surface.request_background();
        surface.apply_background(ticket, solid(5, 5, Color::from_rgba8(0, 0, 255, 255)));
        draw_line(&mut surface, ToolKind::Pen, &pen(Rgb::BLACK), Point::new(0.0, 10.0), Point::new(20.0, 10.0));

        surface.resize(40, 20);
        assert_eq!(surface.size(), (40, 20));
        assert!(surface.drawing_layer().unwrap().pixels().iter().all(|p| p.alpha() == 0));
        let bg = surface.background_layer().unwrap();
        assert_eq!(alpha(bg, 20, 10), 255);
        assert_eq!(alpha(bg, 2, 10), 0);
    }

    #[test]
    fn test_snapshot_leaves_out_stroke_in_progress() {
        let mut surface = CanvasSurface::new(20, 20);
        surface.pointer_down(Point::new(2.0, 10.0), MouseButton::Left, ToolKind::Pen, &pen(Rgb::BLACK));
        surface.pointer_move(Point::new(18.0, 10.0));

        let mid_stroke = pixmap_from_snapshot(&surface.snapshot().unwrap().unwrap()).unwrap();
        assert!(mid_stroke.pixels().iter().all(|p| p.alpha() == 0));
        assert_eq!(alpha(surface.flatten().as_ref().unwrap(), 10, 10), 255);

        surface.pointer_up();
        let done = pixmap_from_snapshot(&surface.snapshot().unwrap().unwrap()).unwrap();
        assert_eq!(alpha(&done, 10, 10), 255);
    }

    #[test]
    fn test_spray_seeds_follow_stroke_order() {
        let spray = |surface: &mut CanvasSurface| {
            surface.pointer_down(Point::new(10.0, 10.0), MouseButton::Left, ToolKind::Spray, &pen(Rgb::BLACK));
            surface.pointer_up();
        };
        let mut first = CanvasSurface::new(20, 20);
        let mut second = CanvasSurface::new(20, 20);
        spray(&mut first);
        spray(&mut second);
        assert_eq!(first.drawing_layer().unwrap().data(), second.drawing_layer().unwrap().data());
    }

    #[test]
    fn test_cancel_stroke_restores_base() {
        let mut surface = CanvasSurface::new(20, 20);
        surface.pointer_down(Point::new(2.0, 10.0), MouseButton::Left, ToolKind::Pen, &pen(Rgb::BLACK));
        surface.pointer_move(Point::new(18.0, 10.0));
        surface.cancel_stroke();
        assert!(!surface.is_drawing());
        assert!(surface.drawing_layer().unwrap().pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_render_view_applies_zoom() {
        let mut surface = CanvasSurface::new(10, 10);
        if let Some(layers) = surface.layers.as_mut() {
            fill_rect(&mut layers.drawing, Rect::new(0.0, 0.0, 5.0, 5.0), Color::BLACK);
        }
        let mut camera = Camera::new();
        camera.set_zoom(2.0);

        let view = surface.render_view(&camera, 20, 20).unwrap();
        // Top-left quarter of the canvas now covers 10x10 view pixels.
        let inside = view.pixel(8, 8).unwrap();
        let outside = view.pixel(12, 12).unwrap();
        assert_eq!(inside.red(), 0);
        assert_eq!(outside.red(), 255);
    }
}
