//! Stroke rendering onto a raster surface.
//!
//! A stroke is always rendered as a whole from its recorded points, so a
//! translucent stroke never darkens where its own segments overlap.

use kurbo::{Point, Vec2};
use paintbox_core::tools::mix_seed;
use paintbox_core::{BrushShape, CompositeMode, PaintParams, Rgb, StrokeGeometry, ToolKind};
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect,
    Stroke, Transform,
};

/// Nib angle for calligraphy strokes, in radians (45 degrees, rising).
const NIB_ANGLE: f64 = -std::f64::consts::FRAC_PI_4;
/// Narrowest rendered stroke.
const MIN_WIDTH: f32 = 0.5;

/// Fully resolved style of one stroke, captured when it begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub geometry: StrokeGeometry,
    pub composite: CompositeMode,
    pub color: Rgb,
    /// Rendered width in surface pixels.
    pub width: f32,
    /// Effective alpha in [0, 1].
    pub alpha: f32,
    pub shape: BrushShape,
    /// Seed for the spray scatter pattern.
    pub seed: u32,
}

impl StrokeStyle {
    /// Combine the tool profile with the current paint parameters.
    pub fn new(tool: ToolKind, params: &PaintParams, seed: u32) -> Self {
        let profile = tool.profile();
        let alpha = match profile.composite {
            CompositeMode::Erase => 1.0,
            CompositeMode::Paint => (params.opacity * profile.alpha_scale).clamp(0.0, 1.0),
        };
        Self {
            geometry: profile.geometry,
            composite: profile.composite,
            color: params.color,
            width: (params.size * profile.width_scale).max(MIN_WIDTH),
            alpha,
            shape: params.shape,
            seed,
        }
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        match self.composite {
            CompositeMode::Paint => {
                let a = (self.alpha * 255.0).round() as u8;
                paint.set_color_rgba8(self.color.r, self.color.g, self.color.b, a);
            }
            CompositeMode::Erase => {
                paint.set_color(Color::BLACK);
                paint.blend_mode = BlendMode::Clear;
            }
        }
        paint
    }

    fn stroke(&self) -> Stroke {
        let (line_cap, line_join) = match self.shape {
            BrushShape::Round => (LineCap::Round, LineJoin::Round),
            BrushShape::Square => (LineCap::Square, LineJoin::Miter),
            BrushShape::Calligraphy => (LineCap::Butt, LineJoin::Bevel),
        };
        Stroke {
            width: self.width,
            line_cap,
            line_join,
            ..Stroke::default()
        }
    }
}

/// Render a whole stroke through `points` onto `pixmap`.
pub fn render_stroke(pixmap: &mut Pixmap, points: &[Point], style: &StrokeStyle) {
    if points.is_empty() {
        return;
    }
    let paint = style.paint();

    match style.geometry {
        StrokeGeometry::Polyline if points.len() == 1 => {
            if let Some(dab) = dab_path(points[0], style) {
                pixmap.fill_path(&dab, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        StrokeGeometry::Polyline => {
            if let Some(path) = polyline_path(points) {
                pixmap.stroke_path(&path, &paint, &style.stroke(), Transform::identity(), None);
            }
        }
        StrokeGeometry::Spray => {
            if let Some(path) = spray_path(points, style) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        StrokeGeometry::Nib => {
            if let Some(path) = nib_path(points, style.width) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}

/// Single press without movement.
fn dab_path(center: Point, style: &StrokeStyle) -> Option<Path> {
    let half = style.width / 2.0;
    let (x, y) = (center.x as f32, center.y as f32);
    match style.shape {
        BrushShape::Round => PathBuilder::from_circle(x, y, half),
        BrushShape::Square | BrushShape::Calligraphy => {
            Rect::from_xywh(x - half, y - half, style.width, style.width).map(PathBuilder::from_rect)
        }
    }
}

fn polyline_path(points: &[Point]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x as f32, points[0].y as f32);
    for p in &points[1..] {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

/// Dots scattered uniformly over a disc around every recorded point.
fn spray_path(points: &[Point], style: &StrokeStyle) -> Option<Path> {
    let radius = f64::from(style.width) / 2.0;
    let dots = (radius * 1.5).round().clamp(6.0, 60.0) as u32;
    let dot_radius = (radius / 20.0).max(0.75) as f32;

    let mut pb = PathBuilder::new();
    for (i, p) in points.iter().enumerate() {
        let point_seed = mix_seed(style.seed ^ (i as u32).wrapping_mul(0x27d4_eb2d));
        for j in 0..dots {
            let a = mix_seed(point_seed.wrapping_add(j.wrapping_mul(2)));
            let b = mix_seed(point_seed.wrapping_add(j.wrapping_mul(2) + 1));
            let angle = unit(a) * std::f64::consts::TAU;
            let distance = unit(b).sqrt() * radius;
            pb.push_circle(
                (p.x + angle.cos() * distance) as f32,
                (p.y + angle.sin() * distance) as f32,
                dot_radius,
            );
        }
    }
    pb.finish()
}

/// Flat nib swept between consecutive points. Every quad is wound the same
/// way so overlaps union under the non-zero rule.
fn nib_path(points: &[Point], width: f32) -> Option<Path> {
    let half = f64::from(width) / 2.0;
    let nib = Vec2::new(NIB_ANGLE.cos() * half, NIB_ANGLE.sin() * half);

    let mut pb = PathBuilder::new();
    let mut push_quad = |a: Point, b: Point| {
        let mut quad = [a - nib, a + nib, b + nib, b - nib];
        if signed_area(&quad) < 0.0 {
            quad.reverse();
        }
        pb.move_to(quad[0].x as f32, quad[0].y as f32);
        for q in &quad[1..] {
            pb.line_to(q.x as f32, q.y as f32);
        }
        pb.close();
    };

    if points.len() == 1 {
        // Give a lone press a sliver of thickness across the nib.
        let across = Vec2::new(-nib.y, nib.x).normalize() * 0.75;
        push_quad(points[0] - across, points[0] + across);
    } else {
        for pair in points.windows(2) {
            push_quad(pair[0], pair[1]);
        }
    }
    pb.finish()
}

fn signed_area(poly: &[Point]) -> f64 {
    let mut sum = 0.0;
    for (i, p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

/// Map a hash to [0, 1).
fn unit(hash: u32) -> f64 {
    f64::from(hash) / (f64::from(u32::MAX) + 1.0)
}
