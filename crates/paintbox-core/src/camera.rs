//! Camera module for the zoom/pan view transform.
//!
//! The camera only affects how the canvas is presented. Pixel buffers and
//! snapshots are always in unscaled surface coordinates.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level that corresponds to "100%".
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 10.0;

/// Camera manages the view transform for the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in view pixels.
    pub pan: Vec2,
    /// Current zoom factor.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform from surface coordinates to view coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Transform from view coordinates back to surface coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a view point to surface coordinates.
    pub fn view_to_surface(&self, view_point: Point) -> Point {
        self.inverse_transform() * view_point
    }

    /// Convert a surface point to view coordinates.
    pub fn surface_to_view(&self, surface_point: Point) -> Point {
        self.transform() * surface_point
    }

    /// Set the zoom level, clamped to the allowed range.
    /// Returns false (and leaves the camera alone) for non-finite input.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        true
    }

    /// Replace the pan offset.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = Vec2::new(x, y);
    }

    /// Zoom the camera, keeping the given view point fixed.
    /// Returns false if nothing changed.
    pub fn zoom_at(&mut self, view_point: Point, factor: f64) -> bool {
        if !(factor.is_finite() && factor > 0.0 && view_point.is_finite()) {
            return false;
        }
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let surface_point = self.view_to_surface(view_point);
        self.zoom = new_zoom;

        // Adjust pan so surface_point stays under view_point
        let new_view = self.surface_to_view(surface_point);
        self.pan += Vec2::new(view_point.x - new_view.x, view_point.y - new_view.y);
        true
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.pan, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_identity_at_default() {
        let camera = Camera::new();
        let p = Point::new(100.0, 200.0);
        let q = camera.view_to_surface(p);
        assert!((q.x - p.x).abs() < f64::EPSILON);
        assert!((q.y - p.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_view_to_surface_with_zoom_and_pan() {
        let mut camera = Camera::new();
        camera.set_zoom(2.0);
        camera.set_pan(50.0, 100.0);
        let surface = camera.view_to_surface(Point::new(150.0, 300.0));
        assert!((surface.x - 50.0).abs() < 1e-10);
        assert!((surface.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.set_pan(30.0, -20.0);
        camera.set_zoom(1.5);

        let original = Point::new(123.0, 456.0);
        let back = camera.surface_to_view(camera.view_to_surface(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        assert!(camera.set_zoom(0.001));
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        assert!(camera.set_zoom(1000.0));
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
        assert!(!camera.set_zoom(f64::NAN));
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera::new();
        let anchor = Point::new(200.0, 100.0);
        let before = camera.view_to_surface(anchor);
        camera.zoom_at(anchor, 2.0);
        let after = camera.view_to_surface(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }
}
