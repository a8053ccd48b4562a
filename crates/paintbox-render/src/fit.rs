//! Contain-fit placement used for backgrounds, watermarks and pages.

use kurbo::{Rect, Size};

/// Largest rectangle with the aspect ratio of `content` that fits inside
/// `frame`, centered in it.
pub fn contain_fit(content: Size, frame: Rect) -> Rect {
    if content.width <= 0.0 || content.height <= 0.0 || frame.is_zero_area() {
        return Rect::from_center_size(frame.center(), Size::ZERO);
    }

    let scale = (frame.width() / content.width).min(frame.height() / content.height);
    Rect::from_center_size(
        frame.center(),
        Size::new(content.width * scale, content.height * scale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rect(actual: Rect, expected: Rect) {
        for (a, e) in [
            (actual.x0, expected.x0),
            (actual.y0, expected.y0),
            (actual.x1, expected.x1),
            (actual.y1, expected.y1),
        ] {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_wide_image_in_square_frame() {
        let fit = contain_fit(Size::new(200.0, 100.0), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_rect(fit, Rect::new(0.0, 25.0, 100.0, 75.0));
    }

    #[test]
    fn test_tall_image_is_upscaled_and_centered() {
        let fit = contain_fit(Size::new(10.0, 20.0), Rect::new(0.0, 0.0, 400.0, 100.0));
        assert_rect(fit, Rect::new(175.0, 0.0, 225.0, 100.0));
    }

    #[test]
    fn test_offset_frame() {
        let fit = contain_fit(Size::new(50.0, 50.0), Rect::new(20.0, 20.0, 120.0, 70.0));
        assert_rect(fit, Rect::new(45.0, 20.0, 95.0, 70.0));
    }

    #[test]
    fn test_degenerate_content() {
        let fit = contain_fit(Size::new(0.0, 10.0), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(fit.is_zero_area());
    }
}
