//! Pixel buffer encoding and decoding.

use crate::error::{RenderError, RenderResult};
use paintbox_core::Snapshot;
use tiny_skia::{IntSize, Pixmap};

/// Encode a pixmap as an 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| RenderError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Decode PNG/JPEG/WebP bytes into a premultiplied pixmap.
pub fn decode_image(bytes: &[u8]) -> RenderResult<Pixmap> {
    let decoded = image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);

    let size = IntSize::from_wh(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
    Pixmap::from_vec(data, size).ok_or(RenderError::InvalidDimensions { width, height })
}

/// Encode a flattened canvas into a history snapshot.
pub fn snapshot_from_pixmap(pixmap: &Pixmap) -> RenderResult<Snapshot> {
    let bytes = encode_png(pixmap)?;
    Ok(Snapshot::new(pixmap.width(), pixmap.height(), bytes))
}

/// Decode a history snapshot back into pixels.
pub fn pixmap_from_snapshot(snapshot: &Snapshot) -> RenderResult<Pixmap> {
    decode_image(snapshot.bytes())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
