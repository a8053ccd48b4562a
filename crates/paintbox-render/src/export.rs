//! Raster and document export of the flattened canvas.

use crate::codec::{decode_image, encode_png};
use crate::error::{RenderError, RenderResult};
use crate::fit::contain_fit;
use crate::surface::{CanvasSurface, draw_fitted};
use kurbo::{Rect, Size};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use serde::{Deserialize, Serialize};
use tiny_skia::{Color, Pixmap};

/// Base name of every exported file.
pub const FILE_STEM: &str = "painting";

/// Watermark box for raster exports, in pixels.
pub const RASTER_WATERMARK_SIZE: Size = Size::new(120.0, 40.0);
/// Distance of the raster watermark box from the bottom-right corner.
pub const RASTER_WATERMARK_MARGIN: f64 = 10.0;

/// A4 landscape, in points.
pub const PAGE_SIZE: Size = Size::new(841.89, 595.28);
pub const PAGE_MARGIN: f64 = 20.0;
pub const DOCUMENT_WATERMARK_SIZE: Size = Size::new(96.0, 32.0);
pub const DOCUMENT_WATERMARK_MARGIN: f64 = 20.0;

/// The two download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// PNG image at canvas resolution.
    Image,
    /// Single page PDF.
    Document,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Image => "png",
            ExportKind::Document => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportKind::Image => "image/png",
            ExportKind::Document => "application/pdf",
        }
    }
}

/// A finished export, ready to be handed to whoever saves it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub kind: ExportKind,
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `painting-YYYY-MM-DD.<ext>`
pub fn export_file_name(kind: ExportKind, date: time::Date) -> String {
    format!("{FILE_STEM}-{date}.{}", kind.extension())
}

/// Today's date in UTC.
pub fn today() -> time::Date {
    time::OffsetDateTime::now_utc().date()
}

/// Decoded logo stamped into the bottom-right corner of exports.
#[derive(Debug, Clone)]
pub struct Watermark {
    image: Pixmap,
}

impl Watermark {
    pub fn decode(bytes: &[u8]) -> RenderResult<Self> {
        decode_image(bytes).map(Self::from_pixmap)
    }

    pub fn from_pixmap(image: Pixmap) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &Pixmap {
        &self.image
    }

    fn size(&self) -> Size {
        Size::new(f64::from(self.image.width()), f64::from(self.image.height()))
    }
}

/// Background and drawing flattened onto opaque white.
pub fn flatten_for_export(surface: &CanvasSurface) -> Option<Pixmap> {
    surface.flatten_onto(Color::WHITE)
}

/// Where the raster watermark lands on a canvas of the given size.
pub fn raster_watermark_rect(canvas: Size, logo: Size) -> Rect {
    let frame = bottom_right_box(canvas, RASTER_WATERMARK_SIZE, RASTER_WATERMARK_MARGIN);
    contain_fit(logo, frame)
}

/// Export in the requested format. `Ok(None)` when the surface has no
/// rendering context.
pub fn export(
    kind: ExportKind,
    surface: &CanvasSurface,
    watermark: Option<&Watermark>,
    date: time::Date,
) -> RenderResult<Option<ExportArtifact>> {
    let Some(flat) = flatten_for_export(surface) else {
        log::debug!("Export skipped: no rendering context");
        return Ok(None);
    };

    let bytes = match kind {
        ExportKind::Image => export_image(flat, watermark)?,
        ExportKind::Document => export_document(&flat, watermark)?,
    };

    let file_name = export_file_name(kind, date);
    log::info!("Exported {} ({} bytes)", file_name, bytes.len());
    Ok(Some(ExportArtifact {
        kind,
        file_name,
        mime_type: kind.mime_type(),
        bytes,
    }))
}

/// Stamp the watermark onto a flattened canvas and encode it as PNG.
pub fn export_image(mut flat: Pixmap, watermark: Option<&Watermark>) -> RenderResult<Vec<u8>> {
    if let Some(watermark) = watermark {
        let canvas = Size::new(f64::from(flat.width()), f64::from(flat.height()));
        let target = raster_watermark_rect(canvas, watermark.size());
        draw_fitted(&mut flat, watermark.image(), target);
    }
    encode_png(&flat)
}

/// Lay a flattened canvas out on a single A4 landscape page.
pub fn export_document(flat: &Pixmap, watermark: Option<&Watermark>) -> RenderResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut xobjects = lopdf::Dictionary::new();
    let mut ops = Vec::new();

    let canvas_id = add_image(&mut doc, flat, false);
    xobjects.set("Im0", canvas_id);
    let printable = Rect::new(
        PAGE_MARGIN,
        PAGE_MARGIN,
        PAGE_SIZE.width - PAGE_MARGIN,
        PAGE_SIZE.height - PAGE_MARGIN,
    );
    let canvas_size = Size::new(f64::from(flat.width()), f64::from(flat.height()));
    place_image(&mut ops, "Im0", contain_fit(canvas_size, printable));

    if let Some(watermark) = watermark {
        let logo_id = add_image(&mut doc, watermark.image(), true);
        xobjects.set("Im1", logo_id);
        let frame = bottom_right_box(PAGE_SIZE, DOCUMENT_WATERMARK_SIZE, DOCUMENT_WATERMARK_MARGIN);
        place_image(&mut ops, "Im1", contain_fit(watermark.size(), frame));
    }

    let content = Content { operations: ops };
    let encoded = content
        .encode()
        .map_err(|e| RenderError::Export(format!("page content: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            real(PAGE_SIZE.width),
            real(PAGE_SIZE.height),
        ],
        "Resources" => dictionary! { "XObject" => xobjects },
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Export(format!("PDF write: {e}")))?;
    Ok(bytes)
}

/// `size` box inset `margin` from the bottom-right of `area`, in top-left
/// origin coordinates.
fn bottom_right_box(area: Size, size: Size, margin: f64) -> Rect {
    let x1 = area.width - margin;
    let y1 = area.height - margin;
    Rect::new(x1 - size.width, y1 - size.height, x1, y1)
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

/// Draw XObject `name` into `rect` (top-left origin) on a PDF page.
fn place_image(ops: &mut Vec<Operation>, name: &str, rect: Rect) {
    let bottom = PAGE_SIZE.height - rect.y1;
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![
            real(rect.width()),
            Object::Integer(0),
            Object::Integer(0),
            real(rect.height()),
            real(rect.x0),
            real(bottom),
        ],
    ));
    ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
    ops.push(Operation::new("Q", vec![]));
}

/// Add an 8-bit RGB image XObject, with a DeviceGray soft mask when
/// `with_alpha` is set.
fn add_image(doc: &mut Document, pixmap: &Pixmap, with_alpha: bool) -> ObjectId {
    let pixels = pixmap.pixels();
    let mut rgb = Vec::with_capacity(pixels.len() * 3);
    let mut alpha = Vec::with_capacity(if with_alpha { pixels.len() } else { 0 });
    for px in pixels {
        let c = px.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        if with_alpha {
            alpha.push(c.alpha());
        }
    }

    let width = i64::from(pixmap.width());
    let height = i64::from(pixmap.height());
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if with_alpha {
        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        dict.set("SMask", mask_id);
    }

    doc.add_object(Stream::new(dict, rgb))
}
