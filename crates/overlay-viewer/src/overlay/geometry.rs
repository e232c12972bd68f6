use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire-level rectangle. Layout extraction emits two shapes depending on
/// the pipeline that produced it: absolute corners (`ulx/uly/lrx/lry`) or
/// origin plus extent (`x/y/width/height`). Both are normalized to
/// [`Rect`] once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRect {
    Corners { ulx: f32, uly: f32, lrx: f32, lry: f32 },
    Extent { x: f32, y: f32, width: f32, height: f32 },
}

/// Canonical rectangle in document units, upper-left and lower-right
/// corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub ulx: f32,
    pub uly: f32,
    pub lrx: f32,
    pub lry: f32,
}

impl From<RawRect> for Rect {
    fn from(raw: RawRect) -> Self {
        match raw {
            RawRect::Corners { ulx, uly, lrx, lry } => Self { ulx, uly, lrx, lry },
            RawRect::Extent {
                x,
                y,
                width,
                height,
            } => Self {
                ulx: x,
                uly: y,
                lrx: x + width,
                lry: y + height,
            },
        }
    }
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.lrx - self.ulx
    }

    pub fn height(&self) -> f32 {
        self.lry - self.uly
    }
}

/// One extracted sentence/paragraph box. `page` is 1-based, matching the
/// layout extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    pub page: usize,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub rect: RawRect,
}

impl CoordinateRecord {
    pub fn rect(&self) -> Rect {
        Rect::from(self.rect)
    }
}

/// Intrinsic page size in document units, one entry per page in page
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Realized pixel size of a rendered page. Valid only for the zoom at
/// which the page was last rendered; the rasterizer drops it on zoom
/// change until the re-render lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Project a document-unit rectangle into viewport pixels for its page.
/// Returns `None` while the page is unrendered or its document-unit size
/// is unknown; callers skip the element rather than treating this as an
/// error.
pub fn project(
    record: &CoordinateRecord,
    page_sizes: &[PageSize],
    viewports: &HashMap<usize, Viewport>,
) -> Option<PixelRect> {
    if record.page == 0 {
        return None;
    }
    let page_size = page_sizes.get(record.page - 1)?;
    let viewport = viewports.get(&record.page)?;

    if page_size.width <= 0.0 || page_size.height <= 0.0 {
        return None;
    }

    let scale_x = viewport.width / page_size.width;
    let scale_y = viewport.height / page_size.height;

    let rect = record.rect();
    Some(PixelRect {
        x: rect.ulx * scale_x,
        y: rect.uly * scale_y,
        width: rect.width() * scale_x,
        height: rect.height() * scale_y,
    })
}
