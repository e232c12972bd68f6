use crate::error::{Result, ViewerError};
use crate::overlay::geometry::{PageSize, Viewport};
use crossbeam::channel::{Receiver, Sender, unbounded};
use image::RgbImage;
use log::warn;
use pdfium_render::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

/// One page raster job. `generation` is captured at submission time;
/// `cancel` belongs to the per-page handle and may flip at any moment.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub generation: u64,
    pub page: usize,
    pub zoom: f32,
    pub pixels_per_point: f32,
    pub cancel: Arc<AtomicBool>,
}

#[derive(Debug)]
pub enum WorkerEvent {
    Loaded {
        page_count: usize,
        page_sizes: Vec<PageSize>,
    },
    LoadFailed(ViewerError),
    PageRendered {
        generation: u64,
        page: usize,
        image: RgbImage,
        viewport: Viewport,
    },
    PageFailed {
        page: usize,
        error: ViewerError,
    },
}

/// Pixel extent of the raster surface for a page at the given zoom and
/// device pixel ratio.
pub fn pixel_extent(size: PageSize, zoom: f32, pixels_per_point: f32) -> (u32, u32) {
    let width = (size.width * zoom * pixels_per_point).round().max(1.0) as u32;
    let height = (size.height * zoom * pixels_per_point).round().max(1.0) as u32;
    (width, height)
}

/// Logical (non-DPI-scaled) viewport the projector works against.
pub fn logical_viewport(size: PageSize, zoom: f32) -> Viewport {
    Viewport {
        width: size.width * zoom,
        height: size.height * zoom,
    }
}

fn bind_pdfium() -> Result<Pdfium> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf));

    let bindings = match exe_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
            .or_else(|_| Pdfium::bind_to_system_library()),
        None => Pdfium::bind_to_system_library(),
    };

    bindings
        .map(Pdfium::new)
        .map_err(|e| ViewerError::DecodeFailed(format!("Failed to bind PDF library: {}", e)))
}

fn page_sizes(document: &PdfDocument<'_>) -> Vec<PageSize> {
    document
        .pages()
        .iter()
        .map(|page| PageSize {
            width: page.width().value,
            height: page.height().value,
        })
        .collect()
}

fn render_page(
    pdfium: &Pdfium,
    document: &PdfDocument<'_>,
    request: &RenderRequest,
) -> Result<(RgbImage, Viewport)> {
    let page_index =
        u16::try_from(request.page.checked_sub(1).ok_or(ViewerError::PageOutOfRange)?)
            .map_err(|_| ViewerError::PageOutOfRange)?;

    let page = document
        .pages()
        .get(page_index)
        .map_err(|_| ViewerError::PageOutOfRange)?;

    let size = PageSize {
        width: page.width().value,
        height: page.height().value,
    };
    let (width, height) = pixel_extent(size, request.zoom, request.pixels_per_point);

    let mut bitmap = PdfBitmap::empty(
        width as i32,
        height as i32,
        PdfBitmapFormat::BGRx,
        pdfium.bindings(),
    )
    .map_err(|e| ViewerError::RenderFailed(format!("Failed to create bitmap: {:?}", e)))?;

    page.render_into_bitmap(&mut bitmap, width as i32, height as i32, None)
        .map_err(|e| ViewerError::RenderFailed(format!("Failed to render bitmap: {:?}", e)))?;

    let pixels = bitmap.as_raw_bytes();
    let mut rgb_image = RgbImage::new(width, height);

    for (i, chunk) in pixels.chunks(4).enumerate() {
        if i < (width * height) as usize {
            let x = i as u32 % width;
            let y = i as u32 / width;
            if chunk.len() >= 4 {
                rgb_image.put_pixel(x, y, image::Rgb([chunk[0], chunk[1], chunk[2]]));
            }
        }
    }

    Ok((rgb_image, logical_viewport(size, request.zoom)))
}

/// Background raster thread. Owns the pdfium instance and the decoded
/// document; the UI side talks to it exclusively through channels and the
/// shared generation counter.
pub struct RenderWorker {
    request_tx: Sender<RenderRequest>,
    event_rx: Receiver<WorkerEvent>,
}

impl RenderWorker {
    pub fn spawn(bytes: Vec<u8>, generation: Arc<AtomicU64>) -> Self {
        let (request_tx, request_rx) = unbounded::<RenderRequest>();
        let (event_tx, event_rx) = unbounded::<WorkerEvent>();

        thread::spawn(move || worker_loop(bytes, &generation, &request_rx, &event_tx));

        Self {
            request_tx,
            event_rx,
        }
    }

    /// Queue a page render. Requests for a superseded generation are
    /// drained silently by the worker.
    pub fn submit(&self, request: RenderRequest) {
        // A closed channel means the worker died; the Loaded/LoadFailed
        // event already told the UI.
        let _ = self.request_tx.send(request);
    }

    pub fn poll_events(&self) -> Vec<WorkerEvent> {
        self.event_rx.try_iter().collect()
    }
}

fn worker_loop(
    bytes: Vec<u8>,
    generation: &AtomicU64,
    request_rx: &Receiver<RenderRequest>,
    event_tx: &Sender<WorkerEvent>,
) {
    let pdfium = match bind_pdfium() {
        Ok(pdfium) => pdfium,
        Err(error) => {
            let _ = event_tx.send(WorkerEvent::LoadFailed(error));
            return;
        }
    };

    let document = match pdfium.load_pdf_from_byte_vec(bytes, None) {
        Ok(document) => document,
        Err(error) => {
            let _ = event_tx.send(WorkerEvent::LoadFailed(ViewerError::DecodeFailed(
                error.to_string(),
            )));
            return;
        }
    };

    let sizes = page_sizes(&document);
    if event_tx
        .send(WorkerEvent::Loaded {
            page_count: sizes.len(),
            page_sizes: sizes,
        })
        .is_err()
    {
        return;
    }

    for request in request_rx.iter() {
        // Token check before the render step: a superseded pass or a
        // cancelled handle is discarded without reporting.
        if request.cancel.load(Ordering::Relaxed)
            || request.generation != generation.load(Ordering::SeqCst)
        {
            continue;
        }

        let result = render_page(&pdfium, &document, &request);

        // And again after: the zoom may have changed mid-render. The
        // finished bitmap for the old generation must never land.
        if request.cancel.load(Ordering::Relaxed)
            || request.generation != generation.load(Ordering::SeqCst)
        {
            continue;
        }

        let event = match result {
            Ok((image, viewport)) => WorkerEvent::PageRendered {
                generation: request.generation,
                page: request.page,
                image,
                viewport,
            },
            Err(error) => {
                warn!("Render of page {} failed: {}", request.page, error);
                WorkerEvent::PageFailed {
                    page: request.page,
                    error,
                }
            }
        };

        if event_tx.send(event).is_err() {
            return;
        }
    }
}
