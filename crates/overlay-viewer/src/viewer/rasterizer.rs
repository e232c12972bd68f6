use crate::error::ViewerError;
use crate::overlay::geometry::{PageSize, Viewport};
use crate::viewer::render_worker::{RenderRequest, RenderWorker, WorkerEvent};
use image::RgbImage;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-flight render of one page. Cancellation is idempotent and
/// side-effect-free beyond releasing the handle; a cancelled render is
/// silently discarded, never reported.
#[derive(Debug)]
struct RenderHandle {
    generation: u64,
    cancel: Arc<AtomicBool>,
}

impl RenderHandle {
    fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub enum RasterEvent {
    DocumentReady {
        page_count: usize,
        page_sizes: Vec<PageSize>,
    },
    DocumentFailed(ViewerError),
    PageCommitted {
        page: usize,
        image: RgbImage,
    },
}

/// UI-side render scheduling: owns the generation token, the per-page
/// in-flight handle table and the realized viewports. All mutation
/// happens on the UI thread; the worker only reads the shared generation
/// counter.
pub struct Rasterizer {
    worker: Option<RenderWorker>,
    generation: Arc<AtomicU64>,
    in_flight: HashMap<usize, RenderHandle>,
    viewports: HashMap<usize, Viewport>,
    page_count: usize,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            worker: None,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: HashMap::new(),
            viewports: HashMap::new(),
            page_count: 0,
        }
    }

    /// Hand the fetched bytes to a fresh worker. Any renders still in
    /// flight for the previous document are cancelled and their
    /// completions rejected by the generation bump.
    pub fn attach_document(&mut self, bytes: Vec<u8>) {
        self.detach();
        self.worker = Some(RenderWorker::spawn(bytes, Arc::clone(&self.generation)));
    }

    pub fn detach(&mut self) {
        self.bump_generation();
        self.worker = None;
        self.page_count = 0;
    }

    /// Start a new render pass: increments the generation token, cancels
    /// every in-flight handle and invalidates all realized viewports
    /// until the re-render lands.
    pub fn bump_generation(&mut self) -> u64 {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        for handle in self.in_flight.values() {
            handle.cancel();
        }
        self.in_flight.clear();
        self.viewports.clear();
        next
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Queue one page at the current generation, cancelling and replacing
    /// any render already in flight for that page.
    pub fn request_page(&mut self, page: usize, zoom: f32, pixels_per_point: f32) {
        if let Some(existing) = self.in_flight.remove(&page) {
            existing.cancel();
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let generation = self.current_generation();
        self.in_flight.insert(
            page,
            RenderHandle {
                generation,
                cancel: Arc::clone(&cancel),
            },
        );

        if let Some(worker) = &self.worker {
            worker.submit(RenderRequest {
                generation,
                page,
                zoom,
                pixels_per_point,
                cancel,
            });
        }
    }

    /// Issue the whole document in page order at a fresh generation.
    pub fn request_all(&mut self, zoom: f32, pixels_per_point: f32) {
        self.bump_generation();
        for page in 1..=self.page_count {
            self.request_page(page, zoom, pixels_per_point);
        }
    }

    /// Drain worker events, committing only results that still belong to
    /// the current generation.
    pub fn poll(&mut self) -> Vec<RasterEvent> {
        let events = match &self.worker {
            Some(worker) => worker.poll_events(),
            None => Vec::new(),
        };

        events
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    fn handle_event(&mut self, event: WorkerEvent) -> Option<RasterEvent> {
        match event {
            WorkerEvent::Loaded {
                page_count,
                page_sizes,
            } => {
                self.page_count = page_count;
                Some(RasterEvent::DocumentReady {
                    page_count,
                    page_sizes,
                })
            }
            WorkerEvent::LoadFailed(error) => Some(RasterEvent::DocumentFailed(error)),
            WorkerEvent::PageRendered {
                generation,
                page,
                image,
                viewport,
            } => {
                if generation != self.current_generation() {
                    debug!(
                        "Discarding page {} render from superseded generation {}",
                        page, generation
                    );
                    return None;
                }
                if let Some(handle) = self.in_flight.get(&page)
                    && handle.generation == generation
                {
                    self.in_flight.remove(&page);
                }
                self.viewports.insert(page, viewport);
                Some(RasterEvent::PageCommitted { page, image })
            }
            WorkerEvent::PageFailed { page, .. } => {
                // Already logged by the worker; the page stays unrendered
                // and its siblings continue.
                self.in_flight.remove(&page);
                None
            }
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn viewports(&self) -> &HashMap<usize, Viewport> {
        &self.viewports
    }

    pub fn viewport(&self, page: usize) -> Option<Viewport> {
        self.viewports.get(&page).copied()
    }

    pub fn rendered_pages(&self) -> usize {
        self.viewports.len()
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Rasterizer {
    fn drop(&mut self) {
        for handle in self.in_flight.values() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::render_worker::logical_viewport;

    fn letter() -> PageSize {
        PageSize {
            width: 612.0,
            height: 792.0,
        }
    }

    fn rendered(generation: u64, page: usize, zoom: f32) -> WorkerEvent {
        WorkerEvent::PageRendered {
            generation,
            page,
            image: RgbImage::new(1, 1),
            viewport: logical_viewport(letter(), zoom),
        }
    }

    fn ready_rasterizer(page_count: usize) -> Rasterizer {
        let mut rasterizer = Rasterizer::new();
        rasterizer.handle_event(WorkerEvent::Loaded {
            page_count,
            page_sizes: vec![letter(); page_count],
        });
        rasterizer
    }

    #[test]
    fn test_current_generation_commit() {
        let mut rasterizer = ready_rasterizer(1);
        let generation = rasterizer.bump_generation();

        let committed = rasterizer.handle_event(rendered(generation, 1, 1.0));
        assert!(matches!(
            committed,
            Some(RasterEvent::PageCommitted { page: 1, .. })
        ));
        assert_eq!(rasterizer.viewport(1), Some(logical_viewport(letter(), 1.0)));
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut rasterizer = ready_rasterizer(1);
        let stale = rasterizer.bump_generation();
        rasterizer.bump_generation();

        assert!(rasterizer.handle_event(rendered(stale, 1, 1.0)).is_none());
        assert_eq!(rasterizer.viewport(1), None);
    }

    #[test]
    fn test_zoom_change_mid_render_wins() {
        // Start a render at zoom 1.0, then fit-to-width recomputes to 0.8
        // before the first render completes. The 1.0 result arrives late;
        // only the 0.8 viewport may survive.
        let mut rasterizer = ready_rasterizer(1);
        let first_pass = rasterizer.bump_generation();
        let second_pass = rasterizer.bump_generation();

        assert!(rasterizer.handle_event(rendered(first_pass, 1, 1.0)).is_none());
        assert!(
            rasterizer
                .handle_event(rendered(second_pass, 1, 0.8))
                .is_some()
        );
        assert_eq!(rasterizer.viewport(1), Some(logical_viewport(letter(), 0.8)));
    }

    #[test]
    fn test_bump_invalidates_all_viewports() {
        let mut rasterizer = ready_rasterizer(2);
        let generation = rasterizer.bump_generation();
        rasterizer.handle_event(rendered(generation, 1, 1.0));
        rasterizer.handle_event(rendered(generation, 2, 1.0));
        assert_eq!(rasterizer.rendered_pages(), 2);

        rasterizer.bump_generation();
        assert_eq!(rasterizer.rendered_pages(), 0);
    }

    #[test]
    fn test_request_replaces_in_flight_handle() {
        let mut rasterizer = ready_rasterizer(1);
        rasterizer.request_page(1, 1.0, 1.0);
        let first_cancel = Arc::clone(&rasterizer.in_flight[&1].cancel);

        rasterizer.request_page(1, 2.0, 1.0);
        assert!(first_cancel.load(Ordering::Relaxed));
        assert!(!rasterizer.in_flight[&1].cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn test_request_all_covers_every_page_once() {
        let mut rasterizer = ready_rasterizer(3);
        rasterizer.request_all(1.0, 1.0);
        assert_eq!(rasterizer.in_flight.len(), 3);
        for page in 1..=3 {
            assert!(rasterizer.in_flight.contains_key(&page));
        }
    }

    #[test]
    fn test_failed_page_leaves_siblings_alone() {
        let mut rasterizer = ready_rasterizer(2);
        let generation = rasterizer.bump_generation();
        rasterizer.handle_event(rendered(generation, 1, 1.0));

        let failed = rasterizer.handle_event(WorkerEvent::PageFailed {
            page: 2,
            error: ViewerError::RenderFailed("boom".into()),
        });
        assert!(failed.is_none());
        assert_eq!(rasterizer.viewport(1), Some(logical_viewport(letter(), 1.0)));
        assert_eq!(rasterizer.viewport(2), None);
    }
}
