use crate::constants::*;
use crate::loader::AnnotationData;
use crate::overlay::geometry::PageSize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    Idle,
    Fetching,
    Decoding,
    Ready,
    Failed(String),
}

/// Per-document viewer state. Nothing here is persisted; a new document
/// key resets the lot.
pub struct ViewerState {
    pub phase: LoadPhase,
    pub annotations: AnnotationData,
    pub sentences: Vec<Option<String>>,
    /// Page sizes as reported by the decoder, used for layout and as the
    /// fit-to-width reference. Projection uses `annotations.pages`, which
    /// may be in a different unit space.
    pub doc_page_sizes: Vec<PageSize>,
    pub zoom: f32,
    /// True until either a fit-to-width pass or an explicit zoom choice
    /// has fixed the zoom for this document.
    pub fit_width_pending: bool,
    pub show_all: bool,
    pub pending_scroll: Option<f32>,
    pub scroll_offset: f32,
    pub current_page: usize,
    pub textures: HashMap<usize, egui::TextureHandle>,
}

impl ViewerState {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
            annotations: AnnotationData::default(),
            sentences: Vec::new(),
            doc_page_sizes: Vec::new(),
            zoom: DEFAULT_ZOOM,
            fit_width_pending: true,
            show_all: false,
            pending_scroll: None,
            scroll_offset: 0.0,
            current_page: 1,
            textures: HashMap::new(),
        }
    }

    /// Reset for a new document key; decoded resources for the previous
    /// document are released here.
    pub fn reset_for_document(&mut self) {
        *self = Self::new();
        self.phase = LoadPhase::Fetching;
    }

    /// Clamp and apply an explicit zoom choice. Returns true when the
    /// value actually changed and a re-render pass is needed.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.fit_width_pending = false;
        if (clamped - self.zoom).abs() < 0.001 {
            return false;
        }
        self.zoom = clamped;
        true
    }

    /// Fit-to-width zoom against page 1 for the given container width.
    /// `None` until the decoder has reported page sizes.
    pub fn fit_width_zoom(&self, container_width: f32) -> Option<f32> {
        let reference = self.doc_page_sizes.first()?;
        if reference.width <= 0.0 {
            return None;
        }
        let zoom = (container_width - FIT_WIDTH_PADDING) / reference.width;
        Some(zoom.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}
