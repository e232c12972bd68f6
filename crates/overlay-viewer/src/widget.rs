use crate::loader::{DocumentFetch, DocumentKey, LoaderConfig};
use crate::overlay::evidence::{self, EvidenceGroup, EvidenceIndex};
use crate::overlay::geometry::CoordinateRecord;
use crate::overlay::numbered_text;
use crate::ui::viewer_panel::OverlayViewerPanel;
use crate::viewer::navigation;
use crate::viewer::rasterizer::{RasterEvent, Rasterizer};
use crate::viewer::state::{LoadPhase, ViewerState};
use eframe::egui;
use log::info;

/// Document overlay renderer: fetches and rasterizes one document,
/// projects evidence-linked coordinate boxes over the pages, and exposes
/// the imperative scroll surface.
pub struct OverlayViewerWidget {
    config: LoaderConfig,
    key: Option<DocumentKey>,
    fetch: Option<DocumentFetch>,
    rasterizer: Rasterizer,
    state: ViewerState,
    panel: OverlayViewerPanel,
    groups: Vec<EvidenceGroup>,
    index: EvidenceIndex,
}

impl OverlayViewerWidget {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            key: None,
            fetch: None,
            rasterizer: Rasterizer::new(),
            state: ViewerState::new(),
            panel: OverlayViewerPanel::default(),
            groups: Vec::new(),
            index: EvidenceIndex::default(),
        }
    }

    /// Load a document. A repeated key is a no-op; a new key cancels all
    /// in-flight work for the previous one and releases its decoded
    /// resources.
    pub fn open(&mut self, key: DocumentKey) {
        if self.key.as_ref() == Some(&key) {
            return;
        }

        self.key = Some(key.clone());
        self.fetch = Some(DocumentFetch::spawn(self.config.clone(), key));
        self.rasterizer.detach();
        self.state.reset_for_document();
        self.reindex();
    }

    /// Replace the evidence-group map. The caller owns the source of
    /// truth and supplies it on every change; the resolution maps are
    /// re-derived whenever the supplied value differs.
    pub fn set_evidence_groups(&mut self, groups: Vec<EvidenceGroup>) {
        if groups == self.groups {
            return;
        }
        self.groups = groups;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = evidence::resolve(&self.state.sentences, &self.groups);
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.poll_fetch();
        self.poll_rasterizer(ctx);
        self.maybe_fit_width(ctx);

        let zoom_changed =
            self.panel
                .show(ctx, &mut self.state, &self.rasterizer, &self.groups, &self.index);
        if zoom_changed {
            self.rasterizer
                .request_all(self.state.zoom, ctx.pixels_per_point());
        }

        // Channel completions arrive without user input; keep polling
        // while work is outstanding.
        if self.fetch.is_some()
            || (self.state.is_ready()
                && self.rasterizer.rendered_pages() < self.rasterizer.page_count())
        {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }

    fn poll_fetch(&mut self) {
        let Some(fetch) = &self.fetch else {
            return;
        };
        let Some(outcome) = fetch.poll() else {
            return;
        };
        self.fetch = None;

        match outcome {
            Ok(document) => {
                self.state.annotations = document.annotations;
                self.state.sentences =
                    numbered_text::parse_numbered_text(&self.state.annotations.fulltext);
                self.reindex();
                self.state.phase = LoadPhase::Decoding;
                self.rasterizer.attach_document(document.bytes);
            }
            Err(error) => {
                self.state.phase = LoadPhase::Failed(error.to_string());
            }
        }
    }

    fn poll_rasterizer(&mut self, ctx: &egui::Context) {
        for event in self.rasterizer.poll() {
            match event {
                RasterEvent::DocumentReady {
                    page_count,
                    page_sizes,
                } => {
                    info!("Document decoded: {} pages", page_count);
                    self.state.doc_page_sizes = page_sizes;
                    self.state.phase = LoadPhase::Ready;
                }
                RasterEvent::DocumentFailed(error) => {
                    self.state.phase = LoadPhase::Failed(error.to_string());
                }
                RasterEvent::PageCommitted { page, image } => {
                    let size = [image.width() as usize, image.height() as usize];
                    let color_image = egui::ColorImage::from_rgb(size, image.as_raw());
                    let texture = ctx.load_texture(
                        format!("overlay_page_{}", page),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.state.textures.insert(page, texture);
                }
            }
        }
    }

    /// Until an explicit zoom is chosen, derive zoom from the container
    /// width and page 1, then issue the initial render pass. Also re-runs
    /// when the user presses the fit-width button.
    fn maybe_fit_width(&mut self, ctx: &egui::Context) {
        if !self.state.fit_width_pending || !self.state.is_ready() {
            return;
        }
        let container_width = ctx.available_rect().width();
        let Some(zoom) = self.state.fit_width_zoom(container_width) else {
            return;
        };

        self.state.fit_width_pending = false;
        let needs_render = (zoom - self.state.zoom).abs() > 0.001
            || self.rasterizer.rendered_pages() < self.rasterizer.page_count();
        self.state.zoom = zoom;
        if needs_render {
            self.rasterizer.request_all(zoom, ctx.pixels_per_point());
        }
    }

    // Imperative handle surface.

    /// Scroll so page `page`'s top aligns near the top; out-of-range
    /// values clamp to `[1, page_count]`.
    pub fn scroll_to_page(&mut self, page: usize) {
        let tops = navigation::page_tops(&self.state.doc_page_sizes, self.state.zoom);
        if let Some(offset) =
            navigation::page_scroll_offset(page, self.rasterizer.page_count(), &tops)
        {
            self.state.pending_scroll = Some(offset);
        }
    }

    /// Scroll to an absolute coordinate. Forces show-all so the target is
    /// visible even when it is not evidence-linked; a no-op while the
    /// target page is unrendered.
    pub fn scroll_to_coord(&mut self, record: &CoordinateRecord) {
        self.state.show_all = true;
        let tops = navigation::page_tops(&self.state.doc_page_sizes, self.state.zoom);
        if let Some(offset) = navigation::coord_scroll_offset(
            record,
            &self.state.annotations.pages,
            self.rasterizer.viewports(),
            &tops,
        ) {
            self.state.pending_scroll = Some(offset);
        }
    }

    /// Scroll to the first coordinate record matching the sentence at
    /// `index`. A missing sentence or an unmatched text is a silent miss.
    pub fn scroll_to_sentence_index(&mut self, index: usize) {
        let Some(record) = navigation::record_for_sentence(
            index,
            &self.state.sentences,
            &self.state.annotations.coords,
        ) else {
            return;
        };
        let record = record.clone();
        self.scroll_to_coord(&record);
    }

    pub fn page_count(&self) -> usize {
        self.rasterizer.page_count()
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn toggle_controls(&mut self) {
        self.panel.toggle_controls();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::evidence::EvidenceRef;
    use crate::overlay::geometry::{PageSize, RawRect};

    fn widget() -> OverlayViewerWidget {
        OverlayViewerWidget::new(LoaderConfig {
            base_url: "https://portal.example/api".to_string(),
            auth_token: "token".to_string(),
        })
    }

    fn record(page: usize, text: &str) -> CoordinateRecord {
        CoordinateRecord {
            page,
            text: text.to_string(),
            rect: RawRect::Corners {
                ulx: 50.0,
                uly: 300.0,
                lrx: 550.0,
                lry: 320.0,
            },
        }
    }

    #[test]
    fn test_scroll_to_missing_sentence_is_silent() {
        let mut widget = widget();
        widget.state.sentences =
            numbered_text::parse_numbered_text("[0] First sentence.\n[2] Third sentence.");
        widget.state.annotations.coords = vec![record(1, "First sentence.")];

        widget.scroll_to_sentence_index(1);
        assert_eq!(widget.state.pending_scroll, None);
        assert!(!widget.state.show_all);
    }

    #[test]
    fn test_scroll_to_coord_forces_show_all() {
        let mut widget = widget();
        widget.scroll_to_coord(&record(1, "anything"));
        assert!(widget.state.show_all);
        // Page unrendered: the scroll itself is a no-op.
        assert_eq!(widget.state.pending_scroll, None);
    }

    #[test]
    fn test_scroll_to_sentence_delegates_but_needs_rendered_page() {
        let mut widget = widget();
        widget.state.sentences = numbered_text::parse_numbered_text("[0] First sentence.");
        widget.state.annotations.coords = vec![record(2, "First sentence.")];
        widget.state.annotations.pages = vec![
            PageSize {
                width: 612.0,
                height: 792.0,
            };
            2
        ];
        widget.state.doc_page_sizes = widget.state.annotations.pages.clone();

        widget.scroll_to_sentence_index(0);
        // The sentence matched, so the coordinate scroll ran and forced
        // show-all; the page has no realized viewport yet, so the scroll
        // itself stays a no-op.
        assert!(widget.state.show_all);
        assert_eq!(widget.state.pending_scroll, None);
    }

    #[test]
    fn test_set_evidence_groups_reindexes_on_change() {
        let mut widget = widget();
        widget.state.sentences = numbered_text::parse_numbered_text("[0] First sentence.");

        widget.set_evidence_groups(vec![EvidenceGroup {
            name: "Outcome".to_string(),
            refs: vec![EvidenceRef::Sentence(0)],
            is_open: true,
        }]);
        assert!(widget.index.text_key_to_groups.contains_key("First sentence."));

        widget.set_evidence_groups(Vec::new());
        assert!(widget.index.text_key_to_groups.is_empty());
    }

    #[test]
    fn test_open_same_key_is_noop() {
        let mut widget = widget();
        let key = DocumentKey {
            review_id: "sr".to_string(),
            citation_id: "cit".to_string(),
        };
        // First open spawns a fetch (against an unreachable host; the
        // error is parked in the slot and never polled here).
        widget.open(key.clone());
        widget.state.show_all = true;
        widget.open(key);
        // State untouched on the repeated key.
        assert!(widget.state.show_all);
    }
}
