use super::{canvas, controls};
use crate::overlay::evidence::{EvidenceGroup, EvidenceIndex};
use crate::viewer::rasterizer::Rasterizer;
use crate::viewer::state::{LoadPhase, ViewerState};
use eframe::egui;

pub struct OverlayViewerPanel {
    show_controls: bool,
}

impl OverlayViewerPanel {
    pub fn new() -> Self {
        Self {
            show_controls: true,
        }
    }

    /// Returns true when a control interaction changed the zoom and the
    /// caller must schedule a new render pass.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        state: &mut ViewerState,
        rasterizer: &Rasterizer,
        groups: &[EvidenceGroup],
        index: &EvidenceIndex,
    ) -> bool {
        egui::TopBottomPanel::bottom("render_status").show(ctx, |ui| {
            show_status(ui, state, rasterizer);
        });

        let mut zoom_changed = false;
        egui::CentralPanel::default().show(ctx, |ui| match state.phase.clone() {
            LoadPhase::Idle => {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.label("No document selected");
                });
            }
            LoadPhase::Fetching => {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.spinner();
                    ui.label("Fetching document…");
                });
            }
            LoadPhase::Decoding => {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.spinner();
                    ui.label("Decoding document…");
                });
            }
            LoadPhase::Failed(message) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.colored_label(ui.visuals().error_fg_color, message);
                });
            }
            LoadPhase::Ready => {
                if self.show_controls {
                    let response = controls::show_controls(ui, state, rasterizer.page_count());
                    zoom_changed = response.zoom_changed;
                    ui.separator();
                }
                canvas::show_canvas(ui, state, rasterizer, groups, index);
            }
        });

        zoom_changed
    }

    pub fn toggle_controls(&mut self) {
        self.show_controls = !self.show_controls;
    }
}

impl Default for OverlayViewerPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn show_status(ui: &mut egui::Ui, state: &ViewerState, rasterizer: &Rasterizer) {
    ui.horizontal(|ui| {
        ui.label(format!(
            "Rendered {}/{} pages | Zoom {:.0}% | {} regions",
            rasterizer.rendered_pages(),
            rasterizer.page_count(),
            state.zoom * 100.0,
            state.annotations.coords.len()
        ));
    });
}
