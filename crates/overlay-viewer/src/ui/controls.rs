use crate::constants::*;
use crate::viewer::state::ViewerState;
use eframe::egui;

pub struct ControlsResponse {
    /// The zoom value changed and a new render pass is needed.
    pub zoom_changed: bool,
}

pub fn show_controls(
    ui: &mut egui::Ui,
    state: &mut ViewerState,
    page_count: usize,
) -> ControlsResponse {
    let mut zoom_changed = false;

    ui.horizontal(|ui| {
        if ui.button("🔍-").clicked() {
            zoom_changed |= state.set_zoom(state.zoom / ZOOM_BUTTON_FACTOR);
        }

        let mut zoom_pct = (state.zoom * 100.0) as i32;
        if ui
            .add(
                egui::Slider::new(
                    &mut zoom_pct,
                    (MIN_ZOOM * 100.0) as i32..=(MAX_ZOOM * 100.0) as i32,
                )
                .text("%"),
            )
            .changed()
        {
            zoom_changed |= state.set_zoom(zoom_pct as f32 / 100.0);
        }

        if ui.button("🔍+").clicked() {
            zoom_changed |= state.set_zoom(state.zoom * ZOOM_BUTTON_FACTOR);
        }

        if ui.button("↔ Fit width").clicked() {
            state.fit_width_pending = true;
        }

        ui.separator();

        let toggle_text = if state.show_all {
            "Evidence only"
        } else {
            "Show all regions"
        };
        if ui.button(toggle_text).clicked() {
            state.show_all = !state.show_all;
        }

        ui.separator();

        ui.label(format!("Page {} / {}", state.current_page, page_count));
    });

    ControlsResponse { zoom_changed }
}
