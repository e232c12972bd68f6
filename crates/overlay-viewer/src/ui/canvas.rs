use crate::constants::*;
use crate::overlay::compose::{self, OverlayElement};
use crate::overlay::evidence::{EvidenceGroup, EvidenceIndex};
use crate::viewer::navigation;
use crate::viewer::rasterizer::Rasterizer;
use crate::viewer::state::ViewerState;
use eframe::egui;

/// Stacked page canvas: one allocation per page at its logical size,
/// texture underneath, overlay boxes and the hover tooltip on top.
pub fn show_canvas(
    ui: &mut egui::Ui,
    state: &mut ViewerState,
    rasterizer: &Rasterizer,
    groups: &[EvidenceGroup],
    index: &EvidenceIndex,
) {
    let page_count = rasterizer.page_count();
    if page_count == 0 {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.spinner();
            ui.label("Preparing document…");
        });
        return;
    }

    let tops = navigation::page_tops(&state.doc_page_sizes, state.zoom);

    let mut scroll_area = egui::ScrollArea::vertical()
        .id_salt("overlay_page_stack")
        .auto_shrink([false, false]);
    if let Some(offset) = state.pending_scroll.take() {
        scroll_area = scroll_area.vertical_scroll_offset(offset);
    }

    let mut hovered: Option<(egui::Pos2, String)> = None;

    let output = scroll_area.show(ui, |ui| {
        ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
            for page in 1..=page_count {
                let Some(size) = state.doc_page_sizes.get(page - 1) else {
                    continue;
                };
                let logical = egui::vec2(size.width * state.zoom, size.height * state.zoom);
                let (page_rect, response) = ui.allocate_exact_size(logical, egui::Sense::hover());

                if ui.is_rect_visible(page_rect) {
                    paint_page(ui, state, page, page_rect);

                    let elements = compose::compose(
                        page,
                        state.show_all,
                        &state.annotations.coords,
                        groups,
                        index,
                        &state.annotations.pages,
                        rasterizer.viewports(),
                    );
                    let pointer = response.hover_pos();
                    for element in &elements {
                        let overlay_rect = egui::Rect::from_min_size(
                            page_rect.min + egui::vec2(element.rect.x, element.rect.y),
                            egui::vec2(element.rect.width, element.rect.height),
                        );
                        paint_overlay(ui.painter(), overlay_rect, element);

                        if let Some(pos) = pointer
                            && overlay_rect.contains(pos)
                        {
                            hovered = Some((pos, element.label.clone()));
                        }
                    }
                }

                ui.add_space(PAGE_SPACING);
            }
        });
    });

    state.scroll_offset = output.state.offset.y;
    state.current_page = current_page_at(state.scroll_offset, &tops);

    if let Some((pos, label)) = hovered {
        show_tooltip(ui, pos, &label);
    }
}

fn paint_page(ui: &egui::Ui, state: &ViewerState, page: usize, page_rect: egui::Rect) {
    if let Some(texture) = state.textures.get(&page) {
        ui.painter().image(
            texture.id(),
            page_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    } else {
        // Unrendered (or render-failed) page keeps its layout slot.
        ui.painter()
            .rect_filled(page_rect, 2.0, ui.visuals().extreme_bg_color);
    }
}

fn paint_overlay(painter: &egui::Painter, rect: egui::Rect, element: &OverlayElement) {
    painter.rect_filled(rect, 0.0, element.fill);

    let stroke = egui::Stroke::new(OVERLAY_STROKE_WIDTH, element.stroke);
    if element.style.is_dashed() {
        let corners = [
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
            rect.left_top(),
        ];
        for edge in corners.windows(2) {
            painter.extend(egui::Shape::dashed_line(
                edge,
                stroke,
                OVERLAY_DASH_LENGTH,
                OVERLAY_GAP_LENGTH,
            ));
        }
    } else {
        painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Outside);
    }
}

fn show_tooltip(ui: &egui::Ui, pos: egui::Pos2, label: &str) {
    let sanitized: String = label
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect();

    egui::Area::new(egui::Id::new("overlay_tooltip"))
        .pivot(egui::Align2::LEFT_TOP)
        .fixed_pos(pos + egui::vec2(12.0, 12.0))
        .constrain(true)
        .order(egui::Order::Tooltip)
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(320.0);
                ui.label(sanitized);
            });
        });
}

fn current_page_at(scroll_offset: f32, tops: &[f32]) -> usize {
    tops.iter()
        .take_while(|&&top| top <= scroll_offset + 1.0)
        .count()
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_page_follows_scroll() {
        let tops = [0.0, 800.0, 1600.0];
        assert_eq!(current_page_at(0.0, &tops), 1);
        assert_eq!(current_page_at(799.0, &tops), 1);
        assert_eq!(current_page_at(800.0, &tops), 2);
        assert_eq!(current_page_at(5000.0, &tops), 3);
    }

    #[test]
    fn test_current_page_never_zero() {
        assert_eq!(current_page_at(0.0, &[]), 1);
    }
}
