use crate::widget::OverlayViewerWidget;
use eframe::egui;

pub struct OverlayViewerApp {
    widget: OverlayViewerWidget,
}

impl OverlayViewerApp {
    pub fn new(widget: OverlayViewerWidget) -> Self {
        Self { widget }
    }
}

impl eframe::App for OverlayViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.widget.show(ctx);
    }
}
