pub mod canvas;
pub mod controls;
pub mod viewer_panel;
