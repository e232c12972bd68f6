pub mod navigation;
pub mod rasterizer;
pub mod render_worker;
pub mod state;
