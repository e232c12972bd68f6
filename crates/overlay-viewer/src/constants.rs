use egui::Color32;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 4.0;
pub const DEFAULT_ZOOM: f32 = 1.0;

pub const ZOOM_BUTTON_FACTOR: f32 = 1.1;

/// Horizontal padding subtracted from the container width when computing
/// the fit-to-width zoom against page 1.
pub const FIT_WIDTH_PADDING: f32 = 16.0;

/// Vertical gap between stacked pages.
pub const PAGE_SPACING: f32 = 12.0;

/// Pixels kept above a scroll-to-coordinate target so the box does not sit
/// flush against the top edge.
pub const SCROLL_LEAD_MARGIN: f32 = 80.0;

pub const TOOLTIP_MAX_CHARS: usize = 160;

pub const OVERLAY_STROKE_WIDTH: f32 = 1.5;
pub const OVERLAY_DASH_LENGTH: f32 = 4.0;
pub const OVERLAY_GAP_LENGTH: f32 = 3.0;

pub const OPEN_FILL_ALPHA: u8 = 56;
pub const CLOSED_FILL_ALPHA: u8 = 20;
pub const UNLINKED_FILL_ALPHA: u8 = 10;

/// Fallback for coordinate boxes with no owning evidence group.
pub const FALLBACK_AMBER: Color32 = Color32::from_rgb(245, 158, 11);
