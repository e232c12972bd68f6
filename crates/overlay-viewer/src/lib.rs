pub mod app;
pub mod constants;
pub mod error;
pub mod loader;
pub mod overlay;
pub mod ui;
pub mod viewer;
pub mod widget;

pub use error::{Result, ViewerError};
pub use loader::{AnnotationData, DocumentKey, LoaderConfig};
pub use overlay::evidence::{EvidenceGroup, EvidenceRef};
pub use overlay::geometry::{CoordinateRecord, RawRect};
pub use widget::OverlayViewerWidget;
