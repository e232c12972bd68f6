pub mod color;
pub mod compose;
pub mod evidence;
pub mod geometry;
pub mod numbered_text;
