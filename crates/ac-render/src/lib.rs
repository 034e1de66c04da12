/// Terminal rendering for asciicam.
///
/// Grid drawing, parameter sidebar, help overlay and FPS tracking.
pub mod canvas;
pub mod fps;
pub mod ui;

pub use ui::{DrawContext, ViewState};
