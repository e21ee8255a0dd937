//! Turns layout instructions into a PDF document.

pub mod pdf;
pub mod winansi;

pub use pdf::{render_report, RenderError};
