// Notice layout: font metrics, label formatting, two-column placement.
// Pure and synchronous; callers run it inside spawn_blocking together with rendering.

pub mod font_metrics;
pub mod label;
pub mod paginator;
pub mod surface;

// Re-export the public API consumed by other modules (render, report handlers).
pub use font_metrics::{FontWeight, Helvetica, TextStyle};
pub use paginator::{a4_report_layout, Field, LayoutInstruction, ReportLayout};
pub use surface::{draw, DrawingSurface, TextMeasurer};
