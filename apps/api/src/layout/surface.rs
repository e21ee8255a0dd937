//! The seam between layout and whatever turns instructions into a document.

use crate::layout::font_metrics::TextStyle;
use crate::layout::paginator::LayoutInstruction;

/// Line-wrap metrics. Layout only needs to know how a string breaks at a width.
pub trait TextMeasurer {
    /// Splits `text` into lines no wider than `max_width_mm` when set in `style`.
    /// Non-empty text yields at least one line.
    fn split_text_to_size(&self, text: &str, max_width_mm: f32, style: TextStyle) -> Vec<String>;
}

/// A document engine that can place already-wrapped text at a page position.
///
/// Coordinates are millimetres from the top-left corner; `y` is the baseline
/// of the first line.
pub trait DrawingSurface: TextMeasurer {
    type Error;

    fn place_text(
        &mut self,
        lines: &[String],
        x_mm: f32,
        y_mm: f32,
        style: TextStyle,
    ) -> Result<(), Self::Error>;
}

/// Replays instructions onto a surface in emission order.
///
/// Stops at the first surface error and returns it untouched.
pub fn draw<S: DrawingSurface>(
    surface: &mut S,
    instructions: &[LayoutInstruction],
) -> Result<(), S::Error> {
    for instruction in instructions {
        surface.place_text(
            &instruction.lines,
            instruction.x_mm,
            instruction.y_mm,
            instruction.style,
        )?;
    }
    Ok(())
}
