//! Two-column notice layout.
//!
//! # Algorithm
//! - Title, then the attribution line, each advancing a shared cursor.
//! - Both column cursors start at the shared cursor.
//! - Field `i` goes to the left column when `i` is even, right when odd.
//! - Each field is wrapped to the column width and its column advances by
//!   `lines * line_height + field_gap`.
//!
//! Columns are never rebalanced and nothing is moved to a second page. A column
//! running past the printable bottom is logged and left to the renderer to clip.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::font_metrics::TextStyle;
use crate::layout::label::display_label;
use crate::layout::surface::TextMeasurer;

/// Attribution printed under every notice title.
pub const ATTRIBUTION: &str = "Généré automatiquement par Pasteur AI";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl Column {
    /// Strict alternation by input position.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Column::Left
        } else {
            Column::Right
        }
    }
}

/// A `(label, value)` pair as it arrives from the field source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One positioned block of text. `column` is `None` for the title and attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInstruction {
    pub lines: Vec<String>,
    pub x_mm: f32,
    pub y_mm: f32,
    pub style: TextStyle,
    pub column: Option<Column>,
}

/// Page geometry and typography for the notice. All distances in millimetres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub top_margin_mm: f32,
    pub bottom_margin_mm: f32,
    pub left_x_mm: f32,
    pub right_x_mm: f32,
    pub column_width_mm: f32,
    /// Shared cursor advance after the title and after the attribution.
    pub header_advance_mm: f32,
    pub line_height_mm: f32,
    pub field_gap_mm: f32,
    pub title_style: TextStyle,
    pub attribution_style: TextStyle,
    pub field_style: TextStyle,
}

/// A4 portrait, 20mm left margin, right column at 110mm, 80mm columns.
pub fn a4_report_layout() -> ReportLayout {
    ReportLayout {
        page_width_mm: 210.0,
        page_height_mm: 297.0,
        top_margin_mm: 20.0,
        bottom_margin_mm: 10.0,
        left_x_mm: 20.0,
        right_x_mm: 110.0,
        column_width_mm: 80.0,
        header_advance_mm: 10.0,
        line_height_mm: 5.0,
        field_gap_mm: 5.0,
        title_style: TextStyle::bold(18.0),
        attribution_style: TextStyle::normal(12.0),
        field_style: TextStyle::normal(11.0),
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        a4_report_layout()
    }
}

/// Independent vertical cursors for the two columns.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnCursors {
    left_y: f32,
    right_y: f32,
}

impl ColumnCursors {
    fn starting_at(y: f32) -> Self {
        Self {
            left_y: y,
            right_y: y,
        }
    }

    fn get(&self, column: Column) -> f32 {
        match column {
            Column::Left => self.left_y,
            Column::Right => self.right_y,
        }
    }

    fn advance(&mut self, column: Column, by: f32) {
        match column {
            Column::Left => self.left_y += by,
            Column::Right => self.right_y += by,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

impl ReportLayout {
    fn column_x(&self, column: Column) -> f32 {
        match column {
            Column::Left => self.left_x_mm,
            Column::Right => self.right_x_mm,
        }
    }

    fn printable_bottom(&self) -> f32 {
        self.page_height_mm - self.bottom_margin_mm
    }

    /// Cursor advance for a field that wrapped to `line_count` lines.
    pub fn field_advance(&self, line_count: usize) -> f32 {
        line_count as f32 * self.line_height_mm + self.field_gap_mm
    }

    /// Lays out the title, the attribution and every field.
    ///
    /// Always returns `fields.len() + 2` instructions. Values are expected to be
    /// non-empty; the caller filters fields before calling.
    pub fn layout<M: TextMeasurer + ?Sized>(
        &self,
        title: &str,
        fields: &[Field],
        measurer: &M,
    ) -> Vec<LayoutInstruction> {
        let mut instructions = Vec::with_capacity(fields.len() + 2);
        let mut y = self.top_margin_mm;

        instructions.push(LayoutInstruction {
            lines: vec![title.to_string()],
            x_mm: self.left_x_mm,
            y_mm: y,
            style: self.title_style,
            column: None,
        });
        y += self.header_advance_mm;

        instructions.push(LayoutInstruction {
            lines: vec![ATTRIBUTION.to_string()],
            x_mm: self.left_x_mm,
            y_mm: y,
            style: self.attribution_style,
            column: None,
        });
        y += self.header_advance_mm;

        let mut cursors = ColumnCursors::starting_at(y);

        for (index, field) in fields.iter().enumerate() {
            let column = Column::for_index(index);
            let text = format!("{} : {}", display_label(&field.label), field.value);
            let lines = measurer.split_text_to_size(&text, self.column_width_mm, self.field_style);
            let line_count = lines.len();

            instructions.push(LayoutInstruction {
                lines,
                x_mm: self.column_x(column),
                y_mm: cursors.get(column),
                style: self.field_style,
                column: Some(column),
            });
            cursors.advance(column, self.field_advance(line_count));
        }

        let bottom = self.printable_bottom();
        for column in [Column::Left, Column::Right] {
            let end = cursors.get(column);
            if end > bottom {
                warn!(
                    ?column,
                    end_mm = end,
                    page_bottom_mm = bottom,
                    "Notice layout: column runs past the printable area"
                );
            }
        }

        instructions
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
