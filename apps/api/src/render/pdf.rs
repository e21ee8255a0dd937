//! `printpdf` drawing surface.
//!
//! The document is one A4 page with the built-in Helvetica faces, so nothing
//! is embedded and the widths in `layout::font_metrics` match the output.
//! Those faces only encode WinAnsi, so text is passed through `to_winansi`
//! before it is measured and again before it is drawn.
//! `PdfDocumentReference` is not `Send`; build and finish a surface on the
//! same thread (handlers do it inside `spawn_blocking`).

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::{
    draw, DrawingSurface, Field, FontWeight, Helvetica, ReportLayout, TextMeasurer, TextStyle,
};
use crate::render::winansi::to_winansi;

/// Baseline-to-baseline distance as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("PDF buffer error: {0}")]
    Buffer(String),
}

pub struct PdfSurface {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_height_mm: f32,
}

impl PdfSurface {
    pub fn new(title: &str, layout: &ReportLayout) -> Result<Self, RenderError> {
        let (doc, page1, layer1) = PdfDocument::new(
            title,
            Mm(layout.page_width_mm),
            Mm(layout.page_height_mm),
            "Layer 1",
        );
        let layer = doc.get_page(page1).get_layer(layer1);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            page_height_mm: layout.page_height_mm,
        })
    }

    fn font(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// Serializes the document. Consumes the surface.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| RenderError::Save(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| RenderError::Buffer(e.to_string()))
    }
}

impl TextMeasurer for PdfSurface {
    fn split_text_to_size(&self, text: &str, max_width_mm: f32, style: TextStyle) -> Vec<String> {
        let encodable = to_winansi(text);
        if encodable.substituted > 0 {
            warn!(
                substituted = encodable.substituted,
                "Replaced characters the built-in PDF fonts cannot print"
            );
        }
        Helvetica.split_text_to_size(&encodable.text, max_width_mm, style)
    }
}

impl DrawingSurface for PdfSurface {
    type Error = RenderError;

    fn place_text(
        &mut self,
        lines: &[String],
        x_mm: f32,
        y_mm: f32,
        style: TextStyle,
    ) -> Result<(), RenderError> {
        let pitch_mm = style.em_to_mm(LINE_HEIGHT_FACTOR);
        let font = self.font(style.weight);

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            // Layout measures from the top edge; PDF user space starts at the bottom.
            let baseline = self.page_height_mm - (y_mm + i as f32 * pitch_mm);
            let encodable = to_winansi(line);
            if encodable.substituted > 0 {
                warn!(
                    substituted = encodable.substituted,
                    "Replaced unmeasured characters before drawing"
                );
            }
            self.layer.use_text(
                encodable.text.into_owned(),
                style.size_pt,
                Mm(x_mm),
                Mm(baseline),
                font,
            );
        }
        Ok(())
    }
}

/// Lays out and renders a complete notice. Returns the PDF bytes.
pub fn render_report(
    title: &str,
    fields: &[Field],
    layout: &ReportLayout,
) -> Result<Vec<u8>, RenderError> {
    let mut surface = PdfSurface::new(title, layout)?;
    let instructions = layout.layout(title, fields, &surface);
    draw(&mut surface, &instructions)?;

    debug!(
        fields = fields.len(),
        instructions = instructions.len(),
        "Rendered notice"
    );
    surface.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::a4_report_layout;

    #[test]
    fn test_render_produces_pdf_bytes() {
        let fields = vec![
            Field::new("drug_name", "Abacavir"),
            Field::new("dosage", "300mg twice daily"),
            Field::new("warnings", "Contraindicated in HLA-B*5701 carriers"),
        ];
        let bytes = render_report("Notice du médicament : Abacavir", &fields, &a4_report_layout())
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-"), "missing PDF header");
        assert!(bytes.len() > 200);
    }

    #[test]
    fn test_render_with_no_fields() {
        let bytes = render_report("Notice", &[], &a4_report_layout()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_measured_text_is_encodable() {
        let surface = PdfSurface::new("Notice", &a4_report_layout()).unwrap();
        let lines = surface.split_text_to_size("β-bloquant ≤ 5 µg α", 80.0, TextStyle::normal(11.0));
        assert_eq!(lines, vec!["beta-bloquant <= 5 µg alpha".to_string()]);
    }

    #[test]
    fn test_unencodable_characters_reach_the_page_substituted() {
        let fields = vec![Field::new("classe", "β ≤ 5 µg")];
        let bytes = render_report("Notice", &fields, &a4_report_layout()).unwrap();

        // "Classe : beta <= 5 µg" in WinAnsi. Page content streams are never compressed.
        let expected = b"<436C61737365203A2062657461203C3D203520B567> Tj";
        assert!(
            bytes.windows(expected.len()).any(|w| w == expected),
            "substituted text not found in the content stream"
        );
    }

    #[test]
    fn test_render_tolerates_overflow() {
        let fields: Vec<Field> = (0..120)
            .map(|i| Field::new(format!("field_{i}"), "long value ".repeat(8)))
            .collect();
        assert!(render_report("Notice", &fields, &a4_report_layout()).is_ok());
    }
}
