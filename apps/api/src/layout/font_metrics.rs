//! Static font-metric tables for the two PDF base fonts used by the notice.
//!
//! Character widths are in em units (relative to font size), taken from the
//! Adobe AFM files for Helvetica and Helvetica-Bold. These are the fonts every
//! PDF viewer ships, so the widths here match what ends up on the page.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

use crate::layout::surface::TextMeasurer;

/// Points per millimetre (72pt per inch, 25.4mm per inch).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

// ────────────────────────────────────────────────────────────────────────────
// Font selection
// ────────────────────────────────────────────────────────────────────────────

/// The two base-14 faces the notice is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Font size and weight for one draw instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: f32,
    pub weight: FontWeight,
}

impl TextStyle {
    pub const fn normal(size_pt: f32) -> Self {
        Self {
            size_pt,
            weight: FontWeight::Normal,
        }
    }

    pub const fn bold(size_pt: f32) -> Self {
        Self {
            size_pt,
            weight: FontWeight::Bold,
        }
    }

    /// Converts an em measurement at this style's size into millimetres.
    pub fn em_to_mm(&self, em: f32) -> f32 {
        em * self.size_pt / PT_PER_MM
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one font face.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (accented Latin letters, symbols).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Wraps `text` into lines no wider than `max_width_em`.
    ///
    /// Explicit newlines always start a new line, and an empty paragraph keeps
    /// its blank line. A trailing newline does not add an empty last line.
    /// Inside a paragraph words are packed greedily and runs of whitespace
    /// collapse to one space. A word that is wider than a full line on its own
    /// is broken between characters.
    pub fn wrap(&self, text: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();

        for paragraph in text.lines() {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current = String::new();
            let mut current_width = 0.0_f32;

            for word in words {
                let word_w = self.measure_str(word);
                let space_w = if current.is_empty() {
                    0.0
                } else {
                    self.space_width
                };

                if current_width + space_w + word_w <= max_width_em {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_width += space_w + word_w;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }

                if word_w <= max_width_em {
                    current.push_str(word);
                    current_width = word_w;
                } else {
                    // Overlong word: hard-break it, keeping the tail open for the next word.
                    for c in word.chars() {
                        let c_w = self.char_width(c);
                        if !current.is_empty() && current_width + c_w > max_width_em {
                            lines.push(std::mem::take(&mut current));
                            current_width = 0.0;
                        }
                        current.push(c);
                        current_width += c_w;
                    }
                }
            }
            lines.push(current);
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

/// The Helvetica family as a text measurer. Picks the table matching each style.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl TextMeasurer for Helvetica {
    fn split_text_to_size(&self, text: &str, max_width_mm: f32, style: TextStyle) -> Vec<String> {
        let metrics = get_metrics(style.weight);
        let max_width_em = max_width_mm * PT_PER_MM / style.size_pt;
        metrics.wrap(text, max_width_em)
    }
}

/// Returns the static metric table for the given weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Normal => &HELVETICA_TABLE,
        FontWeight::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_known_widths() {
        let m = get_metrics(FontWeight::Normal);
        // "Hi" = H(0.722) + i(0.222)
        assert!((m.measure_str("Hi") - 0.944).abs() < 1e-4);
        assert_eq!(m.measure_str(""), 0.0);
    }

    #[test]
    fn test_bold_is_wider_than_normal() {
        let text = "Contraindicated in carriers";
        let normal = get_metrics(FontWeight::Normal).measure_str(text);
        let bold = get_metrics(FontWeight::Bold).measure_str(text);
        assert!(bold > normal);
    }

    #[test]
    fn test_non_ascii_uses_average_width() {
        let m = get_metrics(FontWeight::Normal);
        assert!((m.measure_str("é") - m.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_short_text_fits_on_one_line() {
        let lines = Helvetica.split_text_to_size("Dosage : 300mg", 80.0, TextStyle::normal(11.0));
        assert_eq!(lines, vec!["Dosage : 300mg".to_string()]);
    }

    #[test]
    fn test_long_text_wraps_without_exceeding_width() {
        let style = TextStyle::normal(11.0);
        let text = "Effets Indesirables : ".to_string() + &"nausea vomiting headache ".repeat(10);
        let lines = Helvetica.split_text_to_size(&text, 80.0, style);
        assert!(lines.len() > 1, "expected wrap, got {lines:?}");

        let metrics = get_metrics(FontWeight::Normal);
        for line in &lines {
            let width_mm = style.em_to_mm(metrics.measure_str(line));
            assert!(width_mm <= 80.0 + 1e-3, "line too wide: {line:?} = {width_mm}mm");
        }
        // No words lost.
        let rejoined = lines.join(" ");
        assert_eq!(
            rejoined.split_whitespace().count(),
            text.split_whitespace().count()
        );
    }

    #[test]
    fn test_explicit_newlines_are_kept() {
        let lines = Helvetica.split_text_to_size("first\n\nthird", 80.0, TextStyle::normal(11.0));
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_whitespace_runs_collapse_and_trailing_newline_is_dropped() {
        let style = TextStyle::normal(11.0);
        assert_eq!(Helvetica.split_text_to_size("a\n", 80.0, style), vec!["a"]);
        assert_eq!(
            Helvetica.split_text_to_size("300 mg\t \t2 fois/jour  ", 80.0, style),
            vec!["300 mg 2 fois/jour"]
        );
    }

    #[test]
    fn test_overlong_word_is_hard_broken() {
        let word = "A".repeat(200);
        let lines = Helvetica.split_text_to_size(&word, 80.0, TextStyle::normal(11.0));
        assert!(lines.len() >= 2);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let text = "Warnings : Contraindicated in HLA-B*5701 carriers ".repeat(4);
        let a = Helvetica.split_text_to_size(&text, 80.0, TextStyle::normal(11.0));
        let b = Helvetica.split_text_to_size(&text, 80.0, TextStyle::normal(11.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_em_to_mm() {
        // 1em at 72pt is one inch.
        let style = TextStyle::normal(72.0);
        assert!((style.em_to_mm(1.0) - 25.4).abs() < 1e-3);
    }
}
