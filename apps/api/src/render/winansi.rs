//! Text substitution for the built-in PDF fonts.
//!
//! The base-14 fonts are WinAnsi (cp1252) encoded and `printpdf` drops every
//! character outside that set. Anything that cannot be encoded is rewritten
//! here first, so a `≤` prints as `<=` instead of vanishing.

use std::borrow::Cow;

/// Result of [`to_winansi`]. `substituted` counts the input characters that were rewritten.
#[derive(Debug, PartialEq)]
pub struct WinAnsiText<'a> {
    pub text: Cow<'a, str>,
    pub substituted: usize,
}

/// Rewrites `input` so that every character is encodable in WinAnsi.
///
/// Newlines are kept; other whitespace becomes a plain space. Known symbols and
/// Greek letters get an ASCII spelling, anything else becomes `?`.
pub fn to_winansi(input: &str) -> WinAnsiText<'_> {
    if input.chars().all(|c| c == '\n' || is_winansi(c)) {
        return WinAnsiText {
            text: Cow::Borrowed(input),
            substituted: 0,
        };
    }

    let mut out = String::with_capacity(input.len());
    let mut substituted = 0;
    for c in input.chars() {
        if c == '\n' || is_winansi(c) {
            out.push(c);
            continue;
        }
        substituted += 1;
        if c.is_whitespace() {
            out.push(' ');
        } else {
            out.push_str(fallback(c));
        }
    }
    WinAnsiText {
        text: Cow::Owned(out),
        substituted,
    }
}

/// True when `c` has a code point in the WinAnsi encoding.
fn is_winansi(c: char) -> bool {
    matches!(
        c,
        ' '..='~'
            | '\u{00A0}'..='\u{00FF}'
            | '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
            | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ' | 'ž' | 'Ÿ'
    )
}

fn fallback(c: char) -> &'static str {
    match c {
        '≤' => "<=",
        '≥' => ">=",
        '≠' => "!=",
        '≈' => "~",
        '−' | '‐' | '‑' | '‒' => "-",
        '→' => "->",
        '←' => "<-",
        '′' => "'",
        '″' => "\"",
        '∞' => "inf",
        // Greek small mu is the micro sign's twin.
        'μ' => "µ",
        'α' => "alpha",
        'β' => "beta",
        'γ' => "gamma",
        'δ' => "delta",
        'ε' => "epsilon",
        'κ' => "kappa",
        'λ' => "lambda",
        'π' => "pi",
        'σ' => "sigma",
        'τ' => "tau",
        'ω' => "omega",
        'Δ' => "Delta",
        'Ω' => "Omega",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodable_text_is_borrowed() {
        let converted = to_winansi("Posologie : 5 µg/kg, été – hiver…\nsuite");
        assert!(matches!(converted.text, Cow::Borrowed(_)));
        assert_eq!(converted.substituted, 0);
    }

    #[test]
    fn test_symbols_and_greek_are_spelled_out() {
        let converted = to_winansi("β-bloquant ≤ 5 µg α");
        assert_eq!(converted.text, "beta-bloquant <= 5 µg alpha");
        assert_eq!(converted.substituted, 3);
    }

    #[test]
    fn test_unknown_characters_become_question_marks() {
        let converted = to_winansi("注意 ok");
        assert_eq!(converted.text, "?? ok");
        assert_eq!(converted.substituted, 2);
    }

    #[test]
    fn test_unusual_whitespace_becomes_space() {
        let converted = to_winansi("dose\u{202F}:\tmax\nfin");
        assert_eq!(converted.text, "dose : max\nfin");
        assert_eq!(converted.substituted, 2);
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let once = to_winansi("≥ 2 mg · γ-GT ≈ 40").text.into_owned();
        let twice = to_winansi(&once);
        assert_eq!(twice.text, once);
        assert_eq!(twice.substituted, 0);
    }
}
