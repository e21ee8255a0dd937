//! Field-name to heading conversion.

/// Turns a raw backend key into a printable heading.
///
/// `adverse_effects` → `Adverse Effects`, `DCI` → `Dci`, `hla-b` → `Hla-B`.
/// Underscores become spaces, everything is lower-cased, and the first
/// letter or digit of every word is upper-cased. Accented letters are letters
/// too: `état` → `État`, and `indésirables` stays one word. Applying it twice
/// gives the same result as applying it once.
pub fn display_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_word = false;

    for c in raw.replace('_', " ").chars().flat_map(char::to_lowercase) {
        let is_word = c.is_alphanumeric();
        if is_word && !prev_is_word {
            push_upper(&mut out, c);
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Upper-cases `c` only when that maps to exactly one character, so that
/// lower-casing the result again gives back `c`.
fn push_upper(out: &mut String, c: char) {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => out.push(u),
        _ => out.push(c),
    }
}
