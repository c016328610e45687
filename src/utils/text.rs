//! Rendered-Text Helpers
//!
//! The rewrite engine emits constrained inline markup (`<strong>`, `<u>`,
//! `<span style="color:...">`). The character budget applies to the rendered
//! text, so these helpers strip tags before measuring, and produce a
//! normalized form for variant deduplication.

/// Strip inline markup tags, keeping their text content.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Rendered length in characters, excluding markup.
pub fn rendered_len(input: &str) -> usize {
    strip_markup(input).chars().count()
}

/// Normalized rendered form for deduplicating rewrite variants: markup
/// stripped, whitespace collapsed, lowercased.
pub fn normalize_rendered(input: &str) -> String {
    strip_markup(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
