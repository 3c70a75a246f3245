/// Glyph drawn when a name yields no initials, or when the typeface cannot draw them.
pub const DEFAULT_GLYPH: &str = "?";

/// Up to two upper-cased initials: the first character of each of the first two
/// whitespace-separated tokens. Blank names yield [`DEFAULT_GLYPH`].
///
/// Upper-casing may expand a character (`ß` becomes `SS`); the expansion is kept as is.
pub fn initials(display_name: &str) -> String {
    let out: String = display_name
        .split_whitespace()
        .take(2)
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if out.is_empty() {
        DEFAULT_GLYPH.to_string()
    } else {
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/glyph.rs"]
mod tests;
