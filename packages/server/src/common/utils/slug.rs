use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anything that is not an ASCII word character, whitespace or hyphen
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9_\s-]").expect("valid slug regex");

    // Runs of whitespace, underscores and hyphens collapse to one hyphen
    static ref SEPARATORS: Regex = Regex::new(r"[\s_-]+").expect("valid slug regex");
}

/// Turn arbitrary text into a URL-safe slug.
///
/// Lowercase, ASCII alphanumerics separated by single hyphens, never a
/// leading or trailing hyphen. Never fails: input with nothing usable (pure
/// punctuation, whitespace, non-Latin script) yields an empty string, which
/// callers must treat as "no slug".
///
/// ```rust
/// use newsroom_core::common::utils::slug_text;
///
/// assert_eq!(slug_text("Local News!"), "local-news");
/// assert_eq!(slug_text("  "), "");
/// ```
pub fn slug_text(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    hyphenated.trim_matches('-').to_string()
}
