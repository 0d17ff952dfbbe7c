/// Pure utility functions for article text
///
/// No I/O here; these take inputs and return outputs.

/// Build a teaser from the article body when no excerpt was written.
///
/// Whitespace is collapsed first. If the result is longer than `max_chars`
/// characters it is cut at the last word boundary that fits and "..." is
/// appended, so the output never exceeds `max_chars` characters.
pub fn generate_summary(content: &str, max_chars: usize) -> String {
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");

    if flattened.chars().count() <= max_chars {
        return flattened;
    }

    let budget = max_chars.saturating_sub(3);
    let cut: String = flattened.chars().take(budget).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };

    format!("{}...", trimmed.trim_end())
}
