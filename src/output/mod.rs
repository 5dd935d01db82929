// Output formatting: terminal display and file export of the feature table.

pub mod export;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like em dashes or accented names.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Format an optional statistic for display, "-" when absent.
pub fn format_stat(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("Revenue — up", 8), "Revenue ...");
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(None), "-");
        assert_eq!(format_stat(Some(0.12345)), "0.123");
        assert_eq!(format_stat(Some(-0.5)), "-0.500");
    }
}
