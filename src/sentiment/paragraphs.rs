// Paragraph splitting. Transcripts put one speaker turn or paragraph per
// line, so a line is a paragraph. Blank and boilerplate lines are left in;
// the aggregator's length filter drops them.

/// Split transcript text into paragraphs, one per line. `\n`, `\r\n` and a
/// lone `\r` all end a line.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.lines().flat_map(|line| line.split('\r')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_newlines() {
        let text = "Operator: Good morning.\nRevenue grew twelve percent.\n\nThank you.";
        assert_eq!(
            split_paragraphs(text),
            vec![
                "Operator: Good morning.",
                "Revenue grew twelve percent.",
                "",
                "Thank you."
            ]
        );
    }

    #[test]
    fn test_handles_crlf() {
        let text = "First paragraph here.\r\nSecond paragraph here.\r\n";
        assert_eq!(
            split_paragraphs(text),
            vec!["First paragraph here.", "Second paragraph here."]
        );
    }

    #[test]
    fn test_handles_lone_carriage_return() {
        let text = "First paragraph here.\rSecond paragraph here.\nThird one.";
        assert_eq!(
            split_paragraphs(text),
            vec!["First paragraph here.", "Second paragraph here.", "Third one."]
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(split_paragraphs("").is_empty());
    }
}
