// Feature table export. `.jsonl` / `.ndjson` paths get one JSON object per
// line; anything else gets a pretty-printed JSON array.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::pipeline::features::TranscriptSentiment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    JsonLines,
}

impl ExportFormat {
    /// Pick the format from the output file's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl" | "ndjson") => ExportFormat::JsonLines,
            _ => ExportFormat::Json,
        }
    }
}

/// Serialize rows in the given format.
pub fn render(rows: &[TranscriptSentiment], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let mut json = serde_json::to_string_pretty(rows)?;
            json.push('\n');
            Ok(json)
        }
        ExportFormat::JsonLines => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&serde_json::to_string(row)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Write the feature table to `path`, format chosen by extension.
pub fn write_features(path: &Path, rows: &[TranscriptSentiment]) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path);
    let body = render(rows, format)?;
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), ?format, "Wrote sentiment features");
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::aggregate::SentimentFeatures;

    fn row(ticker: &str) -> TranscriptSentiment {
        TranscriptSentiment {
            ticker: ticker.to_string(),
            quarter: None,
            year: None,
            date: None,
            features: SentimentFeatures::empty(),
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.jsonl")), ExportFormat::JsonLines);
        assert_eq!(ExportFormat::from_path(Path::new("out.ndjson")), ExportFormat::JsonLines);
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Json);
    }

    #[test]
    fn test_json_lines_one_row_per_line() {
        let out = render(&[row("AAA"), row("BBB")], ExportFormat::JsonLines).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["ticker"], "AAA");
        // features are flattened beside the key columns
        assert_eq!(first["num_paragraphs"], 0);
        assert!(first["quarter"].is_null());
    }

    #[test]
    fn test_write_features_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        let format = write_features(&path, &[row("AAA")]).unwrap();
        assert_eq!(format, ExportFormat::Json);

        let parsed: Vec<TranscriptSentiment> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![row("AAA")]);
    }
}
