// System status display: transcript directory summary and model presence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::sentiment::download;
use crate::transcripts::{extract_metadata, list_transcript_files};

/// Counts gathered from the transcript directory without reading any text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySummary {
    /// Transcript count per ticker
    pub per_ticker: BTreeMap<String, usize>,
    /// Filenames whose date prefix didn't parse
    pub unparsed: Vec<String>,
}

impl DirectorySummary {
    pub fn total(&self) -> usize {
        self.per_ticker.values().sum()
    }
}

/// Walk the transcript directory and tally files per ticker.
pub fn summarize(root: &Path) -> Result<DirectorySummary> {
    let mut summary = DirectorySummary::default();
    for file in list_transcript_files(root, None)? {
        if extract_metadata(&file.filename, &file.ticker).is_none() {
            summary.unparsed.push(format!("{}/{}", file.ticker, file.filename));
        }
        *summary.per_ticker.entry(file.ticker).or_insert(0) += 1;
    }
    Ok(summary)
}

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    let root = &config.transcripts_dir;
    if root.is_dir() {
        let summary = summarize(root)?;
        println!(
            "Transcripts: {} files across {} tickers ({})",
            summary.total(),
            summary.per_ticker.len(),
            root.display()
        );
        for (ticker, count) in &summary.per_ticker {
            println!("  {ticker}: {count}");
        }
        if !summary.unparsed.is_empty() {
            println!(
                "Unparsed filenames: {} (scored without quarter/year/date)",
                summary.unparsed.len()
            );
            for name in summary.unparsed.iter().take(10) {
                println!("  {name}");
            }
        }
    } else {
        println!("Transcripts: directory not found ({})", root.display());
        println!("  Set EARNINGS_TRANSCRIPTS_DIR or pass --dir");
    }

    if download::model_files_present(&config.model_dir) {
        println!("Model: present ({})", config.model_dir.display());
    } else {
        println!("Model: not downloaded ({})", config.model_dir.display());
        println!("  Run `earnings-tone download-model` to fetch it");
    }
    println!(
        "Inference: max {} tokens per paragraph, batches of {}",
        config.max_tokens, config.batch_size
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_counts_and_unparsed() {
        let root = tempfile::tempdir().unwrap();
        let acme = root.path().join("ACME");
        let beta = root.path().join("BETA");
        std::fs::create_dir(&acme).unwrap();
        std::fs::create_dir(&beta).unwrap();
        std::fs::write(acme.join("2023-Jan-15-ACME.txt"), "a").unwrap();
        std::fs::write(acme.join("garbage.txt"), "b").unwrap();
        std::fs::write(beta.join("2021-Aug-02-BETA.txt"), "c").unwrap();

        let summary = summarize(root.path()).unwrap();
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.per_ticker["ACME"], 2);
        assert_eq!(summary.per_ticker["BETA"], 1);
        assert_eq!(summary.unparsed, vec!["ACME/garbage.txt".to_string()]);
    }
}
