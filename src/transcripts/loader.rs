// Directory walk over `<root>/<TICKER>/*.txt`.
//
// Read-only: nothing is cached or written. Entries are visited in sorted
// order so repeated runs emit rows in the same order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::metadata::{extract_metadata, TranscriptRecord};

/// A transcript file found on disk, before its text is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFile {
    pub ticker: String,
    pub filename: String,
    pub path: PathBuf,
}

/// Find every `.txt` file in an immediate ticker subdirectory of `root`.
///
/// Non-directory entries at the root are skipped, as are nested
/// directories and non-`.txt` files inside a ticker folder. When
/// `ticker_filter` is set, only that ticker's folder is walked.
pub fn list_transcript_files(root: &Path, ticker_filter: Option<&str>) -> Result<Vec<TranscriptFile>> {
    let mut files = Vec::new();

    for ticker_entry in sorted_entries(root)? {
        let company_dir = ticker_entry.path();
        if !company_dir.is_dir() {
            continue;
        }

        let Some(ticker) = ticker_entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %company_dir.display(), "Skipping ticker directory with non-UTF-8 name");
            continue;
        };

        if ticker_filter.is_some_and(|wanted| wanted != ticker) {
            continue;
        }

        for file_entry in sorted_entries(&company_dir)? {
            let path = file_entry.path();
            let Some(filename) = file_entry.file_name().to_str().map(str::to_string) else {
                warn!(path = %path.display(), "Skipping transcript with non-UTF-8 filename");
                continue;
            };

            if !filename.ends_with(".txt") || !path.is_file() {
                continue;
            }

            files.push(TranscriptFile {
                ticker: ticker.clone(),
                filename,
                path,
            });
        }
    }

    Ok(files)
}

/// Load every transcript under `root`, one record per `.txt` file.
pub fn load_all_transcripts(root: &Path) -> Result<Vec<TranscriptRecord>> {
    load_transcripts(root, None)
}

/// Load transcripts under `root`, optionally limited to one ticker.
///
/// A file that can't be read as UTF-8 aborts the load. A filename whose
/// date doesn't parse still yields a record, with no quarter/year/date.
pub fn load_transcripts(root: &Path, ticker_filter: Option<&str>) -> Result<Vec<TranscriptRecord>> {
    if !root.is_dir() {
        anyhow::bail!(
            "Transcript directory not found: {}\n\
             Set EARNINGS_TRANSCRIPTS_DIR or pass --dir.",
            root.display()
        );
    }

    let files = list_transcript_files(root, ticker_filter)?;
    let mut records = Vec::with_capacity(files.len());

    for file in files {
        let text = fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read transcript {}", file.path.display()))?;

        let call_date = extract_metadata(&file.filename, &file.ticker);
        if call_date.is_none() {
            debug!(
                ticker = %file.ticker,
                filename = %file.filename,
                "Filename has no parseable call date"
            );
        }

        records.push(TranscriptRecord {
            ticker: file.ticker,
            path: file.path,
            call_date,
            text,
        });
    }

    info!(
        transcripts = records.len(),
        root = %root.display(),
        "Loaded transcripts"
    );

    Ok(records)
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_root_files_and_non_txt() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("README.md"), "not a ticker").unwrap();
        let acme = root.path().join("ACME");
        std::fs::create_dir(&acme).unwrap();
        std::fs::write(acme.join("2023-Jan-15-ACME.txt"), "text").unwrap();
        std::fs::write(acme.join("notes.csv"), "a,b").unwrap();
        std::fs::create_dir(acme.join("archive.txt")).unwrap();

        let files = list_transcript_files(root.path(), None).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].ticker, "ACME");
        assert_eq!(files[0].filename, "2023-Jan-15-ACME.txt");
    }

    #[test]
    fn test_ticker_filter() {
        let root = tempfile::tempdir().unwrap();
        for ticker in ["AAA", "BBB"] {
            let dir = root.path().join(ticker);
            std::fs::create_dir(&dir).unwrap();
            std::fs::write(dir.join(format!("2023-Jan-15-{ticker}.txt")), "text").unwrap();
        }

        let files = list_transcript_files(root.path(), Some("BBB")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].ticker, "BBB");
    }

    #[test]
    fn test_missing_root_is_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert!(load_all_transcripts(&missing).is_err());
    }

    #[test]
    fn test_non_utf8_file_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let acme = root.path().join("ACME");
        std::fs::create_dir(&acme).unwrap();
        std::fs::write(acme.join("2023-Jan-15-ACME.txt"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = load_all_transcripts(root.path()).unwrap_err();
        assert!(
            format!("{err:#}").contains("2023-Jan-15-ACME.txt"),
            "error should name the file: {err:#}"
        );
    }
}
