// Transcript records and the calendar metadata parsed from their filenames.
//
// Filenames follow `<YYYY-Mon-DD>-<TICKER>.txt`, e.g. `2023-Jan-15-ACME.txt`.
// When the date part doesn't parse, the record keeps its text and simply
// carries no quarter/year/date.

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// chrono format for the date prefix of a transcript filename.
pub const FILENAME_DATE_FORMAT: &str = "%Y-%b-%d";

/// Fiscal-calendar quarter derived from the call month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Map a calendar month (1-12) to its quarter: `Q{1 + (month - 1) / 3}`.
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=3 => Some(Quarter::Q1),
            4..=6 => Some(Quarter::Q2),
            7..=9 => Some(Quarter::Q3),
            10..=12 => Some(Quarter::Q4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quarter, year and date of an earnings call. These are always known
/// together: a filename either parses completely or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDate {
    pub quarter: Quarter,
    pub year: i32,
    pub date: NaiveDate,
}

impl CallDate {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            // month() is always 1..=12 for a valid NaiveDate
            quarter: Quarter::from_month(date.month()).unwrap_or(Quarter::Q4),
            year: date.year(),
            date,
        }
    }
}

/// One transcript file, read into memory. Immutable after loading.
#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub ticker: String,
    /// Source file, kept for log messages and error context
    pub path: PathBuf,
    /// None when the filename didn't match `<YYYY-Mon-DD>-<TICKER>.txt`
    pub call_date: Option<CallDate>,
    pub text: String,
}

impl TranscriptRecord {
    pub fn quarter(&self) -> Option<Quarter> {
        self.call_date.map(|c| c.quarter)
    }

    pub fn year(&self) -> Option<i32> {
        self.call_date.map(|c| c.year)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.call_date.map(|c| c.date)
    }
}

/// Parse the call date out of a transcript filename.
///
/// Strips the `-<ticker>.txt` suffix and parses the remainder as
/// `Year-AbbreviatedMonth-Day`. Returns None on any failure; callers keep
/// the transcript regardless.
pub fn extract_metadata(filename: &str, ticker: &str) -> Option<CallDate> {
    let suffix = format!("-{ticker}.txt");
    let date_str = filename.strip_suffix(suffix.as_str())?;

    // chrono's %b also accepts full month names; the filename convention
    // only allows the three-letter form.
    if !has_abbreviated_month(date_str) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_str, FILENAME_DATE_FORMAT).ok()?;
    Some(CallDate::from_date(date))
}

fn has_abbreviated_month(date_str: &str) -> bool {
    date_str
        .split('-')
        .nth(1)
        .is_some_and(|month| month.len() == 3 && month.chars().all(|c| c.is_ascii_alphabetic()))
}
