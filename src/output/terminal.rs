// Colored terminal output for transcript listings and feature tables.
//
// This module handles all terminal-specific formatting. The main.rs
// command handlers delegate here.

use colored::{ColoredString, Colorize};

use super::{format_stat, truncate_chars};
use crate::pipeline::features::TranscriptSentiment;
use crate::sentiment::aggregate::SentimentFeatures;
use crate::transcripts::TranscriptRecord;

/// Polarity beyond this magnitude is colored green/red.
const POLARITY_HIGHLIGHT: f64 = 0.1;

/// Display loaded transcripts with their parsed metadata.
pub fn display_transcripts(records: &[TranscriptRecord]) {
    if records.is_empty() {
        println!("No transcripts found.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Transcripts ({}) ===", records.len()).bold()
    );
    println!();
    println!(
        "  {:<8} {:>7}  {:>4}  {:<10}  {:>8}  {}",
        "Ticker".dimmed(),
        "Quarter".dimmed(),
        "Year".dimmed(),
        "Date".dimmed(),
        "Chars".dimmed(),
        "File".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for record in records {
        let filename = record
            .path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let quarter = record
            .quarter()
            .map(|q| q.to_string())
            .unwrap_or_else(|| "-".to_string());
        let year = record
            .year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let date = record
            .date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        let line = format!(
            "  {:<8} {:>7}  {:>4}  {:<10}  {:>8}  {}",
            record.ticker,
            quarter,
            year,
            date,
            record.text.chars().count(),
            truncate_chars(&filename, 40),
        );
        if record.call_date.is_some() {
            println!("{line}");
        } else {
            println!("{}", line.yellow());
        }
    }

    let unparsed = records.iter().filter(|r| r.call_date.is_none()).count();
    if unparsed > 0 {
        println!(
            "\n  {} {} filenames without a parseable date (kept, metadata empty)",
            "~".yellow(),
            unparsed
        );
    }
}

/// Display the per-transcript feature table.
pub fn display_feature_table(rows: &[TranscriptSentiment]) {
    if rows.is_empty() {
        println!("No transcripts scored.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Sentiment Features ({} transcripts) ===", rows.len()).bold()
    );
    println!();
    println!(
        "  {:<8} {:>7}  {:>4}  {:>6}  {:>6}  {:>6}  {:>8}  {:>6}  {:>5}",
        "Ticker".dimmed(),
        "Quarter".dimmed(),
        "Year".dimmed(),
        "Pos".dimmed(),
        "Neu".dimmed(),
        "Neg".dimmed(),
        "Polarity".dimmed(),
        "PolStd".dimmed(),
        "Paras".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for row in rows {
        let f = &row.features;
        println!(
            "  {:<8} {:>7}  {:>4}  {:>6}  {:>6}  {:>6}  {:>8}  {:>6}  {:>5}",
            row.ticker,
            row.quarter.map(|q| q.to_string()).unwrap_or_else(|| "-".to_string()),
            row.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
            format_stat(f.mean_positive),
            format_stat(f.mean_neutral),
            format_stat(f.mean_negative),
            colorize_polarity(f.polarity_score),
            format_stat(f.polarity_std),
            f.num_paragraphs,
        );
    }

    println!();

    let positive = rows
        .iter()
        .filter(|r| r.features.polarity_score.is_some_and(|p| p > POLARITY_HIGHLIGHT))
        .count();
    let negative = rows
        .iter()
        .filter(|r| r.features.polarity_score.is_some_and(|p| p < -POLARITY_HIGHLIGHT))
        .count();
    let empty = rows.iter().filter(|r| r.features.is_empty()).count();

    if positive > 0 {
        println!("  {} {} positive-leaning calls", "+".green().bold(), positive);
    }
    if negative > 0 {
        println!("  {} {} negative-leaning calls", "-".red().bold(), negative);
    }
    if empty > 0 {
        println!(
            "  {} {} transcripts with no qualifying paragraphs",
            "~".yellow(),
            empty
        );
    }
}

/// Display every feature of a single transcript.
pub fn display_features_detail(label: &str, features: &SentimentFeatures) {
    println!("\n{}", format!("=== {label} ===").bold());

    if features.is_empty() {
        println!("  No paragraphs longer than 10 characters, nothing to score.");
        return;
    }

    println!("  Paragraphs scored: {}", features.num_paragraphs);
    println!(
        "  Positive:  mean {}  std {}  max {}",
        format_stat(features.mean_positive),
        format_stat(features.std_positive),
        format_stat(features.max_positive),
    );
    println!(
        "  Neutral:   mean {}  std {}",
        format_stat(features.mean_neutral),
        format_stat(features.std_neutral),
    );
    println!(
        "  Negative:  mean {}  std {}  min {}",
        format_stat(features.mean_negative),
        format_stat(features.std_negative),
        format_stat(features.min_negative),
    );
    println!(
        "  Polarity:  {}  (std {})",
        colorize_polarity(features.polarity_score),
        format_stat(features.polarity_std),
    );
}

fn colorize_polarity(value: Option<f64>) -> ColoredString {
    let text = format_stat(value);
    match value {
        Some(v) if v > POLARITY_HIGHLIGHT => text.green(),
        Some(v) if v < -POLARITY_HIGHLIGHT => text.red(),
        _ => text.normal(),
    }
}
