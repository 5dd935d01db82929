// Feature pipeline: transcripts -> per-transcript sentiment features.
//
// Each transcript is split into paragraphs, classified, and reduced. Rows
// come back in the same order as the input records so they can be joined
// back to the transcript table by position as well as by key.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sentiment::aggregate::{analyze_text, SentimentFeatures};
use crate::sentiment::traits::SentimentClassifier;
use crate::transcripts::{Quarter, TranscriptRecord};

/// One output row: transcript key columns plus its sentiment features.
/// Serializes flat, so the feature fields sit beside the key columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSentiment {
    pub ticker: String,
    pub quarter: Option<Quarter>,
    pub year: Option<i32>,
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub features: SentimentFeatures,
}

/// Score a single transcript.
pub async fn score_transcript(
    classifier: &dyn SentimentClassifier,
    record: &TranscriptRecord,
) -> Result<TranscriptSentiment> {
    let features = analyze_text(classifier, &record.text)
        .await
        .with_context(|| format!("Failed to score transcript {}", record.path.display()))?;

    debug!(
        ticker = %record.ticker,
        quarter = ?record.quarter(),
        paragraphs = features.num_paragraphs,
        polarity = ?features.polarity_score,
        "Scored transcript"
    );

    Ok(TranscriptSentiment {
        ticker: record.ticker.clone(),
        quarter: record.quarter(),
        year: record.year(),
        date: record.date(),
        features,
    })
}

/// Score every transcript, running up to `concurrency` at once.
///
/// Output order matches `records`. The first classifier failure aborts
/// the run; transcripts already in flight (at most `concurrency - 1`) are
/// dropped and none after them are started.
pub async fn run(
    classifier: &dyn SentimentClassifier,
    records: &[TranscriptRecord],
    concurrency: usize,
) -> Result<Vec<TranscriptSentiment>> {
    let concurrency = concurrency.max(1);
    info!(
        transcripts = records.len(),
        concurrency, "Scoring transcript sentiment"
    );

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Scoring [{bar:30}] {pos}/{len} ({eta})")
            .expect("valid template"),
    );

    // buffered (not buffer_unordered) keeps rows aligned with their records.
    // try_collect stops polling at the first Err, so no further transcripts
    // are started once one has failed.
    let rows: Result<Vec<TranscriptSentiment>> = stream::iter(
        records
            .iter()
            .map(|record| async move { score_transcript(classifier, record).await }),
    )
    .buffered(concurrency)
    .inspect(|_| pb.inc(1))
    .try_collect()
    .await;

    pb.finish_and_clear();
    let rows = rows?;

    let empty = rows.iter().filter(|r| r.features.is_empty()).count();
    info!(
        scored = rows.len(),
        empty, "Sentiment scoring complete"
    );

    Ok(rows)
}
