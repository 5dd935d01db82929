// Per-transcript sentiment features.
//
// Paragraphs shorter than the length threshold are dropped, the rest are
// classified, and the probability triples are reduced to summary statistics.
// Standard deviations are sample standard deviations (divisor n - 1), so
// they are None for a single paragraph rather than 0.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::paragraphs::split_paragraphs;
use super::traits::{ParagraphSentiment, SentimentClassifier};

/// A paragraph must be longer than this (after trimming whitespace,
/// counted in characters) to be classified.
pub const MIN_PARAGRAPH_CHARS: usize = 10;

/// Summary statistics over one transcript's paragraph sentiments.
///
/// With `num_paragraphs == 0` every statistic is None. With exactly one
/// paragraph the std fields are None and everything else is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentFeatures {
    pub mean_positive: Option<f64>,
    pub mean_neutral: Option<f64>,
    pub mean_negative: Option<f64>,
    pub std_positive: Option<f64>,
    pub std_neutral: Option<f64>,
    pub std_negative: Option<f64>,
    /// Mean of per-paragraph (positive - negative)
    pub polarity_score: Option<f64>,
    /// Sample std of per-paragraph (positive - negative)
    pub polarity_std: Option<f64>,
    pub max_positive: Option<f64>,
    pub min_negative: Option<f64>,
    pub num_paragraphs: usize,
}

impl SentimentFeatures {
    /// The record for a transcript with no qualifying paragraphs.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.num_paragraphs == 0
    }
}

/// Whether a paragraph carries enough text to be worth classifying.
pub fn is_substantive(paragraph: &str) -> bool {
    paragraph.trim().chars().count() > MIN_PARAGRAPH_CHARS
}

/// Classify the substantive paragraphs and reduce them to features.
///
/// Returns the empty record without calling the classifier when no
/// paragraph passes the length filter. Classifier errors propagate.
pub async fn aggregate<S: AsRef<str>>(
    classifier: &dyn SentimentClassifier,
    paragraphs: &[S],
) -> Result<SentimentFeatures> {
    let retained: Vec<String> = paragraphs
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| is_substantive(p))
        .map(str::to_string)
        .collect();

    debug!(
        total = paragraphs.len(),
        retained = retained.len(),
        "Filtered paragraphs"
    );

    if retained.is_empty() {
        return Ok(SentimentFeatures::empty());
    }

    let results = classifier.classify_batch(&retained).await?;
    if results.len() != retained.len() {
        anyhow::bail!(
            "Classifier returned {} results for {} paragraphs",
            results.len(),
            retained.len()
        );
    }

    Ok(reduce(&results))
}

/// Split raw transcript text into paragraphs and aggregate them.
pub async fn analyze_text(
    classifier: &dyn SentimentClassifier,
    text: &str,
) -> Result<SentimentFeatures> {
    aggregate(classifier, &split_paragraphs(text)).await
}

/// Reduce paragraph sentiments to summary statistics. Order-independent.
pub fn reduce(results: &[ParagraphSentiment]) -> SentimentFeatures {
    if results.is_empty() {
        return SentimentFeatures::empty();
    }

    let positive: Vec<f64> = results.iter().map(|r| r.positive).collect();
    let neutral: Vec<f64> = results.iter().map(|r| r.neutral).collect();
    let negative: Vec<f64> = results.iter().map(|r| r.negative).collect();
    let polarity: Vec<f64> = results.iter().map(ParagraphSentiment::polarity).collect();

    SentimentFeatures {
        mean_positive: mean(&positive),
        mean_neutral: mean(&neutral),
        mean_negative: mean(&negative),
        std_positive: sample_std(&positive),
        std_neutral: sample_std(&neutral),
        std_negative: sample_std(&negative),
        polarity_score: mean(&polarity),
        polarity_std: sample_std(&polarity),
        max_positive: positive.iter().copied().reduce(f64::max),
        min_negative: negative.iter().copied().reduce(f64::min),
        num_paragraphs: results.len(),
    }
}

/// Arithmetic mean; None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divisor n - 1); None below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(positive: f64, negative: f64, neutral: f64) -> ParagraphSentiment {
        ParagraphSentiment {
            positive,
            negative,
            neutral,
        }
    }

    #[test]
    fn test_is_substantive_threshold() {
        assert!(!is_substantive(""));
        assert!(!is_substantive("   "));
        assert!(!is_substantive("0123456789"));
        assert!(!is_substantive("   0123456789   "));
        assert!(is_substantive("01234567890"));
        assert!(is_substantive("\t01234567890\n"));
    }

    #[test]
    fn test_is_substantive_counts_chars_not_bytes() {
        // 10 characters, 20 bytes
        assert!(!is_substantive("éééééééééé"));
        assert!(is_substantive("ééééééééééé"));
    }

    #[test]
    fn test_mean_and_std() {
        assert_eq!(mean(&[]), None);
        assert!((mean(&[1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(sample_std(&[0.4]), None);
        // values 1, 2, 3: squared deviations sum to 2, / (n - 1) = 1
        assert!((sample_std(&[1.0, 2.0, 3.0]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_of_constant_series_is_zero() {
        let std = sample_std(&[0.25, 0.25, 0.25]).unwrap();
        assert!(std.abs() < 1e-12);
    }

    #[test]
    fn test_reduce_two_paragraphs() {
        let features = reduce(&[triple(0.8, 0.1, 0.1), triple(0.2, 0.5, 0.3)]);

        assert_eq!(features.num_paragraphs, 2);
        assert!((features.mean_positive.unwrap() - 0.5).abs() < 1e-12);
        assert!((features.mean_negative.unwrap() - 0.3).abs() < 1e-12);
        assert!((features.mean_neutral.unwrap() - 0.2).abs() < 1e-12);
        // two values a, b: sample std = |a - b| / sqrt(2)
        let root2 = 2.0_f64.sqrt();
        assert!((features.std_positive.unwrap() - 0.6 / root2).abs() < 1e-12);
        assert!((features.std_negative.unwrap() - 0.4 / root2).abs() < 1e-12);
        assert!((features.std_neutral.unwrap() - 0.2 / root2).abs() < 1e-12);
        // polarity series 0.7, -0.3
        assert!((features.polarity_score.unwrap() - 0.2).abs() < 1e-12);
        assert!((features.polarity_std.unwrap() - 1.0 / root2).abs() < 1e-12);
        assert!((features.max_positive.unwrap() - 0.8).abs() < 1e-12);
        assert!((features.min_negative.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_single_paragraph_has_no_std() {
        let features = reduce(&[triple(0.6, 0.3, 0.1)]);
        assert_eq!(features.num_paragraphs, 1);
        assert!(features.std_positive.is_none());
        assert!(features.std_neutral.is_none());
        assert!(features.std_negative.is_none());
        assert!(features.polarity_std.is_none());
        assert_eq!(features.mean_positive, features.max_positive);
        assert_eq!(features.mean_negative, features.min_negative);
    }

    #[test]
    fn test_reduce_empty_is_sentinel() {
        assert_eq!(reduce(&[]), SentimentFeatures::empty());
        assert!(SentimentFeatures::empty().is_empty());
    }

    #[test]
    fn test_reduce_is_order_independent() {
        let a = [
            triple(0.9, 0.05, 0.05),
            triple(0.1, 0.7, 0.2),
            triple(0.3, 0.3, 0.4),
        ];
        let b = [a[2], a[0], a[1]];
        let fa = reduce(&a);
        let fb = reduce(&b);
        assert_eq!(fa.num_paragraphs, fb.num_paragraphs);
        assert!((fa.polarity_std.unwrap() - fb.polarity_std.unwrap()).abs() < 1e-12);
        assert!((fa.mean_neutral.unwrap() - fb.mean_neutral.unwrap()).abs() < 1e-12);
        assert_eq!(fa.max_positive, fb.max_positive);
        assert_eq!(fa.min_negative, fb.min_negative);
    }

    #[test]
    fn test_empty_features_serialize_as_nulls() {
        let json = serde_json::to_value(SentimentFeatures::empty()).unwrap();
        assert!(json["mean_positive"].is_null());
        assert!(json["polarity_std"].is_null());
        assert_eq!(json["num_paragraphs"], 0);
    }
}
