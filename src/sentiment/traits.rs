// Sentiment classifier trait: the model boundary.
//
// The aggregator only needs a function from text to a probability triple.
// How the model is loaded or hosted stays behind this trait.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Class probabilities for a single paragraph. Each value is in [0, 1]
/// and the three sum to 1 up to floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParagraphSentiment {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl ParagraphSentiment {
    /// Per-paragraph polarity: positive minus negative, in [-1, 1].
    pub fn polarity(&self) -> f64 {
        self.positive - self.negative
    }

    /// Sum of the three probabilities; 1 for a well-formed classifier output.
    pub fn total(&self) -> f64 {
        self.positive + self.negative + self.neutral
    }
}

/// Trait for three-class (positive/negative/neutral) text classification.
///
/// Implementations hold their model as read-only state, built once before
/// the first call. A failed call is fatal to the run; callers don't retry.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single paragraph.
    async fn classify(&self, text: &str) -> Result<ParagraphSentiment>;

    /// Classify multiple paragraphs, returning results in the same order.
    /// Default implementation calls classify sequentially; implementations
    /// can override to batch forward passes.
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<ParagraphSentiment>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.classify(text).await?);
        }
        Ok(results)
    }
}
