// Sentiment scoring: trait-based classifier plus the per-transcript reduction.
//
// The SentimentClassifier trait is the seam between the statistics and the
// model. OnnxSentimentClassifier runs FinBERT locally; tests swap in a
// deterministic classifier without touching the aggregation code.

pub mod aggregate;
pub mod download;
pub mod onnx;
pub mod paragraphs;
pub mod traits;
