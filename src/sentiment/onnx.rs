// Local ONNX sentiment classifier using FinBERT (ProsusAI/finbert).
//
// FinBERT is BERT fine-tuned on financial news; it outputs three logits
// (positive, negative, neutral) which we turn into probabilities with softmax.
// Inputs longer than the model's context are truncated from the right at the
// token level, so the same paragraph always produces the same result.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::download::{MODEL_FILE, TOKENIZER_FILE};
use super::traits::{ParagraphSentiment, SentimentClassifier};

/// Labels output by FinBERT, in the order the model returns them
/// (`id2label` in the model config).
const LABEL_ORDER: [&str; 3] = ["positive", "negative", "neutral"];

/// BERT's maximum sequence length.
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Paragraphs per forward pass.
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Local ONNX-based FinBERT classifier. The session and tokenizer are loaded
/// once and shared read-only across calls.
pub struct OnnxSentimentClassifier {
    // ort::Session::run takes &mut self, and spawn_blocking needs 'static
    // handles, hence Arc<Mutex<_>>.
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    batch_size: usize,
}

impl OnnxSentimentClassifier {
    /// Load the ONNX model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` to exist in `model_dir`.
    /// Call `download::download_model()` first if they don't.
    pub fn load(model_dir: &Path, max_tokens: usize, batch_size: usize) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "Model file not found: {}\nRun `earnings-tone download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nRun `earnings-tone download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        // Padding is done by hand below; truncation keeps the head of the text.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        debug!(
            max_tokens,
            batch_size,
            "Loaded FinBERT ONNX model from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            batch_size: batch_size.max(1),
        })
    }
}

#[async_trait]
impl SentimentClassifier for OnnxSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ParagraphSentiment> {
        let mut results = self.classify_batch(&[text.to_string()]).await?;
        results
            .pop()
            .context("FinBERT returned no result for a single paragraph")
    }

    /// Batched inference: each chunk of `batch_size` paragraphs is tokenized,
    /// padded, and run in one forward pass on a blocking thread.
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<ParagraphSentiment>> {
        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let session = Arc::clone(&self.session);
            let tokenizer = Arc::clone(&self.tokenizer);
            let chunk = chunk.to_vec();

            let chunk_results =
                tokio::task::spawn_blocking(move || classify_sync(&session, &tokenizer, &chunk))
                    .await
                    .context("spawn_blocking panicked")??;

            results.extend(chunk_results);
        }

        Ok(results)
    }
}

/// Synchronous tokenization, inference and softmax.
/// Called from spawn_blocking to avoid blocking the async runtime.
fn classify_sync(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    texts: &[String],
) -> Result<Vec<ParagraphSentiment>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    // BERT inputs, right-padded to max_len:
    //   input_ids: token IDs (pad with 0)
    //   attention_mask: 1 for real tokens, 0 for padding
    //   token_type_ids: all zeros for single-sentence input
    let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        let mask = enc.get_attention_mask();
        let seq_len = ids.len();

        input_ids_flat.extend(ids.iter().map(|&id| id as i64));
        attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, seq_len));

        let pad_len = max_len - seq_len;
        input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
    }

    let shape = [batch_size as i64, max_len as i64];

    let input_ids_tensor =
        Tensor::from_array((shape, input_ids_flat)).context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
        .context("Failed to create token_type_ids tensor")?;

    let logits_data = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            })
            .context("FinBERT ONNX inference failed")?;

        // Output shape: [batch_size, 3], raw logits (pre-softmax)
        let (_out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;

        data.to_vec()
    };

    if logits_data.len() != batch_size * LABEL_ORDER.len() {
        anyhow::bail!(
            "Unexpected FinBERT output size: got {} values for {} paragraphs (expected {} labels each)",
            logits_data.len(),
            batch_size,
            LABEL_ORDER.len()
        );
    }

    let mut results = Vec::with_capacity(batch_size);
    for (text, row) in texts.iter().zip(logits_data.chunks(LABEL_ORDER.len())) {
        let logits: Vec<f64> = row.iter().map(|&l| l as f64).collect();
        let result = map_probs_to_sentiment(&softmax(&logits));

        debug!(
            positive = result.positive,
            negative = result.negative,
            neutral = result.neutral,
            text_preview = %crate::output::truncate_chars(text, 50),
            "FinBERT classified paragraph"
        );

        results.push(result);
    }

    Ok(results)
}

/// Softmax over a logit row. Subtracts the max first so large logits
/// don't overflow `exp`.
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Map probabilities in FinBERT label order to a ParagraphSentiment.
fn map_probs_to_sentiment(probs: &[f64]) -> ParagraphSentiment {
    ParagraphSentiment {
        positive: probs[0],
        negative: probs[1],
        neutral: probs[2],
    }
}
