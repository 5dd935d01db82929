use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::sentiment::download;
use crate::sentiment::onnx::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_TOKENS};

/// Transcript root used when EARNINGS_TRANSCRIPTS_DIR is unset.
pub const DEFAULT_TRANSCRIPTS_DIR: &str = "../data/transcripts";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override the directory settings per invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of `<TICKER>/<YYYY-Mon-DD>-<TICKER>.txt` transcript files
    pub transcripts_dir: PathBuf,
    /// Directory containing `model.onnx` and `tokenizer.json`
    pub model_dir: PathBuf,
    /// HuggingFace repo the downloader fetches the ONNX export from.
    /// Only `download-model` needs it.
    pub model_repo: Option<String>,
    /// Token limit per paragraph; longer input is truncated from the end
    pub max_tokens: usize,
    /// Paragraphs per forward pass
    pub batch_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting but the model repo has a default; only malformed
    /// numbers are errors.
    pub fn load() -> Result<Self> {
        let transcripts_dir = env::var("EARNINGS_TRANSCRIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRANSCRIPTS_DIR));

        let model_dir = env::var("EARNINGS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        Ok(Self {
            transcripts_dir,
            model_dir,
            model_repo: env::var("EARNINGS_MODEL_REPO")
                .ok()
                .map(|repo| repo.trim().to_string())
                .filter(|repo| !repo.is_empty()),
            max_tokens: parse_usize_var("EARNINGS_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            batch_size: parse_usize_var("EARNINGS_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
        })
    }

    /// Check that the classifier model has been downloaded.
    /// Call this before any operation that runs sentiment inference.
    pub fn require_model(&self) -> Result<()> {
        if !download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "FinBERT model files not found in {}\n\
                 Run `earnings-tone download-model` to download them,\n\
                 or set EARNINGS_MODEL_DIR to a directory with model.onnx and tokenizer.json.",
                self.model_dir.display()
            );
        }
        Ok(())
    }

    /// The HuggingFace repo to download from. Has no default.
    pub fn require_model_repo(&self) -> Result<&str> {
        match self.model_repo.as_deref() {
            Some(repo) => Ok(repo),
            None => anyhow::bail!(
                "EARNINGS_MODEL_REPO is not set\n\
                 Set it to a HuggingFace repo that publishes `{}` and `{}`,\n\
                 or set EARNINGS_MODEL_DIR to a local directory with model.onnx and tokenizer.json.",
                download::REMOTE_MODEL_FILE,
                download::REMOTE_TOKENIZER_FILE
            ),
        }
    }
}

/// Read a positive integer env var, falling back to `default` when unset.
fn parse_usize_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => {
            let value: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{name} must be a positive integer, got {raw:?}"))?;
            if value == 0 {
                anyhow::bail!("{name} must be greater than zero");
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so each test uses its own variable name.

    #[test]
    fn test_parse_usize_var_default_when_unset() {
        assert_eq!(
            parse_usize_var("EARNINGS_TEST_UNSET_VAR", 16).unwrap(),
            16
        );
    }

    #[test]
    fn test_parse_usize_var_reads_value() {
        env::set_var("EARNINGS_TEST_BATCH_OK", " 32 ");
        assert_eq!(parse_usize_var("EARNINGS_TEST_BATCH_OK", 16).unwrap(), 32);
    }

    #[test]
    fn test_parse_usize_var_rejects_garbage() {
        env::set_var("EARNINGS_TEST_BATCH_BAD", "lots");
        assert!(parse_usize_var("EARNINGS_TEST_BATCH_BAD", 16).is_err());
    }

    #[test]
    fn test_parse_usize_var_rejects_zero() {
        env::set_var("EARNINGS_TEST_BATCH_ZERO", "0");
        assert!(parse_usize_var("EARNINGS_TEST_BATCH_ZERO", 16).is_err());
    }

    #[test]
    fn test_require_model_fails_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            transcripts_dir: PathBuf::from(DEFAULT_TRANSCRIPTS_DIR),
            model_dir: dir.path().to_path_buf(),
            model_repo: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            batch_size: DEFAULT_BATCH_SIZE,
        };
        let err = config.require_model().unwrap_err();
        assert!(err.to_string().contains("download-model"));
    }

    #[test]
    fn test_require_model_repo_unset_fails_with_hint() {
        let mut config = Config {
            transcripts_dir: PathBuf::from(DEFAULT_TRANSCRIPTS_DIR),
            model_dir: download::default_model_dir(),
            model_repo: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            batch_size: DEFAULT_BATCH_SIZE,
        };
        let err = config.require_model_repo().unwrap_err().to_string();
        assert!(err.contains("EARNINGS_MODEL_REPO"), "{err}");
        assert!(err.contains("onnx/model.onnx"), "{err}");

        config.model_repo = Some("someone/finbert-onnx".to_string());
        assert_eq!(config.require_model_repo().unwrap(), "someone/finbert-onnx");
    }
}
