// Model download helper for the FinBERT ONNX export.
//
// Fetches `tokenizer.json` and `onnx/model.onnx` from the HuggingFace repo
// named by EARNINGS_MODEL_REPO. The upstream ProsusAI/finbert repo ships
// neither file, so the repo must be an ONNX export of it. Files are stored in a platform-appropriate directory
// (~/.local/share/earnings-tone/models/finbert/ on Linux) so they persist
// across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Local filenames inside the model directory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Remote paths within the HuggingFace repo.
pub const REMOTE_MODEL_FILE: &str = "onnx/model.onnx";
pub const REMOTE_TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/earnings-tone/models/finbert on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("earnings-tone")
        .join("models")
        .join("finbert")
}

/// Check whether both required model files exist.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

/// Base URL for raw file downloads from a HuggingFace repo.
pub fn repo_base_url(repo: &str) -> String {
    format!("https://huggingface.co/{}/resolve/main", repo.trim_matches('/'))
}

/// Download the classifier model and tokenizer.
///
/// Shows a progress bar for the model file. Skips files that already exist.
/// Creates the directory as needed.
pub async fn download_model(dir: &Path, repo: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    let base_url = repo_base_url(repo);
    println!("\nSentiment model ({repo}):");

    let tokenizer_path = dir.join(TOKENIZER_FILE);
    if tokenizer_path.exists() {
        info!("Tokenizer already exists, skipping");
        println!("  {} (already exists)", TOKENIZER_FILE);
    } else {
        println!("  Downloading {}...", TOKENIZER_FILE);
        download_file(
            &format!("{}/{}", base_url, REMOTE_TOKENIZER_FILE),
            &tokenizer_path,
            false,
        )
        .await?;
    }

    let model_path = dir.join(MODEL_FILE);
    if model_path.exists() {
        info!("Model already exists, skipping");
        println!("  {} (already exists)", MODEL_FILE);
    } else {
        println!("  Downloading {} (~440 MB)...", MODEL_FILE);
        download_file(
            &format!("{}/{}", base_url, REMOTE_MODEL_FILE),
            &model_path,
            true,
        )
        .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Download failed with status {}: {}\n\
             Set EARNINGS_MODEL_REPO to a HuggingFace repo that publishes an ONNX export.",
            response.status(),
            url
        );
    }

    let total_size = response.content_length();

    let pb = if show_progress {
        let pb = if let Some(size) = total_size {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .expect("valid template"),
            );
            pb
        };
        Some(pb)
    } else {
        None
    };

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_is_under_earnings_tone() {
        let dir = default_model_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("earnings-tone") && path_str.ends_with("finbert"),
            "Expected path containing earnings-tone/.../finbert, got: {path_str}"
        );
    }

    #[test]
    fn test_repo_base_url() {
        assert_eq!(
            repo_base_url("ProsusAI/finbert"),
            "https://huggingface.co/ProsusAI/finbert/resolve/main"
        );
        assert_eq!(
            repo_base_url("/someone/finbert-onnx/"),
            "https://huggingface.co/someone/finbert-onnx/resolve/main"
        );
    }

    #[test]
    fn test_model_files_present_false_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!model_files_present(dir.path()));
    }

    #[test]
    fn test_model_files_present_true_when_files_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_FILE), b"fake").unwrap();
        std::fs::write(dir.path().join(TOKENIZER_FILE), b"fake").unwrap();
        assert!(model_files_present(dir.path()));
    }
}
