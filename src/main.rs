use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use earnings_tone::config::Config;
use earnings_tone::sentiment::onnx::OnnxSentimentClassifier;

/// earnings-tone: FinBERT sentiment features for earnings-call transcripts.
///
/// Reads `<TICKER>/<YYYY-Mon-DD>-<TICKER>.txt` files, scores each paragraph
/// as positive/negative/neutral, and reports per-call summary statistics.
#[derive(Parser)]
#[command(name = "earnings-tone", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the FinBERT ONNX model and tokenizer
    DownloadModel,

    /// List transcripts with the quarter/year/date parsed from each filename
    Load {
        /// Transcript root directory (default: EARNINGS_TRANSCRIPTS_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Only load this ticker's folder
        #[arg(long)]
        ticker: Option<String>,
    },

    /// Score every transcript and print the sentiment feature table
    Analyze {
        /// Transcript root directory (default: EARNINGS_TRANSCRIPTS_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Only analyze this ticker's folder
        #[arg(long)]
        ticker: Option<String>,

        /// Write the feature table to this file (.json, or .jsonl for JSON Lines)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Number of transcripts to score in parallel (default: 2)
        #[arg(long, default_value = "2")]
        concurrency: usize,
    },

    /// Score a single transcript file
    Score {
        /// Path to a transcript text file
        file: PathBuf,
    },

    /// Show transcript directory and model status
    Status {
        /// Transcript root directory (default: EARNINGS_TRANSCRIPTS_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("earnings_tone=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DownloadModel => {
            let config = Config::load()?;
            let repo = config.require_model_repo()?;

            println!("Downloading FinBERT ONNX model...");
            println!("  Source: {}", repo);
            println!("  Destination: {}", config.model_dir.display());

            earnings_tone::sentiment::download::download_model(&config.model_dir, repo).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `earnings-tone analyze`.");
        }

        Commands::Load { dir, ticker } => {
            let config = Config::load()?;
            let root = dir.unwrap_or(config.transcripts_dir);

            let records =
                earnings_tone::transcripts::load_transcripts(&root, ticker.as_deref())?;
            earnings_tone::output::terminal::display_transcripts(&records);
        }

        Commands::Analyze {
            dir,
            ticker,
            output,
            concurrency,
        } => {
            let config = Config::load()?;
            config.require_model()?;
            let root = dir.unwrap_or_else(|| config.transcripts_dir.clone());

            let records =
                earnings_tone::transcripts::load_transcripts(&root, ticker.as_deref())?;
            if records.is_empty() {
                println!("No transcripts found under {}", root.display());
                return Ok(());
            }

            let classifier = load_classifier(&config)?;

            println!(
                "Scoring {} transcripts ({} concurrent)...",
                records.len(),
                concurrency
            );
            let rows =
                earnings_tone::pipeline::features::run(&classifier, &records, concurrency).await?;

            earnings_tone::output::terminal::display_feature_table(&rows);

            if let Some(path) = output {
                let format = earnings_tone::output::export::write_features(&path, &rows)?;
                println!(
                    "\n{} {} rows written to {} ({:?})",
                    "✓".green(),
                    rows.len(),
                    path.display(),
                    format
                );
            }
        }

        Commands::Score { file } => {
            let config = Config::load()?;
            config.require_model()?;

            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read transcript {}", file.display()))?;

            let classifier = load_classifier(&config)?;
            let features =
                earnings_tone::sentiment::aggregate::analyze_text(&classifier, &text).await?;

            let label = score_label(&file);
            earnings_tone::output::terminal::display_features_detail(&label, &features);
        }

        Commands::Status { dir } => {
            let mut config = Config::load()?;
            if let Some(dir) = dir {
                config.transcripts_dir = dir;
            }
            earnings_tone::status::show(&config)?;
        }
    }

    Ok(())
}

/// Load the FinBERT classifier once; it is shared read-only by every call.
fn load_classifier(config: &Config) -> Result<OnnxSentimentClassifier> {
    info!(
        model_dir = %config.model_dir.display(),
        "Loading FinBERT sentiment classifier"
    );
    OnnxSentimentClassifier::load(&config.model_dir, config.max_tokens, config.batch_size)
}

/// Heading for `score` output: the filename plus the parsed call date when
/// the file sits in a ticker folder and follows the naming convention.
fn score_label(file: &std::path::Path) -> String {
    let filename = file
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let ticker = file
        .parent()
        .and_then(|p| p.file_name())
        .map(|t| t.to_string_lossy().into_owned());

    match ticker.and_then(|t| {
        earnings_tone::transcripts::extract_metadata(&filename, &t).map(|meta| (t, meta))
    }) {
        Some((ticker, meta)) => format!("{ticker} {} {} ({})", meta.quarter, meta.year, filename),
        None => filename,
    }
}
