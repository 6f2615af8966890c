use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kanal::AsyncReceiver;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use lexideck_config::Config;
use lexideck_core::{BatchRequest, BatchWorker, EnglishGenerator};
use lexideck_types::{Language, Translation, WorkerEvent};

#[derive(Parser)]
#[command(
    name = "lexideck",
    version,
    about = "Generate Anki-importable flashcards from a word list"
)]
struct Cli {
    /// Word list, one word per line
    #[arg(short, long)]
    input: PathBuf,

    /// Source language
    #[arg(long, default_value = "english")]
    source: Language,

    /// Target language
    #[arg(long, default_value = "english")]
    target: Language,

    /// Output file (tab-delimited)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory downloaded audio and images go into
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Download media into the media dir instead of embedding remote URLs
    #[arg(long)]
    offline: bool,

    /// Look each word up as given instead of expanding every part of speech
    #[arg(long)]
    single_word_type: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::new();

    let words = read_words(&cli.input)?;
    if words.is_empty() {
        anyhow::bail!("no words found in {}", cli.input.display());
    }

    let translation = Translation::new(cli.source, cli.target);
    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.deck_path));
    let media_dir = cli
        .media_dir
        .unwrap_or_else(|| PathBuf::from(&config.output.media_dir));
    let online = if cli.offline { false } else { config.lookup.online };
    let all_word_types = if cli.single_word_type {
        false
    } else {
        config.lookup.all_word_types
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.network.timeout_seconds))
        .user_agent(config.network.user_agent.clone())
        .build()
        .context("failed to build http client")?;
    let generator = Arc::new(EnglishGenerator::new(client));

    let (tx, rx) = kanal::bounded_async(256);
    let cancel = CancellationToken::new();

    let request = BatchRequest {
        words,
        translation,
        media_dir,
        online,
        all_word_types,
        output_path: output_path.clone(),
    };
    let worker = BatchWorker::new(generator, request, tx, cancel.clone());

    tracing::info!(
        "generating cards for {translation}, output {}",
        output_path.display()
    );

    let mut worker_task = tokio::spawn(worker.run());
    let render_task = tokio::spawn(render_events(rx));

    let summary = tokio::select! {
        result = &mut worker_task => result??,
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl-c received, cancelling batch");
            cancel.cancel();
            worker_task.await??
        }
    };
    render_task.await?;

    tracing::info!(
        "done: {} cards, {} failures out of {} words{}",
        summary.card_count,
        summary.failure_count,
        summary.total_words,
        if summary.cancelled { " (cancelled)" } else { "" },
    );
    Ok(())
}

/// Render worker events as they arrive; returns once the worker hangs up.
async fn render_events(rx: AsyncReceiver<WorkerEvent>) {
    let mut last = 0u8;
    while let Ok(event) = rx.recv().await {
        match event {
            WorkerEvent::Progress(percent) => {
                if percent != last {
                    tracing::info!("progress: {percent}%");
                    last = percent;
                }
            }
            WorkerEvent::CardCompleted(meaning) => {
                tracing::info!("card: {meaning}");
            }
            WorkerEvent::ItemFailed(line) => {
                tracing::warn!("failed: {line}");
            }
            WorkerEvent::Finished => {
                tracing::info!("generation finished");
            }
        }
    }
}

fn read_words(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read word list {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
