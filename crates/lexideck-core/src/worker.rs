use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

use lexideck_types::{
    Card, CardStatus, SUB_DELIMITER, Translation, WORD_NOT_FOUND_COMMENT, WorkerEvent,
};

use crate::generator::Generator;

/// Inputs for one batch run.
pub struct BatchRequest {
    pub words: Vec<String>,
    pub translation: Translation,
    pub media_dir: PathBuf,
    pub online: bool,
    pub all_word_types: bool,
    pub output_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total_words: usize,
    pub card_count: usize,
    pub failure_count: usize,
    pub cancelled: bool,
}

/// Runs one batch sequentially off the interactive thread: word by word,
/// key by key, converting every per-item failure into an event and
/// collecting successful cards in input order. The only fatal error is
/// failing to write the output file.
pub struct BatchWorker {
    generator: Arc<dyn Generator>,
    request: BatchRequest,
    events: AsyncSender<WorkerEvent>,
    cancel: CancellationToken,
}

impl BatchWorker {
    pub fn new(
        generator: Arc<dyn Generator>,
        request: BatchRequest,
        events: AsyncSender<WorkerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            generator,
            request,
            events,
            cancel,
        }
    }

    pub async fn run(self) -> Result<BatchSummary, WorkerError> {
        let total = self.request.words.len();
        let mut cards: Vec<Card> = Vec::new();
        let mut failure_count = 0usize;
        let mut completed_words = 0usize;
        let mut last_percent = 0u8;
        let mut cancelled = false;

        // Reduced mode skips part-of-speech expansion entirely and looks
        // each word up as its own identity key.
        let reduced = !self.request.all_word_types && self.request.translation.is_english_source();

        if reduced {
            for word in &self.request.words {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }
                let word = word.trim();
                let formatted = format!("{word}{SUB_DELIMITER}{word}{SUB_DELIMITER}{word}");
                let card = self
                    .generator
                    .generate_card(
                        &formatted,
                        &self.request.media_dir,
                        &self.request.translation,
                        self.request.online,
                    )
                    .await;
                completed_words += 1;
                last_percent = self
                    .emit_progress(completed_words as f64 / total as f64, last_percent)
                    .await;
                self.collect(card, &formatted, &mut cards, &mut failure_count).await;
            }
        } else {
            'words: for word in &self.request.words {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }
                let keys = self
                    .generator
                    .formatted_words(word, &self.request.translation)
                    .await;
                if keys.is_empty() {
                    failure_count += 1;
                    self.emit(WorkerEvent::ItemFailed(format!(
                        "{word} -> {WORD_NOT_FOUND_COMMENT}"
                    )))
                    .await;
                    completed_words += 1;
                    continue;
                }

                let key_count = keys.len();
                for (done, formatted) in keys.iter().enumerate() {
                    if self.cancel.is_cancelled() {
                        cancelled = true;
                        break 'words;
                    }
                    let card = self
                        .generator
                        .generate_card(
                            formatted,
                            &self.request.media_dir,
                            &self.request.translation,
                            self.request.online,
                        )
                        .await;
                    // A word's keys advance the percentage fractionally so
                    // multi-entry words cannot push it past 100.
                    let fraction =
                        (completed_words as f64 + (done + 1) as f64 / key_count as f64)
                            / total as f64;
                    last_percent = self.emit_progress(fraction, last_percent).await;
                    self.collect(card, formatted, &mut cards, &mut failure_count).await;
                }
                completed_words += 1;
            }
        }

        if cancelled {
            tracing::info!(
                "batch cancelled after {completed_words}/{total} words, writing partial output"
            );
        }

        self.serialize(&cards).await?;

        self.emit(WorkerEvent::Progress(100)).await;
        self.emit(WorkerEvent::Finished).await;

        Ok(BatchSummary {
            total_words: total,
            card_count: cards.len(),
            failure_count,
            cancelled,
        })
    }

    async fn collect(
        &self,
        card: Card,
        formatted: &str,
        cards: &mut Vec<Card>,
        failure_count: &mut usize,
    ) {
        if card.status == CardStatus::Success {
            self.emit(WorkerEvent::CardCompleted(card.meaning.clone())).await;
            cards.push(card);
        } else {
            *failure_count += 1;
            self.emit(WorkerEvent::ItemFailed(format!("{formatted} -> {}", card.comment)))
                .await;
        }
    }

    async fn emit_progress(&self, fraction: f64, last: u8) -> u8 {
        let percent = ((fraction * 100.0).floor() as u8).min(100).max(last);
        self.emit(WorkerEvent::Progress(percent)).await;
        percent
    }

    async fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("event receiver dropped");
        }
    }

    /// Rewrite the output file from scratch: one tab-delimited line per
    /// successful card, in collection order. A missing previous file is
    /// not an error; anything else while deleting or writing is fatal.
    async fn serialize(&self, cards: &[Card]) -> Result<(), WorkerError> {
        let path = &self.request.output_path;

        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", path.display());
            }
            Err(source) => {
                return Err(WorkerError::Write {
                    path: path.clone(),
                    source,
                });
            }
        }

        let mut contents = String::new();
        for card in cards {
            contents.push_str(&card.to_record());
        }
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| WorkerError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!("wrote {} cards to {}", cards.len(), path.display());
        Ok(())
    }
}
