use std::path::Path;

use lexideck_types::{Translation, WordKey};

use crate::error::FetchError;

/// One pluggable dictionary source.
///
/// `search` fetches the remote entry and extracts everything the accessors
/// need into session state scoped to that one call; every accessor degrades
/// to an empty or placeholder value when the entry lacks the element. No
/// accessor is meaningful before a successful `search`.
#[async_trait::async_trait]
pub trait Dictionary: Send {
    /// Fetch and parse the entry for the key. `Err` means the document
    /// could not be retrieved, which the card builders map to a
    /// connection failure.
    async fn search(&mut self, key: &WordKey, translation: &Translation)
    -> Result<(), FetchError>;

    /// Whether the fetched document says the word does not exist in this
    /// dictionary (a "did you mean" page, or no headword element).
    fn is_invalid_word(&self) -> bool;

    /// Part of speech, parenthesized, or empty.
    fn word_type(&mut self) -> String;

    /// Phonetic transcription, or empty.
    fn phonetic(&mut self) -> String;

    /// Formatted example block with cloze markers, or the no-example
    /// placeholder.
    fn example(&self) -> String;

    /// Formatted audio markup. Offline mode downloads the assets into
    /// `media_dir` and references them by file name.
    async fn sounds(&mut self, media_dir: &Path, online: bool) -> String;

    /// Formatted image markup, falling back to an external image-search
    /// link when the entry carries no image.
    async fn image(&mut self, media_dir: &Path, online: bool) -> String;

    /// The full formatted definition block.
    fn meaning(&mut self) -> String;

    /// Human-readable dictionary name, used for the copyright line.
    fn name(&self) -> &'static str;

    /// Tag value for the generated card.
    fn tag(&self) -> String;
}
