use std::path::Path;

use lexideck_dict::Dictionary;
use lexideck_types::{
    CONNECTION_FAILED_COMMENT, Card, CardStatus, Translation, WORD_NOT_FOUND_COMMENT, WordKey,
};

/// Turns raw input words into normalized keys and keys into cards.
/// One implementation per source language.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Expand a raw word into formatted keys, one per part of speech.
    /// Empty means the word could not be resolved; the caller reports it
    /// as "word not found", it is not an error.
    async fn formatted_words(&self, word: &str, translation: &Translation) -> Vec<String>;

    /// Produce one card for one formatted key. Never fails: every failure
    /// path returns a card carrying a failure status and comment.
    async fn generate_card(
        &self,
        formatted: &str,
        media_dir: &Path,
        translation: &Translation,
        online: bool,
    ) -> Card;
}

/// Decompose a formatted key into a fresh card. Malformed keys yield the
/// failure card here, before any network access.
pub fn initialize_card(formatted: &str) -> Result<(WordKey, Card), Card> {
    match WordKey::parse(formatted) {
        Some(key) => {
            let card = Card::new(&key);
            Ok((key, card))
        }
        None => Err(Card::failed(
            CardStatus::WordNotFound,
            format!("incorrect word format: {formatted}"),
        )),
    }
}

/// One dictionary supplies every field of the card.
pub async fn single_dictionary_card(
    mut card: Card,
    key: &WordKey,
    translation: &Translation,
    media_dir: &Path,
    online: bool,
    dict: &mut dyn Dictionary,
) -> Card {
    if let Err(e) = dict.search(key, translation).await {
        tracing::warn!("fetch failed for {key}: {e}");
        card.status = CardStatus::ConnectionFailed;
        card.comment = CONNECTION_FAILED_COMMENT.to_string();
        return card;
    }
    if dict.is_invalid_word() {
        card.status = CardStatus::WordNotFound;
        card.comment = WORD_NOT_FOUND_COMMENT.to_string();
        return card;
    }

    card.word_type = dict.word_type();
    card.phonetic = dict.phonetic();
    card.example = dict.example();

    card.sounds = dict.sounds(media_dir, online).await;
    card.image = dict.image(media_dir, online).await;

    card.copyright = format!("Source: {}", dict.name());

    card.meaning = dict.meaning();
    card.tag = dict.tag();

    card
}

/// A main dictionary supplies everything except the meaning, which comes
/// from a separate meaning dictionary. Fail-fast: if either fetch fails or
/// either dictionary rejects the word, the whole card is a failure and no
/// field is rendered.
pub async fn dual_dictionary_card(
    mut card: Card,
    key: &WordKey,
    translation: &Translation,
    media_dir: &Path,
    online: bool,
    main_dict: &mut dyn Dictionary,
    meaning_dict: &mut dyn Dictionary,
) -> Card {
    if let Err(e) = main_dict.search(key, translation).await {
        tracing::warn!("main fetch failed for {key}: {e}");
        card.status = CardStatus::ConnectionFailed;
        card.comment = CONNECTION_FAILED_COMMENT.to_string();
        return card;
    }
    if let Err(e) = meaning_dict.search(key, translation).await {
        tracing::warn!("meaning fetch failed for {key}: {e}");
        card.status = CardStatus::ConnectionFailed;
        card.comment = CONNECTION_FAILED_COMMENT.to_string();
        return card;
    }
    if main_dict.is_invalid_word() || meaning_dict.is_invalid_word() {
        card.status = CardStatus::WordNotFound;
        card.comment = WORD_NOT_FOUND_COMMENT.to_string();
        return card;
    }

    card.word_type = main_dict.word_type();
    card.phonetic = main_dict.phonetic();
    card.example = main_dict.example();

    card.sounds = main_dict.sounds(media_dir, online).await;
    card.image = main_dict.image(media_dir, online).await;

    card.copyright = format!("Source: {}, and {}", main_dict.name(), meaning_dict.name());

    card.meaning = meaning_dict.meaning();
    card.tag = main_dict.tag();

    card
}
