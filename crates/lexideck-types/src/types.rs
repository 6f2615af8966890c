use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Delimiter joining the three parts of a formatted word key.
pub const SUB_DELIMITER: &str = "===";

/// Placeholder emitted when a dictionary entry carries no usage example.
pub const NO_EXAMPLE: &str = "No example";

/// Cloze marker appended when the headword does not appear literally in an
/// example. Anki only hides example text that carries at least one marker.
pub const CLOZE_FALLBACK: &str = "{{c1::...}}";

pub const CONNECTION_FAILED_COMMENT: &str = "cannot connect to dictionary";
pub const WORD_NOT_FOUND_COMMENT: &str = "word not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    Success,
    WordNotFound,
    ConnectionFailed,
}

/// One flashcard record. Populated field by field by the card builders and
/// frozen once it enters the worker's result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub word: String,
    pub word_type: String,
    pub phonetic: String,
    pub example: String,
    pub sounds: String,
    pub image: String,
    pub meaning: String,
    pub copyright: String,
    pub tag: String,
    pub status: CardStatus,
    pub comment: String,
}

impl Card {
    pub fn new(key: &WordKey) -> Self {
        Self {
            word: key.display.clone(),
            word_type: String::new(),
            phonetic: String::new(),
            example: String::new(),
            sounds: String::new(),
            image: String::new(),
            meaning: String::new(),
            copyright: String::new(),
            tag: String::new(),
            status: CardStatus::Success,
            comment: String::new(),
        }
    }

    pub fn failed(status: CardStatus, comment: impl Into<String>) -> Self {
        Self {
            word: String::new(),
            word_type: String::new(),
            phonetic: String::new(),
            example: String::new(),
            sounds: String::new(),
            image: String::new(),
            meaning: String::new(),
            copyright: String::new(),
            tag: String::new(),
            status,
            comment: comment.into(),
        }
    }

    /// One tab-delimited import line, newline terminated. Field order is
    /// what the Anki import mapping expects.
    pub fn to_record(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            self.word,
            self.word_type,
            self.phonetic,
            self.example,
            self.sounds,
            self.image,
            self.meaning,
            self.copyright,
            self.tag,
        )
    }
}

/// The three-part encoded lookup target: `lookup===entry_id===display`.
///
/// `lookup` is the base headword (used for cloze matching), `entry_id`
/// addresses the provider entry (e.g. `run_2` for the second part of
/// speech), `display` is the word as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordKey {
    pub lookup: String,
    pub entry_id: String,
    pub display: String,
}

impl WordKey {
    pub fn new(
        lookup: impl Into<String>,
        entry_id: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            lookup: lookup.into(),
            entry_id: entry_id.into(),
            display: display.into(),
        }
    }

    /// Split a formatted key on the sub-delimiter. Anything other than
    /// exactly three parts is malformed.
    pub fn parse(formatted: &str) -> Option<Self> {
        let parts: Vec<&str> = formatted.split(SUB_DELIMITER).collect();
        match parts.as_slice() {
            [lookup, entry_id, display] => Some(Self::new(*lookup, *entry_id, *display)),
            _ => None,
        }
    }
}

impl fmt::Display for WordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SUB_DELIMITER}{}{SUB_DELIMITER}{}",
            self.lookup, self.entry_id, self.display
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Vietnamese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Vietnamese => "Vietnamese",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "vietnamese" | "vi" => Ok(Language::Vietnamese),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup direction for one batch. Read-only input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub source: Language,
    pub target: Language,
}

impl Translation {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }

    pub fn is_english_source(&self) -> bool {
        self.source == Language::English
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// One definition group inside a dictionary entry. Groups like
/// "Word Family" or "Verb Forms" carry a label instead of a definition.
#[derive(Debug, Clone, Default)]
pub struct Meaning {
    pub label: Option<String>,
    pub definition: String,
    pub examples: Vec<String>,
}

impl Meaning {
    pub fn new(definition: impl Into<String>, examples: Vec<String>) -> Self {
        Self {
            label: None,
            definition: definition.into(),
            examples,
        }
    }

    pub fn labeled(label: impl Into<String>, examples: Vec<String>) -> Self {
        Self {
            label: Some(label.into()),
            definition: String::new(),
            examples,
        }
    }
}

/// Events the batch worker emits towards the host.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Percentage of the batch done, 0..=100, monotonically non-decreasing.
    Progress(u8),
    /// A card was generated; carries its meaning text for live display.
    CardCompleted(String),
    /// A word or key failed; carries the formatted failure line.
    ItemFailed(String),
    /// Emitted exactly once, after the output file was written.
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_key_round_trips_through_display() {
        let key = WordKey::new("run", "run_2", "Run");
        let parsed = WordKey::parse(&key.to_string()).expect("parse failed");
        assert_eq!(parsed, key);
    }

    #[test]
    fn word_key_rejects_malformed_input() {
        assert!(WordKey::parse("run").is_none());
        assert!(WordKey::parse("run===run_1").is_none());
        assert!(WordKey::parse("a===b===c===d").is_none());
        assert!(WordKey::parse("").is_none());
    }

    #[test]
    fn record_has_nine_fields_and_round_trips() {
        let mut card = Card::new(&WordKey::new("cat", "cat_1", "cat"));
        card.word_type = "(noun)".to_string();
        card.phonetic = "/kæt/".to_string();
        card.example = "the {{c1::cat}} sat.".to_string();
        card.meaning = "<ul><li>a small animal</li></ul>".to_string();
        card.copyright = "Source: Oxford Advanced Learner's Dictionary".to_string();
        card.tag = "noun".to_string();

        let record = card.to_record();
        assert!(record.ends_with('\n'));

        let fields: Vec<&str> = record.trim_end_matches('\n').split('\t').collect();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[0], card.word);
        assert_eq!(fields[3], card.example);
        assert_eq!(fields[8], card.tag);
    }

    #[test]
    fn language_parses_short_codes() {
        assert_eq!("en".parse::<Language>(), Ok(Language::English));
        assert_eq!("Vietnamese".parse::<Language>(), Ok(Language::Vietnamese));
        assert!("klingon".parse::<Language>().is_err());
    }
}
