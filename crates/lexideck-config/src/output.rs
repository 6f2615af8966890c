use serde::{Deserialize, Serialize};

fn default_deck_path() -> String {
    "AnkiDeck.csv".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    /// Tab-delimited import file, fully rewritten on every run
    #[serde(default = "default_deck_path")]
    pub deck_path: String,
    /// Directory downloaded audio/images are stored into
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            deck_path: default_deck_path(),
            media_dir: default_media_dir(),
        }
    }
}
