use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LookupConfig {
    /// Expand each word into one lookup per part of speech
    #[serde(default = "default_enabled")]
    pub all_word_types: bool,
    /// Embed remote media URLs instead of downloading into the media dir
    #[serde(default = "default_enabled")]
    pub online: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            all_word_types: default_enabled(),
            online: default_enabled(),
        }
    }
}
