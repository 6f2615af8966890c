use std::path::Path;

use lexideck_types::{Meaning, NO_EXAMPLE, Translation, WordKey};
use scraper::Html;

use crate::dictionary::Dictionary;
use crate::error::FetchError;
use crate::{html, media};

const CAMBRIDGE_URL_EN_VI: &str =
    "https://dictionary.cambridge.org/dictionary/english-vietnamese/{}";
const CAMBRIDGE_BASE: &str = "https://dictionary.cambridge.org";
const EXAMPLE_LIMIT: usize = 4;

/// Cambridge English-Vietnamese dictionary. Serves as the meaning source
/// on the dual-provider path; each definition group pairs the English
/// definition with its Vietnamese translation.
pub struct CambridgeDictionary {
    client: reqwest::Client,
    session: Option<Session>,
}

struct Session {
    headword: String,
    title: String,
    entry_headword: String,
    raw_pos: String,
    ipa: String,
    examples: Vec<String>,
    sound_link: String,
    image_link: String,
    meanings: Vec<Meaning>,
    word_type: Option<String>,
}

/// Entry-relative asset links come back as `/media/...`; make them
/// fetchable.
fn absolutize(link: &str) -> String {
    if link.is_empty() || link.starts_with("http") {
        link.to_string()
    } else if let Some(rest) = link.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("{CAMBRIDGE_BASE}{link}")
    }
}

impl Session {
    fn extract(doc: &Html, key: &WordKey) -> Self {
        let examples = scraper::Selector::parse(".eg.deg")
            .map(|sel| {
                doc.select(&sel)
                    .take(EXAMPLE_LIMIT)
                    .map(|el| html::inner_text(&el))
                    .collect()
            })
            .unwrap_or_default();

        let mut meanings = Vec::new();
        if let Ok(block_sel) = scraper::Selector::parse(".def-block.ddef_block") {
            for block in doc.select(&block_sel) {
                let definition = html::first_in(&block, ".def.ddef_d")
                    .map(|el| html::inner_text(&el))
                    .unwrap_or_default();
                let translations = html::texts_in(&block, ".trans.dtrans");
                if !definition.is_empty() || !translations.is_empty() {
                    meanings.push(Meaning::new(definition, translations));
                }
            }
        }

        Self {
            headword: key.lookup.trim().to_lowercase(),
            title: html::nth_text(doc, "title", 0),
            entry_headword: html::nth_text(doc, ".hw.dhw", 0),
            raw_pos: html::nth_text(doc, ".pos.dpos", 0),
            ipa: html::nth_text(doc, ".ipa.dipa", 0),
            examples,
            sound_link: absolutize(&html::nth_attr(
                doc,
                r#"source[type="audio/mpeg"]"#,
                0,
                "src",
            )),
            image_link: absolutize(&html::nth_attr(doc, "amp-img.dimg_i", 0, "src")),
            meanings,
            word_type: None,
        }
    }
}

impl CambridgeDictionary {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            session: None,
        }
    }
}

#[async_trait::async_trait]
impl Dictionary for CambridgeDictionary {
    async fn search(
        &mut self,
        key: &WordKey,
        _translation: &Translation,
    ) -> Result<(), FetchError> {
        let url = html::lookup_url(CAMBRIDGE_URL_EN_VI, &key.lookup);
        let body = html::fetch_document(&self.client, &url).await?;
        let doc = Html::parse_document(&body);
        self.session = Some(Session::extract(&doc, key));
        Ok(())
    }

    fn is_invalid_word(&self) -> bool {
        let Some(session) = &self.session else {
            return true;
        };
        if session.title.contains("Did you mean") {
            return true;
        }
        session.entry_headword.is_empty()
    }

    fn word_type(&mut self) -> String {
        let Some(session) = &mut self.session else {
            return String::new();
        };
        if session.word_type.is_none() {
            let formatted = if session.raw_pos.is_empty() {
                String::new()
            } else {
                format!("({})", session.raw_pos)
            };
            session.word_type = Some(formatted);
        }
        session.word_type.clone().unwrap_or_default()
    }

    fn phonetic(&mut self) -> String {
        let Some(session) = &self.session else {
            return String::new();
        };
        if session.ipa.is_empty() {
            String::new()
        } else {
            format!("/{}/", session.ipa.trim_matches('/'))
        }
    }

    fn example(&self) -> String {
        let Some(session) = &self.session else {
            return NO_EXAMPLE.to_string();
        };
        if session.examples.is_empty() {
            return NO_EXAMPLE.to_string();
        }
        let highlighted: Vec<String> = session
            .examples
            .iter()
            .map(|ex| html::cloze_highlight(&session.headword, ex))
            .collect();
        html::build_example(&highlighted)
    }

    async fn sounds(&mut self, media_dir: &Path, online: bool) -> String {
        let Some(session) = &self.session else {
            return String::new();
        };
        if session.sound_link.is_empty() {
            return String::new();
        }

        let src = if online {
            session.sound_link.clone()
        } else {
            media::file_name(&session.sound_link)
        };
        let markup = format!(
            "<audio src=\"{src}\" type=\"audio/wav\" preload=\"auto\" autobuffer controls>[sound:{src}]</audio>"
        );
        if !online {
            media::download_all(&self.client, media_dir, &session.sound_link).await;
        }
        markup
    }

    async fn image(&mut self, media_dir: &Path, online: bool) -> String {
        let Some(session) = &self.session else {
            return String::new();
        };
        let fallback = format!(
            "<a href=\"https://www.google.com/search?biw=1280&bih=661&tbm=isch&sa=1&q={}\" style=\"font-size: 15px; color: blue\">Search images by the word</a>",
            session.headword
        );
        if session.image_link.is_empty() {
            return fallback;
        }

        if online {
            format!("<img src=\"{}\"/>", session.image_link)
        } else {
            let name = media::file_name(&session.image_link);
            media::download_all(&self.client, media_dir, &session.image_link).await;
            format!("<img src=\"{name}\"/>")
        }
    }

    fn meaning(&mut self) -> String {
        let word_type = self.word_type();
        let phonetic = self.phonetic();
        let Some(session) = &self.session else {
            return String::new();
        };
        html::build_meaning(&session.headword, &word_type, &phonetic, &session.meanings)
    }

    fn name(&self) -> &'static str {
        "Cambridge English-Vietnamese Dictionary"
    }

    fn tag(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.raw_pos.to_lowercase())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"<html><head><title>cat | Cambridge Dictionary</title></head>
<body>
<span class="hw dhw">cat</span>
<span class="pos dpos">noun</span>
<span class="ipa dipa">kæt</span>
<source type="audio/mpeg" src="/media/english/uk_pron/cat.mp3">
<div class="def-block ddef_block">
  <div class="def ddef_d">a small furry animal</div>
  <span class="trans dtrans">con mèo</span>
  <span class="eg deg">The cat is asleep.</span>
</div>
</body></html>"#;

    fn dictionary_with(fixture: &str) -> CambridgeDictionary {
        let doc = Html::parse_document(fixture);
        let key = WordKey::new("cat", "cat_1", "cat");
        CambridgeDictionary {
            client: reqwest::Client::new(),
            session: Some(Session::extract(&doc, &key)),
        }
    }

    #[test]
    fn meaning_pairs_definition_with_translation() {
        let mut dict = dictionary_with(ENTRY);
        let meaning = dict.meaning();
        assert!(meaning.contains("a small furry animal"));
        assert!(meaning.contains("con mèo"));
    }

    #[test]
    fn relative_sound_link_is_absolutized() {
        let dict = dictionary_with(ENTRY);
        let session = dict.session.as_ref().unwrap();
        assert_eq!(
            session.sound_link,
            "https://dictionary.cambridge.org/media/english/uk_pron/cat.mp3"
        );
    }

    #[test]
    fn missing_headword_is_invalid() {
        let dict = dictionary_with("<html><head><title>x</title></head><body></body></html>");
        assert!(dict.is_invalid_word());
    }
}
