use std::path::Path;

use lexideck_types::{Meaning, NO_EXAMPLE, Translation, WordKey};
use scraper::Html;

use crate::dictionary::Dictionary;
use crate::error::FetchError;
use crate::{html, media};

const OXFORD_URL_EN_EN: &str = "https://www.oxfordlearnersdictionaries.com/definition/english/{}";
const SPELLING_MARKER: &str = "Did you mean";
const NOT_FOUND_MARKER: &str = "Word not found";
const EXAMPLE_LIMIT: usize = 4;

/// Oxford Advanced Learner's Dictionary, English headwords with English
/// definitions.
pub struct OxfordDictionary {
    client: reqwest::Client,
    session: Option<Session>,
}

/// Everything one `search` call extracted from the entry page. Formatted
/// word type and phonetic are memoized here so `meaning` reuses what the
/// direct accessors produced.
struct Session {
    headword: String,
    title: String,
    entry_headword: String,
    raw_pos: String,
    phon_br: String,
    phon_us: String,
    examples: Vec<String>,
    image_link: String,
    sound_uk: String,
    sound_us: String,
    meanings: Vec<Meaning>,
    word_type: Option<String>,
    phonetic: Option<String>,
}

impl Session {
    fn extract(doc: &Html, key: &WordKey) -> Self {
        let examples = scraper::Selector::parse("span.x")
            .map(|sel| {
                doc.select(&sel)
                    .take(EXAMPLE_LIMIT)
                    .map(|el| html::inner_text(&el))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            headword: key.lookup.trim().to_lowercase(),
            title: html::nth_text(doc, "title", 0),
            entry_headword: html::nth_text(doc, ".headword", 0),
            raw_pos: html::nth_text(doc, "span.pos", 0),
            phon_br: html::nth_text(doc, "span.phon", 0),
            phon_us: html::nth_text(doc, "span.phon", 1),
            examples,
            image_link: html::nth_attr(doc, "a.topic", 0, "href"),
            sound_uk: html::nth_attr(doc, "div.pron-uk", 0, "data-src-mp3"),
            sound_us: html::nth_attr(doc, "div.pron-us", 0, "data-src-mp3"),
            meanings: extract_meanings(doc),
            word_type: None,
            phonetic: None,
        }
    }
}

/// Meaning groups in entry order: word family, verb forms, each sense with
/// its see-also link and examples plus any extra-example box, and finally
/// the word origin.
fn extract_meanings(doc: &Html) -> Vec<Meaning> {
    let mut meanings = Vec::new();

    if let Some(family) = html::select_first(doc, r#"span.unbox[unbox="wordfamily"]"#) {
        let members = html::texts_in(&family, "span.p");
        if !members.is_empty() {
            meanings.push(Meaning::labeled("Word Family", members));
        }
    }

    if let Some(forms) = html::select_first(doc, r#"span.unbox[unbox="verbforms"]"#) {
        let rows = html::texts_in(&forms, "td.verbforms");
        if !rows.is_empty() {
            meanings.push(Meaning::labeled("Verb Forms", rows));
        }
    }

    if let Ok(sense_sel) = scraper::Selector::parse(".sense") {
        for sense in doc.select(&sense_sel) {
            let definition = html::first_in(&sense, ".def")
                .map(|el| html::inner_text(&el))
                .unwrap_or_default();

            let mut examples = Vec::new();
            if let Some(xrefs) = html::first_in(&sense, ".xrefs") {
                let prefix = html::first_in(&xrefs, ".prefix");
                let link = html::first_in(&xrefs, ".Ref");
                if let (Some(prefix), Some(link)) = (prefix, link) {
                    let links_full_entry = link
                        .value()
                        .attr("title")
                        .is_some_and(|t| t.contains("full entry"));
                    if links_full_entry {
                        examples.push(format!(
                            "<a href=\"{}\">{} {}</a>",
                            link.value().attr("href").unwrap_or_default(),
                            html::inner_text(&prefix).to_uppercase(),
                            html::inner_text(&link),
                        ));
                    }
                }
            }
            examples.extend(html::texts_in(&sense, ".x"));
            meanings.push(Meaning::new(definition, examples));

            if let Some(extra) = html::first_in(&sense, r#"span.unbox[unbox="extra_examples"]"#) {
                let extras = html::texts_in(&extra, ".unx");
                if !extras.is_empty() {
                    meanings.push(Meaning::labeled("Extra Examples", extras));
                }
            }
        }
    }

    if let Some(origin_box) = html::select_first(doc, r#"span.unbox[unbox="wordorigin"]"#) {
        if let Some(origin) = html::first_in(&origin_box, ".p") {
            meanings.push(Meaning::labeled("Word Origin", vec![html::inner_text(&origin)]));
        }
    }

    meanings
}

impl OxfordDictionary {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            session: None,
        }
    }
}

#[async_trait::async_trait]
impl Dictionary for OxfordDictionary {
    async fn search(
        &mut self,
        key: &WordKey,
        _translation: &Translation,
    ) -> Result<(), FetchError> {
        let url = html::lookup_url(OXFORD_URL_EN_EN, &key.entry_id);
        let body = html::fetch_document(&self.client, &url).await?;
        let doc = Html::parse_document(&body);
        self.session = Some(Session::extract(&doc, key));
        Ok(())
    }

    fn is_invalid_word(&self) -> bool {
        let Some(session) = &self.session else {
            return true;
        };
        if session.title.contains(SPELLING_MARKER) || session.title.contains(NOT_FOUND_MARKER) {
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
        let Some(session) = &mut self.session else {
            return String::new();
        };
        if session.phonetic.is_none() {
            let formatted = format!("{} {}", session.phon_br, session.phon_us)
                .replace("//", " / ")
                .trim()
                .to_string();
            session.phonetic = Some(formatted);
        }
        session.phonetic.clone().unwrap_or_default()
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
        if session.sound_uk.is_empty() {
            return String::new();
        }

        // US first so the UK pronunciation ends up at the front of the
        // rendered markup, matching the entry page order.
        let mut links = Vec::new();
        if !session.sound_us.is_empty() {
            links.push(session.sound_us.clone());
        }
        links.push(session.sound_uk.clone());

        let mut sounds = String::new();
        for link in &links {
            let src = if online { link.clone() } else { media::file_name(link) };
            sounds = format!(
                "<audio src=\"{src}\" type=\"audio/wav\" preload=\"auto\" autobuffer controls>[sound:{src}]</audio> {sounds}"
            );
        }

        if !online {
            media::download_all(&self.client, media_dir, &links.join(";")).await;
        }
        sounds.trim_end().to_string()
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
        "Oxford Advanced Learner's Dictionary"
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

    const ENTRY: &str = r#"<html><head><title>cat noun - Oxford Advanced Learner's Dictionary</title></head>
<body>
<h1 class="headword">cat</h1>
<span class="pos">noun</span>
<span class="phon">/kæt/</span><span class="phon">/kæt/</span>
<div class="pron-uk" data-src-mp3="https://media.example.com/cat__gb_1.mp3"></div>
<div class="pron-us" data-src-mp3="https://media.example.com/cat__us_1.mp3"></div>
<a class="topic" href="https://media.example.com/cat.jpg"></a>
<span class="sense">
  <span class="def">a small animal kept as a pet</span>
  <span class="x">The cat sat.</span>
  <span class="x">Cats are nice.</span>
</span>
<span class="unbox" unbox="wordorigin"><span class="p">Old English catt</span></span>
</body></html>"#;

    const NOT_FOUND: &str = r#"<html><head><title>Did you mean: cart</title></head>
<body><p>No exact match found.</p></body></html>"#;

    fn dictionary_with(fixture: &str) -> OxfordDictionary {
        let doc = Html::parse_document(fixture);
        let key = WordKey::new("cat", "cat_1", "cat");
        OxfordDictionary {
            client: reqwest::Client::new(),
            session: Some(Session::extract(&doc, &key)),
        }
    }

    #[test]
    fn entry_page_is_valid_word() {
        let dict = dictionary_with(ENTRY);
        assert!(!dict.is_invalid_word());
    }

    #[test]
    fn did_you_mean_page_is_invalid_word() {
        let dict = dictionary_with(NOT_FOUND);
        assert!(dict.is_invalid_word());
    }

    #[test]
    fn word_type_is_parenthesized_and_memoized() {
        let mut dict = dictionary_with(ENTRY);
        assert_eq!(dict.word_type(), "(noun)");
        assert_eq!(dict.word_type(), "(noun)");
    }

    #[test]
    fn phonetic_joins_both_variants() {
        let mut dict = dictionary_with(ENTRY);
        assert_eq!(dict.phonetic(), "/kæt/ /kæt/");
    }

    #[test]
    fn example_applies_cloze_policy_per_occurrence() {
        let dict = dictionary_with(ENTRY);
        assert_eq!(
            dict.example(),
            "the {{c1::cat}} sat.<br>cats are nice. {{c1::...}}"
        );
    }

    #[test]
    fn example_placeholder_when_entry_has_none() {
        let dict = dictionary_with(NOT_FOUND);
        assert_eq!(dict.example(), NO_EXAMPLE);
    }

    #[tokio::test]
    async fn sounds_render_uk_first_online() {
        let mut dict = dictionary_with(ENTRY);
        let sounds = dict.sounds(Path::new("unused"), true).await;
        let uk = sounds.find("cat__gb_1.mp3").expect("uk sound missing");
        let us = sounds.find("cat__us_1.mp3").expect("us sound missing");
        assert!(uk < us);
    }

    #[tokio::test]
    async fn image_embeds_remote_link_online() {
        let mut dict = dictionary_with(ENTRY);
        let image = dict.image(Path::new("unused"), true).await;
        assert_eq!(image, "<img src=\"https://media.example.com/cat.jpg\"/>");
    }

    #[tokio::test]
    async fn image_falls_back_to_search_link() {
        let mut dict = dictionary_with(NOT_FOUND);
        let image = dict.image(Path::new("unused"), true).await;
        assert!(image.contains("google.com/search"));
        assert!(image.contains("q=cat"));
    }

    #[test]
    fn meaning_contains_definition_and_origin() {
        let mut dict = dictionary_with(ENTRY);
        let meaning = dict.meaning();
        assert!(meaning.contains("a small animal kept as a pet"));
        assert!(meaning.contains("Word Origin"));
        assert!(meaning.contains("Old English catt"));
        assert!(meaning.contains("(noun)"));
    }
}
