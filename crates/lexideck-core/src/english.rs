use std::path::Path;

use lexideck_types::{Card, CardStatus, Translation, WordKey};
use scraper::{Html, Selector};

use lexideck_dict::{ProviderSet, html, providers_for};

use crate::generator::{
    Generator, dual_dictionary_card, initialize_card, single_dictionary_card,
};

const OXFORD_SEARCH_EN: &str = "https://www.oxfordlearnersdictionaries.com/definition/english/{}";

/// Generator for English source words. Expansion scrapes the dictionary's
/// related-entries listing: one entry id per part of speech (`run_1`,
/// `run_2`, ...).
pub struct EnglishGenerator {
    client: reqwest::Client,
}

impl EnglishGenerator {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn entry_id_from(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path).to_string()
}

/// Entry ids for the word, in page order, deduplicated. The related-entries
/// list covers multi-entry words; single-entry pages only expose their own
/// canonical link.
fn extract_entry_ids(doc: &Html, word: &str) -> Vec<String> {
    let prefix = format!("{word}_");
    let mut ids: Vec<String> = Vec::new();

    if let Ok(sel) = Selector::parse("#relatedentries li a") {
        for link in doc.select(&sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let id = entry_id_from(href);
            if (id == word || id.starts_with(&prefix)) && !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    if ids.is_empty() {
        let canonical = html::nth_attr(doc, r#"link[rel="canonical"]"#, 0, "href");
        if !canonical.is_empty() {
            let id = entry_id_from(&canonical);
            if id == word || id.starts_with(&prefix) {
                ids.push(id);
            }
        }
    }

    ids
}

#[async_trait::async_trait]
impl Generator for EnglishGenerator {
    async fn formatted_words(&self, word: &str, _translation: &Translation) -> Vec<String> {
        let display = word.trim();
        let lookup = display.to_lowercase();
        if lookup.is_empty() {
            return Vec::new();
        }

        let url = html::lookup_url(OXFORD_SEARCH_EN, &lookup);
        let body = match html::fetch_document(&self.client, &url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("expansion fetch failed for {lookup}: {e}");
                return Vec::new();
            }
        };

        let ids = {
            let doc = Html::parse_document(&body);
            extract_entry_ids(&doc, &lookup)
        };

        ids.into_iter()
            .map(|id| WordKey::new(lookup.clone(), id, display).to_string())
            .collect()
    }

    async fn generate_card(
        &self,
        formatted: &str,
        media_dir: &Path,
        translation: &Translation,
        online: bool,
    ) -> Card {
        let (key, card) = match initialize_card(formatted) {
            Ok(parts) => parts,
            Err(card) => return card,
        };

        match providers_for(&self.client, translation) {
            Some(ProviderSet::Single(mut dict)) => {
                single_dictionary_card(card, &key, translation, media_dir, online, dict.as_mut())
                    .await
            }
            Some(ProviderSet::Dual {
                mut main,
                mut meaning,
            }) => {
                dual_dictionary_card(
                    card,
                    &key,
                    translation,
                    media_dir,
                    online,
                    main.as_mut(),
                    meaning.as_mut(),
                )
                .await
            }
            None => Card::failed(
                CardStatus::WordNotFound,
                format!("unsupported translation: {translation}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexideck_types::{CardStatus, Language};

    const MULTI_ENTRY: &str = r#"<html><head>
<link rel="canonical" href="https://www.oxfordlearnersdictionaries.com/definition/english/run_1"/>
</head><body>
<div id="relatedentries"><ul>
<li><a href="https://www.oxfordlearnersdictionaries.com/definition/english/run_1">run verb</a></li>
<li><a href="https://www.oxfordlearnersdictionaries.com/definition/english/run_2">run noun</a></li>
<li><a href="https://www.oxfordlearnersdictionaries.com/definition/english/run_1">run verb</a></li>
<li><a href="https://www.oxfordlearnersdictionaries.com/definition/english/runner">runner noun</a></li>
</ul></div>
</body></html>"#;

    const SINGLE_ENTRY: &str = r#"<html><head>
<link rel="canonical" href="https://www.oxfordlearnersdictionaries.com/definition/english/aardvark"/>
</head><body></body></html>"#;

    #[test]
    fn related_entries_expand_in_order_without_duplicates() {
        let doc = Html::parse_document(MULTI_ENTRY);
        assert_eq!(extract_entry_ids(&doc, "run"), vec!["run_1", "run_2"]);
    }

    #[test]
    fn canonical_link_covers_single_entry_pages() {
        let doc = Html::parse_document(SINGLE_ENTRY);
        assert_eq!(extract_entry_ids(&doc, "aardvark"), vec!["aardvark"]);
    }

    #[test]
    fn unrelated_canonical_yields_no_ids() {
        let doc = Html::parse_document(SINGLE_ENTRY);
        assert!(extract_entry_ids(&doc, "zebra").is_empty());
    }

    #[test]
    fn entry_id_strips_path_and_query() {
        assert_eq!(entry_id_from("https://x.test/definition/english/run_2?q=run"), "run_2");
        assert_eq!(entry_id_from("/definition/english/cat/"), "cat");
    }

    #[tokio::test]
    async fn malformed_key_fails_without_touching_the_network() {
        let generator = EnglishGenerator::new(reqwest::Client::new());
        let translation = Translation::new(Language::English, Language::English);
        let card = generator
            .generate_card("garbage-key", Path::new("unused"), &translation, true)
            .await;
        assert_eq!(card.status, CardStatus::WordNotFound);
        assert!(card.comment.contains("garbage-key"));
    }
}
