use lexideck_types::{CLOZE_FALLBACK, Meaning, NO_EXAMPLE};
use scraper::{ElementRef, Html, Selector};

use crate::error::FetchError;

/// Substitute the word into a lookup URL template.
pub fn lookup_url(template: &str, word: &str) -> String {
    template.replace("{}", &word.trim().replace(' ', "%20"))
}

/// Fetch a page body. Non-2xx responses count as fetch failures so the
/// callers never scrape an error page.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("fetching {url}");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// Element text with collapsed whitespace.
pub fn inner_text(el: &ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the n-th match, or empty when absent (or the selector is bad).
pub fn nth_text(doc: &Html, selector: &str, index: usize) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    doc.select(&sel).nth(index).map(|el| inner_text(&el)).unwrap_or_default()
}

/// Attribute of the n-th match, or empty when absent.
pub fn nth_attr(doc: &Html, selector: &str, index: usize, attr: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    doc.select(&sel)
        .nth(index)
        .and_then(|el| el.value().attr(attr))
        .unwrap_or_default()
        .to_string()
}

/// First match at document level.
pub fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

/// First match below an element.
pub fn first_in<'a>(scope: &ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    scope.select(&sel).next()
}

/// Texts of every match below an element.
pub fn texts_in(scope: &ElementRef, selector: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    scope.select(&sel).map(|el| inner_text(&el)).collect()
}

/// Lower-case an example and cloze-wrap the headword. The headword only
/// matches as a whole token; when it never does, the fallback marker is
/// appended so Anki still hides the example.
pub fn cloze_highlight(word: &str, example: &str) -> String {
    let needle = word.trim().to_lowercase();
    let lowered = example.to_lowercase();
    if needle.is_empty() {
        return format!("{lowered} {CLOZE_FALLBACK}");
    }

    let mut out = String::with_capacity(lowered.len() + 16);
    let mut wrapped = false;
    let mut idx = 0;
    while idx < lowered.len() {
        let Some(found) = lowered[idx..].find(&needle) else {
            out.push_str(&lowered[idx..]);
            break;
        };
        let start = idx + found;
        let end = start + needle.len();
        out.push_str(&lowered[idx..start]);

        let before = lowered[..start].chars().next_back();
        let after = lowered[end..].chars().next();
        let on_boundary = before.is_none_or(|c| !c.is_alphanumeric())
            && after.is_none_or(|c| !c.is_alphanumeric());
        if on_boundary {
            out.push_str(&format!("{{{{c1::{needle}}}}}"));
            wrapped = true;
        } else {
            out.push_str(&needle);
        }
        idx = end;
    }

    if wrapped {
        out
    } else {
        format!("{lowered} {CLOZE_FALLBACK}")
    }
}

/// Join highlighted examples into the card's example field.
pub fn build_example(examples: &[String]) -> String {
    if examples.is_empty() {
        return NO_EXAMPLE.to_string();
    }
    examples.join("<br>")
}

/// Render the accumulated meaning groups into one HTML block: headword
/// header, then per group an optional label, the definition, and its
/// examples.
pub fn build_meaning(word: &str, word_type: &str, phonetic: &str, meanings: &[Meaning]) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h2 class=\"headword\">{word}</h2>"));
    if !word_type.is_empty() {
        out.push_str(&format!(" <span class=\"word-type\">{word_type}</span>"));
    }
    if !phonetic.is_empty() {
        out.push_str(&format!(" <span class=\"phonetic\">{phonetic}</span>"));
    }

    for meaning in meanings {
        if let Some(label) = &meaning.label {
            out.push_str(&format!("<h4 class=\"meaning-label\">{label}</h4>"));
        }
        out.push_str("<ul class=\"meaning\">");
        if !meaning.definition.is_empty() {
            out.push_str(&format!("<li class=\"definition\">{}</li>", meaning.definition));
        }
        for example in &meaning.examples {
            out.push_str(&format!("<li class=\"example\">{example}</li>"));
        }
        out.push_str("</ul>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloze_wraps_literal_headword() {
        assert_eq!(cloze_highlight("cat", "The cat sat."), "the {{c1::cat}} sat.");
    }

    #[test]
    fn cloze_appends_fallback_when_headword_only_inflected() {
        assert_eq!(cloze_highlight("cat", "Cats are nice."), "cats are nice. {{c1::...}}");
    }

    #[test]
    fn cloze_wraps_every_occurrence() {
        assert_eq!(
            cloze_highlight("run", "Run, Forrest, run!"),
            "{{c1::run}}, forrest, {{c1::run}}!"
        );
    }

    #[test]
    fn empty_example_list_yields_placeholder() {
        assert_eq!(build_example(&[]), NO_EXAMPLE);
        assert_eq!(
            build_example(&["a".to_string(), "b".to_string()]),
            "a<br>b"
        );
    }

    #[test]
    fn lookup_url_encodes_spaces() {
        assert_eq!(
            lookup_url("https://example.com/definition/{}", "give up"),
            "https://example.com/definition/give%20up"
        );
    }

    #[test]
    fn missing_elements_degrade_to_empty() {
        let doc = Html::parse_document("<html><body><p>hi</p></body></html>");
        assert_eq!(nth_text(&doc, "span.pos", 0), "");
        assert_eq!(nth_attr(&doc, "a.topic", 0, "href"), "");
    }

    #[test]
    fn meaning_block_carries_labels_and_examples() {
        let meanings = vec![
            Meaning::labeled("Word Family", vec!["cat noun".to_string()]),
            Meaning::new("a small animal", vec!["the cat sat.".to_string()]),
        ];
        let block = build_meaning("cat", "(noun)", "/kæt/", &meanings);
        assert!(block.contains("<h2 class=\"headword\">cat</h2>"));
        assert!(block.contains("<h4 class=\"meaning-label\">Word Family</h4>"));
        assert!(block.contains("<li class=\"definition\">a small animal</li>"));
        assert!(block.contains("<li class=\"example\">the cat sat.</li>"));
    }
}
