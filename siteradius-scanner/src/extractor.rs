use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Elements whose text is navigation chrome or code rather than page content.
const NOISE_ELEMENTS: &[&str] = &["script", "style", "header", "footer", "nav"];

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Cleaned text and outbound links of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub text: String,
    /// Absolute link targets in first-seen order, unfiltered.
    pub links: Vec<String>,
}

/// Extract visible text and absolute link targets from `html`.
///
/// Never fails: html5ever recovers from malformed markup, so whatever text
/// and links survive parsing are returned.
pub fn extract(html: &str, page_url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    ExtractedPage {
        text: extract_text(&document),
        links: extract_links(&document, page_url),
    }
}

pub fn extract_text(document: &Html) -> String {
    let mut fragments: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let in_noise = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| NOISE_ELEMENTS.contains(&element.name()))
        });
        if !in_noise {
            fragments.push(trimmed);
        }
    }

    normalize_whitespace(&fragments.join(" "))
}

pub fn extract_links(document: &Html, page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Ok(absolute) = base.join(href) {
            let absolute = String::from(absolute);
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

/// Collapse every whitespace run into a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
