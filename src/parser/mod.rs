pub mod card_grid;
pub mod legacy_list;
pub mod pager;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::debug;
use url::Url;

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

/// One vehicle ad as it appears on a listings page. Only the name is
/// required; everything else degrades to `None` when the card omits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub name: String,
    pub price: Option<i64>,
    pub price_raw: Option<String>,
    pub desc: Option<String>,
    pub link: Option<String>,
}

/// Extraction schemas in preference order, one per markup version. The
/// first schema that yields any cards wins; results are never merged.
type Schema = fn(&Html, &Url) -> Vec<Listing>;

const SCHEMAS: &[(&str, Schema)] = &[
    ("card-grid", card_grid::extract),
    ("legacy-list", legacy_list::extract),
];

/// Extract all listings from a page, trying each schema in order.
pub fn extract_listings(html: &Html, base: &Url) -> Vec<Listing> {
    for (name, schema) in SCHEMAS {
        let cards = schema(html, base);
        if !cards.is_empty() {
            debug!(schema = name, cards = cards.len(), "schema matched");
            return cards;
        }
    }
    Vec::new()
}

/// Strip everything but digits and parse; `None` when no digits remain or
/// the value overflows. The raw text is kept separately by callers.
pub fn normalize_price(text: &str) -> Option<i64> {
    let digits = NON_DIGIT_RE.replace_all(text, "");
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Whitespace-normalized text content of a node: fragments trimmed, joined
/// with single spaces.
pub(crate) fn node_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a card href to an absolute URL. Site-relative paths join against
/// the origin; already-absolute hrefs pass through; unparseable ones are
/// kept verbatim rather than dropped.
pub(crate) fn resolve_link(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://kolesa.kz").unwrap()
    }

    #[test]
    fn price_with_spaces_and_currency() {
        assert_eq!(normalize_price("12 500 000 \u{20b8}"), Some(12_500_000));
    }

    #[test]
    fn price_without_digits() {
        assert_eq!(normalize_price("Цена договорная"), None);
        assert_eq!(normalize_price(""), None);
    }

    #[test]
    fn relative_link_is_absolutized() {
        assert_eq!(
            resolve_link(&base(), "/a/show/12345"),
            "https://kolesa.kz/a/show/12345"
        );
    }

    #[test]
    fn absolute_link_passes_through() {
        assert_eq!(
            resolve_link(&base(), "https://other.example/ad/1"),
            "https://other.example/ad/1"
        );
    }

    #[test]
    fn primary_schema_wins_when_both_markups_present() {
        let html = Html::parse_document(
            r#"
            <div class="a-card">
              <h5 class="a-card__title"><a class="a-card__link" href="/a/1">New style</a></h5>
            </div>
            <div class="a-elem">
              <a class="a-el-info-title" href="/a/2">Old style</a>
            </div>
            "#,
        );
        let cards = extract_listings(&html, &base());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "New style");
    }

    #[test]
    fn falls_back_to_legacy_when_primary_is_empty() {
        let html = Html::parse_document(
            r#"<div class="a-elem"><a class="a-el-info-title" href="/a/2">Old style</a></div>"#,
        );
        let cards = extract_listings(&html, &base());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Old style");
    }

    #[test]
    fn no_markup_yields_nothing() {
        let html = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(extract_listings(&html, &base()).is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let raw = std::fs::read_to_string("tests/fixtures/listings_card_grid.html").unwrap();
        let html = Html::parse_document(&raw);
        let first = extract_listings(&html, &base());
        let second = extract_listings(&html, &base());
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
