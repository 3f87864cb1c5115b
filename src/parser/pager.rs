use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::node_text;

static PAGER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pager, nav.pager").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Number of pages to visit according to the first page's pagination
/// control: the largest purely-numeric navigation label, clamped to
/// `[1, cap]`. A page with no pager (or no numeric labels) is a
/// single-page result.
pub fn total_pages(html: &Html, cap: usize) -> usize {
    let Some(pager) = html.select(&PAGER_SEL).next() else {
        return 1;
    };
    pager
        .select(&LINK_SEL)
        .filter_map(|a| {
            let label = node_text(a);
            if !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()) {
                label.parse::<usize>().ok()
            } else {
                None
            }
        })
        .max()
        .unwrap_or(1)
        .clamp(1, cap.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Html {
        let raw = std::fs::read_to_string("tests/fixtures/listings_card_grid.html").unwrap();
        Html::parse_document(&raw)
    }

    #[test]
    fn takes_the_largest_numeric_label() {
        assert_eq!(total_pages(&fixture(), 200), 37);
    }

    #[test]
    fn never_exceeds_the_cap() {
        assert_eq!(total_pages(&fixture(), 20), 20);
    }

    #[test]
    fn no_pager_means_one_page() {
        let raw = std::fs::read_to_string("tests/fixtures/listings_legacy.html").unwrap();
        assert_eq!(total_pages(&Html::parse_document(&raw), 200), 1);
    }

    #[test]
    fn arrow_only_pager_means_one_page() {
        let html = Html::parse_document(
            r#"<div class="pager"><a href="?page=2">&raquo;</a></div>"#,
        );
        assert_eq!(total_pages(&html, 200), 1);
    }

    #[test]
    fn never_less_than_one() {
        let html =
            Html::parse_document(r#"<nav class="pager"><a href="?page=0">0</a></nav>"#);
        assert_eq!(total_pages(&html, 200), 1);
    }
}
