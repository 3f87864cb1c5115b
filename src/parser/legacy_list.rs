use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::{node_text, normalize_price, resolve_link, Listing};

static BLOCK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.a-elem").unwrap());
static TITLE_A_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.a-el-info-title").unwrap());
static TITLE_SPAN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-el-info-title").unwrap());
static PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-el-info-price").unwrap());
static PRICE_ALT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.price").unwrap());
static DESC_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.a-el-info-description").unwrap());
static DESC_ALT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.a-search-description").unwrap());

/// Legacy list markup (`div.a-elem` blocks). The title is preferably an
/// anchor but some renders use a bare `span`, in which case the card has no
/// link. Blocks without a name are skipped.
pub fn extract(html: &Html, base: &Url) -> Vec<Listing> {
    html.select(&BLOCK_SEL)
        .filter_map(|block| {
            let title = block
                .select(&TITLE_A_SEL)
                .next()
                .or_else(|| block.select(&TITLE_SPAN_SEL).next())?;
            let name = node_text(title);
            if name.is_empty() {
                return None;
            }
            let link = title
                .value()
                .attr("href")
                .map(|href| resolve_link(base, href));
            let price_raw = block
                .select(&PRICE_SEL)
                .next()
                .or_else(|| block.select(&PRICE_ALT_SEL).next())
                .map(node_text)
                .filter(|t| !t.is_empty());
            let price = price_raw.as_deref().and_then(normalize_price);
            let desc = block
                .select(&DESC_SEL)
                .next()
                .or_else(|| block.select(&DESC_ALT_SEL).next())
                .map(node_text)
                .filter(|t| !t.is_empty());
            Some(Listing {
                name,
                price,
                price_raw,
                desc,
                link,
            })
        })
        .collect()
}
