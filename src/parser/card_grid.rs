use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::{node_text, normalize_price, resolve_link, Listing};

static CARD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.a-card").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h5.a-card__title a.a-card__link").unwrap());
static PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".a-card__price, .price, .price-in-list .price").unwrap());
static DESC_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".a-card__description, .a-card__subtitle, .card__description").unwrap()
});

/// Current card-grid markup: every ad is a `div.a-card` whose title anchor
/// carries the detail link. Price and description move between class names
/// across site releases, hence the selector groups.
pub fn extract(html: &Html, base: &Url) -> Vec<Listing> {
    html.select(&CARD_SEL)
        .filter_map(|card| {
            let title = card.select(&TITLE_SEL).next()?;
            let name = node_text(title);
            let link = title
                .value()
                .attr("href")
                .map(|href| resolve_link(base, href));
            let price_raw = card
                .select(&PRICE_SEL)
                .next()
                .map(node_text)
                .filter(|t| !t.is_empty());
            let price = price_raw.as_deref().and_then(normalize_price);
            let desc = card
                .select(&DESC_SEL)
                .next()
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
