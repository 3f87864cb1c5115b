use std::path::PathBuf;
use std::time::Duration;

/// Request headers sent with every page fetch, emulating a desktop Chrome
/// session. The target serves a stripped block page to bare clients.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "ru-RU,ru;q=0.9,en-US;q=0.7,en;q=0.6"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
    ("referer", "https://kolesa.kz/"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
    ),
];

/// All crawl tunables in one immutable value, passed into the crawler at
/// construction so tests can run with small caps and instant delays.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Site origin; also the base for absolutizing card links.
    pub base_url: String,
    /// Listings path under the origin, e.g. "/cars/".
    pub listing_path: String,
    /// Hard cap on the number of pages visited, pager claims included.
    pub max_pages: usize,
    /// Abort the run after this many consecutive non-listings pages.
    pub stop_after_blocks: u32,
    /// Write a partial snapshot every Nth page.
    pub flush_every: usize,
    pub output_path: PathBuf,
    pub partial_path: PathBuf,
    /// Where rejected page bodies are dumped for offline inspection.
    pub debug_dir: PathBuf,
    /// Uniform jitter range (seconds) between successfully parsed pages.
    pub page_delay_secs: (f64, f64),
    /// Uniform backoff range (seconds) after a page fails classification.
    pub block_backoff_secs: (f64, f64),
    /// Fixed pause after a network-level fetch failure.
    pub network_recovery: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kolesa.kz".into(),
            listing_path: "/cars/".into(),
            max_pages: 200,
            stop_after_blocks: 5,
            flush_every: 20,
            output_path: "cars_kolesa.csv".into(),
            partial_path: "cars_kolesa_partial.csv".into(),
            debug_dir: ".".into(),
            page_delay_secs: (1.5, 4.0),
            block_backoff_secs: (12.0, 16.0),
            network_recovery: Duration::from_secs(5),
        }
    }
}

impl CrawlConfig {
    /// URL of the first listings page (no page parameter).
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.listing_path)
    }

    /// URL of the nth listings page. Pagination is 1-based and page 1 has
    /// no query parameter.
    pub fn page_url(&self, page: usize) -> String {
        if page <= 1 {
            self.listing_url()
        } else {
            format!("{}?page={}", self.listing_url(), page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_no_parameter() {
        let config = CrawlConfig::default();
        assert_eq!(config.page_url(1), "https://kolesa.kz/cars/");
    }

    #[test]
    fn later_pages_are_parameterized() {
        let config = CrawlConfig::default();
        assert_eq!(config.page_url(7), "https://kolesa.kz/cars/?page=7");
    }
}
