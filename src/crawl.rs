use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::classify::is_listings_page;
use crate::config::CrawlConfig;
use crate::fetch::{FetchError, PageFetcher};
use crate::output::{save_debug_html, write_snapshot};
use crate::parser::{self, Listing};

/// Sleep capability, injected so the loop's pacing is testable without
/// wall-clock delays.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delays for production crawls.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid base url {url}: {source}")]
    BadBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("first page fetch failed: {0}")]
    FirstPageFetch(#[from] FetchError),
    #[error("page 1 is not a listings page (status {status}, final url {final_url})")]
    FirstPageNotListings {
        status: u16,
        final_url: String,
        dump: PathBuf,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Counters handed back to the caller for the end-of-run summary.
#[derive(Debug)]
pub struct CrawlReport {
    pub pages_planned: usize,
    pub pages_ok: usize,
    pub pages_blocked: usize,
    pub pages_skipped: usize,
    pub aborted: bool,
    pub records: Vec<Listing>,
}

/// Sequential crawl loop: fetch, classify, extract, append, sleep. One
/// page in flight at a time; the record accumulator is owned here and
/// flushed as full-file snapshots.
pub struct Crawler<F, D> {
    config: CrawlConfig,
    fetcher: F,
    delay: D,
}

impl<F: PageFetcher, D: Delay> Crawler<F, D> {
    pub fn new(config: CrawlConfig, fetcher: F, delay: D) -> Self {
        Self {
            config,
            fetcher,
            delay,
        }
    }

    pub async fn run(self) -> Result<CrawlReport, CrawlError> {
        let base = Url::parse(&self.config.base_url).map_err(|source| CrawlError::BadBaseUrl {
            url: self.config.base_url.clone(),
            source,
        })?;

        // The first page decides everything: a failure here means the site
        // changed or we are blocked outright, and guessing is worse than
        // stopping with the evidence on disk.
        let first = self.fetcher.fetch(&self.config.listing_url()).await?;
        if !is_listings_page(&first.body) {
            let dump = save_debug_html(
                &self.config.debug_dir,
                1,
                first.status,
                &first.final_url,
                &first.body,
            )?;
            error!(
                status = first.status,
                final_url = %first.final_url,
                dump = %dump.display(),
                "page 1 is not a listings page, aborting"
            );
            return Err(CrawlError::FirstPageNotListings {
                status: first.status,
                final_url: first.final_url,
                dump,
            });
        }

        // Scoped so the parsed DOM is gone before the loop starts awaiting.
        let (pages_planned, mut records) = {
            let html = Html::parse_document(&first.body);
            let planned = parser::pager::total_pages(&html, self.config.max_pages);
            (planned, parser::extract_listings(&html, &base))
        };
        info!(
            pages = pages_planned,
            cap = self.config.max_pages,
            "pagination resolved"
        );
        let mut pages_ok = 1usize;
        let mut pages_blocked = 0usize;
        let mut pages_skipped = 0usize;
        let mut blocks_in_a_row = 0u32;
        let mut aborted = false;

        let pb = ProgressBar::new(pages_planned as u64);
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.inc(1);

        for page in 2..=pages_planned {
            let url = self.config.page_url(page);

            let fetched = match self.fetcher.fetch(&url).await {
                Ok(fetched) => fetched,
                Err(err) => {
                    warn!(page, url = %url, error = %err, "fetch failed, skipping page");
                    pages_skipped += 1;
                    pb.inc(1);
                    self.delay.sleep(self.config.network_recovery).await;
                    continue;
                }
            };

            if !is_listings_page(&fetched.body) {
                blocks_in_a_row += 1;
                pages_blocked += 1;
                let dump = save_debug_html(
                    &self.config.debug_dir,
                    page,
                    fetched.status,
                    &fetched.final_url,
                    &fetched.body,
                )?;
                warn!(
                    page,
                    status = fetched.status,
                    final_url = %fetched.final_url,
                    dump = %dump.display(),
                    streak = blocks_in_a_row,
                    "not a listings page, maybe blocked"
                );
                pb.inc(1);
                self.delay
                    .sleep(jitter(self.config.block_backoff_secs))
                    .await;
                if blocks_in_a_row >= self.config.stop_after_blocks {
                    warn!(
                        streak = blocks_in_a_row,
                        "consecutive non-listings pages, stopping the run"
                    );
                    aborted = true;
                    break;
                }
                continue;
            }

            blocks_in_a_row = 0;
            let rows = parser::extract_listings(&Html::parse_document(&fetched.body), &base);
            records.extend(rows);
            pages_ok += 1;
            pb.inc(1);
            self.delay.sleep(jitter(self.config.page_delay_secs)).await;

            if self.config.flush_every != 0 && page % self.config.flush_every == 0 {
                write_snapshot(&self.config.partial_path, &records)?;
                info!(
                    page,
                    rows = records.len(),
                    path = %self.config.partial_path.display(),
                    "partial snapshot saved"
                );
            }
        }

        pb.finish_and_clear();
        write_snapshot(&self.config.output_path, &records)?;
        info!(
            rows = records.len(),
            path = %self.config.output_path.display(),
            "final snapshot saved"
        );

        Ok(CrawlReport {
            pages_planned,
            pages_ok,
            pages_blocked,
            pages_skipped,
            aborted,
            records,
        })
    }
}

fn jitter(range: (f64, f64)) -> Duration {
    let (lo, hi) = range;
    Duration::from_secs_f64(lo + fastrand::f64() * (hi - lo))
}
