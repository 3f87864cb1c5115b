mod classify;
mod config;
mod crawl;
mod fetch;
mod output;
mod parser;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::CrawlConfig;
use crate::crawl::{Crawler, TokioDelay};
use crate::fetch::{HttpFetcher, PageFetcher};

#[derive(Parser)]
#[command(name = "kolesa_scraper", about = "kolesa.kz car listings crawler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the listings and write CSV snapshots
    Run {
        /// Max pages to visit (default: 200)
        #[arg(short = 'n', long)]
        pages: Option<usize>,
        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch page 1 only and report what a crawl would see
    Probe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { pages, output } => {
            let mut config = CrawlConfig::default();
            if let Some(pages) = pages {
                config.max_pages = pages;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            let output_path = config.output_path.clone();

            let fetcher = HttpFetcher::new()?;
            let report = Crawler::new(config, fetcher, TokioDelay).run().await?;

            println!(
                "Crawled {} of {} pages ({} blocked, {} skipped).",
                report.pages_ok, report.pages_planned, report.pages_blocked, report.pages_skipped
            );
            if report.aborted {
                println!("Stopped early: too many consecutive non-listings pages.");
            }
            println!("Saved {} rows to {}.", report.records.len(), output_path.display());
            Ok(())
        }
        Commands::Probe => {
            let config = CrawlConfig::default();
            let fetcher = HttpFetcher::new()?;
            let page = fetcher.fetch(&config.listing_url()).await?;
            let recognized = classify::is_listings_page(&page.body);

            println!("status:   {}", page.status);
            println!("url:      {}", page.final_url);
            println!("listings: {}", if recognized { "yes" } else { "no" });
            if recognized {
                let html = scraper::Html::parse_document(&page.body);
                let base = url::Url::parse(&config.base_url)?;
                println!(
                    "pages:    {} (cap {})",
                    parser::pager::total_pages(&html, config.max_pages),
                    config.max_pages
                );
                println!(
                    "cards:    {}",
                    parser::extract_listings(&html, &base).len()
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
