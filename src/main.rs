mod cli;

use clap::Parser;
use cli::Cli;
use mangalivre_scraper::crawler::{Crawler, MangaOutcome};
use std::path::Path;

fn init_logging() {
    if Path::new("log4rs.yml").exists() {
        if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
            eprintln!("Invalid log4rs.yml ({}), logging to stderr", e);
            env_logger::init();
        }
    } else {
        env_logger::init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let cfg = cli.load_config();
    log::info!("Output directory: {}", cfg.output_dir);
    log::info!("Workers: {}", cfg.workers);
    log::info!("Headless: {}", cfg.browser.headless);

    let crawler = Crawler::new(cfg)?;

    let urls = if cli.urls.is_empty() {
        crawler.discover().await?
    } else {
        cli.urls.clone()
    };

    if urls.is_empty() {
        log::warn!("No series to scrape");
        return Ok(());
    }

    let summary = crawler.run(urls).await?;

    for report in &summary.reports {
        if let MangaOutcome::Skipped { reason } = &report.outcome {
            log::warn!("Skipped {}: {}", report.url, reason);
        }
    }
    summary.metrics.log_summary();

    if let Some(path) = &cli.metrics {
        std::fs::write(path, summary.metrics.export_json())?;
        log::info!("Metrics written to {}", path.display());
    }

    Ok(())
}
