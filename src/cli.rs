use clap::Parser;
use mangalivre_scraper::browser::BrowserConfig;
use mangalivre_scraper::config::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mangalivre-scraper")]
#[command(
    version,
    about = "Scrape manga metadata and chapter page images from mangalivre.net",
    long_about = "Scrape manga metadata and chapter page images from mangalivre.net.\n\nSeries URLs given on the command line are scraped directly; without any, they are discovered from the index pages configured under [listing]."
)]
pub struct Cli {
    /// Series page URLs to scrape
    #[arg(value_name = "SERIES_URL")]
    pub urls: Vec<String>,

    #[arg(long, value_name = "PATH", default_value = "config.toml", help = "Configuration file (TOML)")]
    pub config: PathBuf,

    #[arg(long, help = "Number of parallel browser workers; overrides the config file")]
    pub workers: Option<usize>,

    #[arg(long, value_name = "DIR", help = "Directory of the JSON store; overrides the config file")]
    pub output_dir: Option<String>,

    #[arg(
        long,
        help = "Run a visible browser with images enabled, replacing the [browser] section"
    )]
    pub show_browser: bool,

    #[arg(long, value_name = "PATH", help = "Write the run metrics as JSON to this file")]
    pub metrics: Option<PathBuf>,
}

impl Cli {
    /// Load the configuration file and apply the command-line overrides
    pub fn load_config(&self) -> Config {
        let mut cfg = Config::load_from(&self.config);
        self.apply(&mut cfg);
        cfg
    }

    fn apply(&self, cfg: &mut Config) {
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(output_dir) = &self.output_dir {
            cfg.output_dir = output_dir.clone();
        }
        if self.show_browser {
            cfg.browser = BrowserConfig::debug_mode();
        }
    }
}
