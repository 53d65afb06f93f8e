// Site-specific scrapers. Each site module owns its selectors, its
// series/chapter extraction and its index crawler.
pub mod mangalivre;
