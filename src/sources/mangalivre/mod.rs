/// mangalivre.net - series pages and the chapter reader are rendered
/// client-side, so both are read through a browser session; the series
/// index is plain HTML.
pub mod chapters;
pub mod info;
pub mod listing;
pub mod selectors;

pub use chapters::{ChapterOutcome, ChapterReport, ChapterWalker, Degradation};
pub use info::{parse_manga, ExtractError, MangaInfoScraper};
pub use listing::ListingCrawler;
pub use selectors::ReaderSelectors;

pub const BASE_URL: &str = "https://mangalivre.net";

/// Every chapter reader URL starts with this
pub const READER_URL_PREFIX: &str = "https://mangalivre.net/ler/";

/// Series index, sorted by name; the page number is appended
pub const LISTING_URL: &str = "https://mangalivre.net/series/index/nome/todos?page=";
