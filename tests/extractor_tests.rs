mod common;

use common::{chapter_url, fast_settings, FakeSite, MISSING_TITLE_URL, SERIES_URL};
use mangalivre_scraper::browser::RenderedPage;
use mangalivre_scraper::config::ReaderSettings;
use mangalivre_scraper::models::MangaStatus;
use mangalivre_scraper::sources::mangalivre::{ExtractError, MangaInfoScraper};

#[test]
fn test_get_manga_info_from_rendered_page() {
    let mut site = FakeSite::dorohedoro();
    let settings = fast_settings();

    let manga = MangaInfoScraper::new(&mut site, &settings)
        .get_manga_info(SERIES_URL)
        .unwrap();

    assert_eq!(manga.title, "Dorohedoro");
    assert_eq!(manga.url, SERIES_URL);
    assert_eq!(manga.author, "Q Hayashida");
    assert_eq!(manga.status, MangaStatus::Complete);
    assert_eq!(manga.categories, vec!["Ação", "Terror"]);
    assert_eq!(manga.alternative_titles, vec!["ドロヘドロ"]);
    assert_eq!(manga.cover, "https://static.mangalivre.net/capas/dorohedoro.jpg");

    let urls: Vec<_> = manga.chapters.iter().map(|c| c.url.clone()).collect();
    assert_eq!(urls, vec![chapter_url(2), chapter_url(1)]);
    assert!(manga.chapters.iter().all(|c| c.is_stub()));
    assert_eq!(site.navigations, vec![SERIES_URL.to_string()]);
}

#[test]
fn test_scrolls_until_page_stops_growing() {
    let mut site = FakeSite::dorohedoro();
    site.series.get_mut(SERIES_URL).unwrap().heights = vec![1000, 1500, 2200, 2200];
    let settings = fast_settings();

    site.navigate(SERIES_URL).unwrap();
    let rounds = MangaInfoScraper::new(&mut site, &settings).load_full_page().unwrap();
    assert_eq!(rounds, 2);
}

#[test]
fn test_scroll_rounds_are_capped() {
    let mut site = FakeSite::dorohedoro();
    site.series.get_mut(SERIES_URL).unwrap().heights = (1..=50).map(|i| i * 100).collect();
    let settings = ReaderSettings {
        max_scroll_rounds: 5,
        ..fast_settings()
    };

    site.navigate(SERIES_URL).unwrap();
    let rounds = MangaInfoScraper::new(&mut site, &settings).load_full_page().unwrap();
    assert_eq!(rounds, 5);
}

#[test]
fn test_missing_title_is_an_error() {
    let mut site = FakeSite::dorohedoro();
    let settings = fast_settings();

    let result = MangaInfoScraper::new(&mut site, &settings).get_manga_info(MISSING_TITLE_URL);
    assert!(matches!(result, Err(ExtractError::MissingTitle)));
}

#[test]
fn test_unknown_page_has_no_series_data() {
    let mut site = FakeSite::dorohedoro();
    let settings = fast_settings();

    let result = MangaInfoScraper::new(&mut site, &settings)
        .get_manga_info("https://mangalivre.net/manga/inexistente/1");
    assert!(matches!(result, Err(ExtractError::MissingSeriesData)));
}

#[test]
fn test_closed_session_is_an_error() {
    let mut site = FakeSite::dorohedoro();
    site.close().unwrap();
    let settings = fast_settings();

    let result = MangaInfoScraper::new(&mut site, &settings).get_manga_info(SERIES_URL);
    assert!(matches!(result, Err(ExtractError::Session(_))));
}
