//! Counters for a scraping run, built from the per-manga reports
use crate::crawler::{MangaOutcome, MangaReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchMetrics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub manga_saved: u64,
    pub manga_skipped: u64,
    pub chapters_complete: u64,
    pub chapters_degraded: u64,
    pub age_restricted_chapters: u64,
    pub pages_collected: u64,
    pub navigation_retries: u64,
    pub last_error: Option<String>,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            manga_saved: 0,
            manga_skipped: 0,
            chapters_complete: 0,
            chapters_degraded: 0,
            age_restricted_chapters: 0,
            pages_collected: 0,
            navigation_retries: 0,
            last_error: None,
        }
    }

    pub fn record(&mut self, report: &MangaReport) {
        match &report.outcome {
            MangaOutcome::Saved { chapters, .. } => {
                self.manga_saved += 1;
                for chapter in chapters {
                    if chapter.is_complete() {
                        self.chapters_complete += 1;
                    } else {
                        self.chapters_degraded += 1;
                    }
                    if chapter.age_restricted {
                        self.age_restricted_chapters += 1;
                    }
                    self.pages_collected += chapter.pages_collected as u64;
                    self.navigation_retries += u64::from(chapter.navigation_attempts.saturating_sub(1));
                }
            }
            MangaOutcome::Skipped { reason } => {
                self.manga_skipped += 1;
                self.last_error = Some(format!("{}: {}", report.url, reason));
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Share of manga that were saved, in percent
    pub fn success_rate(&self) -> f64 {
        let total = self.manga_saved + self.manga_skipped;
        if total == 0 {
            0.0
        } else {
            (self.manga_saved as f64 / total as f64) * 100.0
        }
    }

    pub fn log_summary(&self) {
        log::info!(
            "Run finished: {} manga saved, {} skipped ({:.2}% success)",
            self.manga_saved,
            self.manga_skipped,
            self.success_rate()
        );
        log::info!(
            "Chapters: {} complete, {} degraded, {} age restricted; {} pages collected; {} navigation retries",
            self.chapters_complete,
            self.chapters_degraded,
            self.age_restricted_chapters,
            self.pages_collected,
            self.navigation_retries
        );
        if let Some(last_error) = &self.last_error {
            log::info!("Last error: {}", last_error);
        }
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mangalivre::{ChapterOutcome, ChapterReport, Degradation};

    fn chapter(outcome: ChapterOutcome, pages: usize, attempts: u32) -> ChapterReport {
        ChapterReport {
            url: "https://mangalivre.net/ler/x".to_string(),
            navigation_attempts: attempts,
            age_restricted: attempts > 1,
            number_of_pages: pages as u32 + 1,
            pages_collected: pages,
            outcome,
        }
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = BatchMetrics::new();
        assert_eq!(metrics.success_rate(), 0.0);
        assert!(metrics.finished_at.is_none());
    }

    #[test]
    fn test_record_reports() {
        let mut metrics = BatchMetrics::new();
        metrics.record(&MangaReport {
            url: "a".to_string(),
            outcome: MangaOutcome::Saved {
                title: "A".to_string(),
                chapters: vec![
                    chapter(ChapterOutcome::Complete, 23, 1),
                    chapter(
                        ChapterOutcome::Degraded(vec![Degradation::PageCountTimedOut]),
                        0,
                        2,
                    ),
                ],
            },
        });
        metrics.record(&MangaReport {
            url: "b".to_string(),
            outcome: MangaOutcome::Skipped {
                reason: "series title not found".to_string(),
            },
        });

        assert_eq!(metrics.manga_saved, 1);
        assert_eq!(metrics.manga_skipped, 1);
        assert_eq!(metrics.chapters_complete, 1);
        assert_eq!(metrics.chapters_degraded, 1);
        assert_eq!(metrics.age_restricted_chapters, 1);
        assert_eq!(metrics.pages_collected, 23);
        assert_eq!(metrics.navigation_retries, 1);
        assert_eq!(metrics.success_rate(), 50.0);
        assert_eq!(metrics.last_error.as_deref(), Some("b: series title not found"));
    }

    #[test]
    fn test_export_json() {
        let mut metrics = BatchMetrics::new();
        metrics.manga_saved = 2;
        metrics.pages_collected = 40;
        metrics.finish();

        let parsed: BatchMetrics = serde_json::from_str(&metrics.export_json()).unwrap();
        assert_eq!(parsed, metrics);
    }
}
