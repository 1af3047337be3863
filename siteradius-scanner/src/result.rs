use crate::error::FetchFailure;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Minimum length, in characters, a page's text must exceed to be kept.
pub const MIN_CONTENT_CHARS: usize = 100;

/// A stored page: its URL and cleaned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub text: String,
}

/// What a single fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Stored {
        page: PageRecord,
        /// Links that passed validation.
        links: Vec<String>,
    },
    Failed {
        url: String,
        reason: FetchFailure,
    },
}

/// A per-URL failure kept for inspection after the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub url: String,
    pub reason: FetchFailure,
}

/// Everything one batch produced, merged by the controller after the batch resolves.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub pages: Vec<PageRecord>,
    /// Valid links in discovery order; may contain duplicates across pages.
    pub links: Vec<String>,
    pub failures: Vec<SoftFailure>,
}

impl BatchOutcome {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = FetchOutcome>) -> Self {
        let mut batch = BatchOutcome::default();
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Stored { page, links } => {
                    batch.pages.push(page);
                    batch.links.extend(links);
                }
                FetchOutcome::Failed { url, reason } => {
                    batch.failures.push(SoftFailure { url, reason });
                }
            }
        }
        batch
    }
}

/// Where a crawl is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrawlPhase {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Progress after a batch has been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    pub pages_collected: usize,
    pub max_pages: usize,
    /// 1-based index of the batch just merged.
    pub batch: usize,
    pub frontier_len: usize,
}

impl CrawlProgress {
    /// Collected pages as a fraction of the budget, capped at 1.0.
    pub fn fraction(&self) -> f64 {
        if self.max_pages == 0 {
            return 1.0;
        }
        (self.pages_collected as f64 / self.max_pages as f64).min(1.0)
    }
}

/// Final result of a crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutput {
    /// URL to cleaned text. No ordering is implied.
    pub pages: HashMap<String, String>,
    /// Every URL selected for fetch, successful or not.
    pub visited: HashSet<String>,
    pub failures: Vec<SoftFailure>,
    pub batches: usize,
    pub phase: CrawlPhase,
}

impl CrawlOutput {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
