use crate::config::CrawlConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, ScanError};
use crate::frontier::Frontier;
use crate::result::{
    BatchOutcome, CrawlOutput, CrawlPhase, CrawlProgress, PageRecord, SoftFailure,
};
use crate::validator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(CrawlProgress) + Send + Sync>;
pub type PageCallback = Arc<dyn Fn(&PageRecord) + Send + Sync>;

/// Everything a crawl mutates, owned by the controller loop.
#[derive(Debug, Clone)]
pub struct CrawlState {
    pub frontier: Frontier,
    pub pages: HashMap<String, String>,
    pub failures: Vec<SoftFailure>,
    pub phase: CrawlPhase,
    pub batches: usize,
}

impl CrawlState {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            frontier: Frontier::with_seed(seed),
            pages: HashMap::new(),
            failures: Vec::new(),
            phase: CrawlPhase::Idle,
            batches: 0,
        }
    }

    /// Whether another batch should run under the page budget.
    pub fn should_continue(&self, max_pages: usize) -> bool {
        !self.frontier.is_empty() && self.pages.len() < max_pages
    }

    /// Select the next batch, marking every URL in it as visited.
    pub fn next_batch(&mut self, workers: usize) -> Vec<String> {
        let size = workers.min(self.frontier.len());
        self.frontier.pop_batch(size)
    }

    /// Fold a resolved batch into the state.
    ///
    /// Returns the pages that were newly stored.
    pub fn merge(&mut self, outcome: BatchOutcome) -> Vec<PageRecord> {
        self.batches += 1;
        let mut stored = Vec::with_capacity(outcome.pages.len());

        for page in outcome.pages {
            if !self.pages.contains_key(&page.url) {
                self.pages.insert(page.url.clone(), page.text.clone());
                stored.push(page);
            }
        }

        let mut enqueued = 0;
        for link in outcome.links {
            if self.frontier.push(link) {
                enqueued += 1;
            }
        }
        debug!("Enqueued {} new links", enqueued);

        self.failures.extend(outcome.failures);
        stored
    }

    pub fn progress(&self, max_pages: usize) -> CrawlProgress {
        CrawlProgress {
            pages_collected: self.pages.len(),
            max_pages,
            batch: self.batches,
            frontier_len: self.frontier.len(),
        }
    }

    pub fn into_output(self) -> CrawlOutput {
        CrawlOutput {
            pages: self.pages,
            visited: self.frontier.into_visited(),
            failures: self.failures,
            batches: self.batches,
            phase: self.phase,
        }
    }
}

/// Crawl controller: pulls batches from the frontier, dispatches them and
/// merges the results until the frontier drains or the page budget is met.
pub struct Crawler {
    config: Arc<CrawlConfig>,
    dispatcher: Dispatcher,
    progress_callback: Option<ProgressCallback>,
    page_callback: Option<PageCallback>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let dispatcher = Dispatcher::new(config.clone())?;

        Ok(Self {
            config,
            dispatcher,
            progress_callback: None,
            page_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_page_callback(mut self, callback: PageCallback) -> Self {
        self.page_callback = Some(callback);
        self
    }

    pub async fn crawl(&self, seed: &str) -> Result<CrawlOutput> {
        let seed_url = parse_seed(seed)?;
        let base_domain = validator::authority(&seed_url)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no host", seed)))?;

        info!(
            "Starting crawl of {} (max {} pages, {} workers, same domain only: {})",
            seed_url, self.config.max_pages, self.config.workers, self.config.same_domain_only
        );

        let mut state = CrawlState::new(seed_url.as_str());
        state.phase = CrawlPhase::Running;

        while state.should_continue(self.config.max_pages) {
            let batch = state.next_batch(self.config.workers);
            debug!("Dispatching batch {} of {} URLs", state.batches + 1, batch.len());

            let outcome = self.dispatcher.dispatch(batch, &base_domain).await;
            let stored = state.merge(outcome);

            if let Some(ref callback) = self.page_callback {
                for page in &stored {
                    callback(page);
                }
            }
            if let Some(ref callback) = self.progress_callback {
                callback(state.progress(self.config.max_pages));
            }

            if state.should_continue(self.config.max_pages) {
                self.dispatcher.politeness_pause().await;
            }
        }

        state.phase = CrawlPhase::Completed;
        info!(
            "Crawl complete. Visited {} URLs, stored {} pages, {} failures",
            state.frontier.visited().len(),
            state.pages.len(),
            state.failures.len()
        );

        Ok(state.into_output())
    }
}

fn parse_seed(seed: &str) -> Result<Url> {
    let url = Url::parse(seed)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            seed,
            url.scheme()
        )));
    }
    Ok(url)
}
