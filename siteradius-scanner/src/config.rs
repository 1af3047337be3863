use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_PAGES: usize = 100;
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable settings for a single crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Page budget; checked at batch boundaries only.
    pub max_pages: usize,
    /// Restrict discovered links to the seed's host (and port).
    pub same_domain_only: bool,
    /// Politeness pause between batches.
    #[serde(with = "duration_secs")]
    pub delay: Duration,
    /// Batch size and maximum number of in-flight fetches.
    pub workers: usize,
    /// Per-request timeout, covering connect and body read.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            same_domain_only: true,
            delay: DEFAULT_DELAY,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("SiteRadius/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlConfig {
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_same_domain_only(mut self, same_domain_only: bool) -> Self {
        self.same_domain_only = same_domain_only;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the delay from fractional seconds, rejecting negative or non-finite values.
    pub fn with_delay_secs(self, secs: f64) -> Result<Self> {
        let delay = Duration::try_from_secs_f64(secs)
            .map_err(|e| ScanError::InvalidConfig(format!("delay {}: {}", secs, e)))?;
        Ok(self.with_delay(delay))
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(ScanError::InvalidConfig(
                "max_pages must be greater than zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ScanError::InvalidConfig(
                "workers must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
