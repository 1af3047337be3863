pub mod config;
pub mod crawler;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod frontier;
pub mod result;
pub mod validator;

pub use config::CrawlConfig;
pub use crawler::{CrawlState, Crawler, PageCallback, ProgressCallback};
pub use error::{FetchFailure, ScanError};
pub use result::{CrawlOutput, CrawlPhase, CrawlProgress, PageRecord};
