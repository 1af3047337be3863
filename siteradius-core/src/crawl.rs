use indicatif::{ProgressBar, ProgressStyle};
use siteradius_scanner::{CrawlConfig, CrawlOutput, CrawlProgress, Crawler, PageCallback};
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub urls: Vec<String>,
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
}

/// One seed's crawl output
#[derive(Debug, Clone)]
pub struct SiteCrawl {
    pub seed: String,
    pub output: CrawlOutput,
}

/// Callback for reporting crawl progress messages
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for observing pages as they are stored
pub type CrawlPageCallback = PageCallback;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Format a progress update for display
pub fn describe_progress(progress: &CrawlProgress) -> String {
    format!(
        "Crawling... {}/{} pages ({:.0}%), batch {}, {} queued",
        progress.pages_collected,
        progress.max_pages,
        progress.fraction() * 100.0,
        progress.batch,
        progress.frontier_len
    )
}

/// Execute a crawl for every seed in `options`, one after another.
///
/// A seed that cannot be crawled is logged, reported through
/// `progress_callback` and skipped; the remaining seeds still run. Without a
/// progress bar, per-batch progress also goes to `progress_callback`.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
    page_callback: Option<CrawlPageCallback>,
) -> Result<Vec<SiteCrawl>, String> {
    let CrawlOptions {
        urls,
        config,
        show_progress_bars,
    } = options;

    let max_pages = config.max_pages;

    // Bar length tracks the page budget; position tracks pages collected
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(max_pages as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| format!("Invalid progress template: {}", e))?
                .progress_chars("=> "),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::new(config).map_err(|e| e.to_string())?;

    // Per-batch progress drives the bar when there is one, otherwise it is
    // forwarded to the caller as a message
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |progress: CrawlProgress| {
            pb_clone.set_position(progress.pages_collected.min(max_pages) as u64);
            pb_clone.set_message(describe_progress(&progress));
        }));
    } else if let Some(ref callback) = progress_callback {
        let callback = callback.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |progress: CrawlProgress| {
            callback(describe_progress(&progress));
        }));
    }

    if let Some(cb) = page_callback {
        crawler = crawler.with_page_callback(cb);
    }

    let mut all_results = Vec::new();
    for (idx, url_str) in urls.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && urls.len() > 1
        {
            callback(format!(
                "Crawling host {}/{}: {}",
                idx + 1,
                urls.len(),
                url_str
            ));
        }

        if let Some(ref pb) = progress_bar {
            pb.set_position(0);
        }

        match crawler.crawl(url_str).await {
            Ok(output) => {
                all_results.push(SiteCrawl {
                    seed: url_str.clone(),
                    output,
                });
            }
            Err(e) => {
                warn!("Failed to crawl {}: {}", url_str, e);
                if let Some(ref callback) = progress_callback {
                    callback(format!("[!]  Failed to crawl {}: {}", url_str, e));
                }
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        let total: usize = all_results.iter().map(|r| r.output.page_count()).sum();
        pb.finish_with_message(format!("Crawl complete! {} pages collected", total));
    }

    Ok(all_results)
}
