// Report generation from crawl output

use crate::crawl::{SiteCrawl, extract_url_path};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteradius_scanner::CrawlConfig;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub crawl_id: String,
    pub url: String,
    pub pages_crawled: usize,
    pub urls_visited: usize,
    pub failures: usize,
    pub timestamp: String,
    pub max_pages: usize,
    pub same_domain_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    pub url: String,
    pub reason: String,
}

/// The crawler's output contract as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub metadata: ReportMetadata,
    pub pages: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureEntry>,
}

impl CrawlReport {
    pub fn from_crawl(crawl: &SiteCrawl, config: &CrawlConfig) -> Self {
        Self::from_crawl_at(crawl, config, Utc::now())
    }

    pub fn from_crawl_at(crawl: &SiteCrawl, config: &CrawlConfig, timestamp: DateTime<Utc>) -> Self {
        let output = &crawl.output;
        let mut failures: Vec<FailureEntry> = output
            .failures
            .iter()
            .map(|f| FailureEntry {
                url: f.url.clone(),
                reason: f.reason.to_string(),
            })
            .collect();
        failures.sort_by(|a, b| a.url.cmp(&b.url));

        Self {
            metadata: ReportMetadata {
                crawl_id: Uuid::new_v4().to_string(),
                url: crawl.seed.clone(),
                pages_crawled: output.pages.len(),
                urls_visited: output.visited.len(),
                failures: output.failures.len(),
                timestamp: timestamp.to_rfc3339(),
                max_pages: config.max_pages,
                same_domain_only: config.same_domain_only,
            },
            pages: output
                .pages
                .iter()
                .map(|(url, text)| (url.clone(), text.clone()))
                .collect(),
            failures,
        }
    }

    /// Total characters of text across all pages
    pub fn total_chars(&self) -> usize {
        self.pages.values().map(|t| t.chars().count()).sum()
    }
}

pub fn generate_text_report(reports: &[CrawlReport]) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                 SITERADIUS CRAWL REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for crawl in reports {
        let meta = &crawl.metadata;
        report.push_str(&format!("Seed:          {}\n", meta.url));
        report.push_str(&format!("Crawl ID:      {}\n", meta.crawl_id));
        report.push_str(&format!("Timestamp:     {}\n", meta.timestamp));
        report.push_str(&format!(
            "Pages stored:  {} (budget {})\n",
            meta.pages_crawled, meta.max_pages
        ));
        report.push_str(&format!("URLs visited:  {}\n", meta.urls_visited));
        report.push_str(&format!("Failures:      {}\n", meta.failures));
        report.push_str(&format!("Total text:    {} chars\n\n", crawl.total_chars()));

        // Group pages by host
        let mut by_host: BTreeMap<String, Vec<(&String, &String)>> = BTreeMap::new();
        for (url, text) in &crawl.pages {
            let host = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_string()))
                .unwrap_or_else(|| "unknown".to_string());
            by_host.entry(host).or_default().push((url, text));
        }

        for (host, pages) in &by_host {
            report.push_str(&format!("## {}\n", host));
            report.push_str(&format!("  {} pages\n\n", pages.len()));
            for (url, text) in pages {
                report.push_str(&format!(
                    "  {:>7} chars  {}\n",
                    text.chars().count(),
                    extract_url_path(url)
                ));
            }
            report.push('\n');
        }

        if !crawl.failures.is_empty() {
            report.push_str("## Skipped\n");
            for failure in &crawl.failures {
                report.push_str(&format!("  {}  ({})\n", failure.url, failure.reason));
            }
            report.push('\n');
        }

        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    }

    report
}

/// Serialize reports as JSON: a single object for one seed, an array otherwise.
pub fn generate_json_report(reports: &[CrawlReport]) -> serde_json::Result<String> {
    match reports {
        [single] => serde_json::to_string_pretty(single),
        _ => serde_json::to_string_pretty(reports),
    }
}

pub fn render_report(reports: &[CrawlReport], format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(reports)),
        ReportFormat::Json => generate_json_report(reports),
    }
}

pub fn save_report(
    reports: &[CrawlReport],
    format: ReportFormat,
    output_path: &Path,
) -> std::io::Result<()> {
    let content = render_report(reports, format)?;
    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Read back a single-seed JSON results file
pub fn load_report(path: &Path) -> std::io::Result<CrawlReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
