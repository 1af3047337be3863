// Tests for report generation functionality

use chrono::{TimeZone, Utc};
use siteradius_core::crawl::SiteCrawl;
use siteradius_core::report::{
    CrawlReport, ReportFormat, generate_json_report, generate_text_report, load_report,
    save_report,
};
use siteradius_scanner::result::SoftFailure;
use siteradius_scanner::{CrawlConfig, CrawlOutput, FetchFailure};
use tempfile::TempDir;

fn sample_crawl() -> SiteCrawl {
    let mut output = CrawlOutput::default();
    output.pages.insert(
        "https://example.com/".to_string(),
        "Welcome to the example home page".to_string(),
    );
    output.pages.insert(
        "https://example.com/about".to_string(),
        "About us".to_string(),
    );
    output.visited.insert("https://example.com/".to_string());
    output.visited.insert("https://example.com/about".to_string());
    output.visited.insert("https://example.com/gone".to_string());
    output.failures.push(SoftFailure {
        url: "https://example.com/gone".to_string(),
        reason: FetchFailure::Status(404),
    });
    output.batches = 2;

    SiteCrawl {
        seed: "https://example.com/".to_string(),
        output,
    }
}

fn sample_report() -> CrawlReport {
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    CrawlReport::from_crawl_at(&sample_crawl(), &CrawlConfig::default(), timestamp)
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("csv"), None);
    assert_eq!(ReportFormat::from_str(""), None);
}

// ============================================================================
// Report Data Tests
// ============================================================================

#[test]
fn test_report_metadata() {
    let report = sample_report();
    let meta = &report.metadata;

    assert_eq!(meta.url, "https://example.com/");
    assert_eq!(meta.pages_crawled, 2);
    assert_eq!(meta.urls_visited, 3);
    assert_eq!(meta.failures, 1);
    assert_eq!(meta.max_pages, 100);
    assert!(meta.same_domain_only);
    assert_eq!(meta.timestamp, "2024-05-01T12:00:00+00:00");
    assert_eq!(meta.crawl_id.len(), 36);
}

#[test]
fn test_report_pages_are_sorted() {
    let report = sample_report();
    let urls: Vec<&String> = report.pages.keys().collect();
    assert_eq!(urls, vec!["https://example.com/", "https://example.com/about"]);
    assert_eq!(report.total_chars(), 32 + 8);
}

#[test]
fn test_failures_are_described() {
    let report = sample_report();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].reason, "unexpected status 404");
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_text_report_groups_by_host() {
    let text = generate_text_report(&[sample_report()]);

    assert!(text.contains("SITERADIUS CRAWL REPORT"));
    assert!(text.contains("Seed:          https://example.com/"));
    assert!(text.contains("## example.com"));
    assert!(text.contains("2 pages"));
    assert!(text.contains("/about"));
    assert!(text.contains("## Skipped"));
    assert!(text.contains("https://example.com/gone  (unexpected status 404)"));
}

#[test]
fn test_json_report_single_is_object() {
    let json = generate_json_report(&[sample_report()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value.is_object());
    assert_eq!(value["metadata"]["pages_crawled"], 2);
    assert_eq!(value["pages"]["https://example.com/about"], "About us");
}

#[test]
fn test_json_report_many_is_array() {
    let json = generate_json_report(&[sample_report(), sample_report()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value.as_array().map(|a| a.len()), Some(2));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_save_and_load_json_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");
    let report = sample_report();

    save_report(&[report.clone()], ReportFormat::Json, &path).unwrap();
    let loaded = load_report(&path).unwrap();

    assert_eq!(loaded.metadata.crawl_id, report.metadata.crawl_id);
    assert_eq!(loaded.pages, report.pages);
}

#[test]
fn test_save_text_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    save_report(&[sample_report()], ReportFormat::Text, &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Pages stored:  2 (budget 100)"));
}

#[test]
fn test_save_report_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.json");

    assert!(save_report(&[sample_report()], ReportFormat::Json, &path).is_err());
}
