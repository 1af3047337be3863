pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_crawl_config, load_urls_from_file, load_urls_from_source, parse_url_line,
    resolve_output_path,
};

// Re-export crawl functionality from siteradius-core
pub use siteradius_core::crawl::{
    CrawlOptions, CrawlProgressCallback, SiteCrawl, execute_crawl, extract_url_path,
};
pub use siteradius_core::report::{CrawlReport, ReportFormat, generate_text_report};
