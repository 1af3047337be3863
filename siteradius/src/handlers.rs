use anyhow::{Context, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use siteradius_core::crawl::{CrawlOptions, CrawlProgressCallback, SiteCrawl, execute_crawl};
use siteradius_core::report::{CrawlReport, ReportFormat, render_report, save_report};
use siteradius_scanner::CrawlConfig;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok_and(|u| u.has_host()) {
        return Some(with_scheme);
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

/// Build a crawl configuration from command-line values
pub fn build_crawl_config(
    max_pages: usize,
    threads: usize,
    delay_secs: f64,
    timeout_secs: u64,
    cross_domain: bool,
) -> Result<CrawlConfig, String> {
    let config = CrawlConfig::default()
        .with_max_pages(max_pages)
        .with_workers(threads)
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_same_domain_only(!cross_domain)
        .with_delay_secs(delay_secs)
        .map_err(|e| e.to_string())?;

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Expand `~` and environment variables in an output path
pub fn resolve_output_path(raw: &str) -> Result<PathBuf, String> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| format!("Invalid output path '{}': {}", raw, e))
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) {
    // Initialize tracing for logging
    let max_level = if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    if let Err(e) = run_crawl(sub_matches, quiet).await {
        eprintln!("{} {:#}", "✗".red(), e);
        std::process::exit(1);
    }
}

async fn run_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let max_pages = *sub_matches.get_one::<usize>("max-pages").unwrap_or(&100);
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&10);
    let delay = *sub_matches.get_one::<f64>("delay").unwrap_or(&0.1);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let cross_domain = sub_matches.get_flag("cross-domain");
    let output = sub_matches.get_one::<String>("output");
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let urls = load_urls_from_source(url, hosts_file).map_err(|e| anyhow!(e))?;
    let config = build_crawl_config(max_pages, threads, delay, timeout, cross_domain)
        .map_err(|e| anyhow!(e))?;
    let output_path = output
        .map(|raw| resolve_output_path(raw))
        .transpose()
        .map_err(|e| anyhow!(e))?;

    if !quiet {
        println!("\n🕷️  Crawling {} host(s)", urls.len());
        println!("Max pages: {}", config.max_pages);
        println!("Workers: {}", config.workers);
        println!("Delay: {:?}", config.delay);
        let scope = if config.same_domain_only {
            "disabled (same host only)"
        } else {
            "enabled (follow all hosts)"
        };
        println!("Cross-domain: {}\n", scope);
    }

    let options = CrawlOptions {
        urls,
        config: config.clone(),
        show_progress_bars: !quiet,
    };

    // Seed failures are still logged at warn level when quiet
    let progress_callback: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            println!("{}", msg);
        }))
    };

    let crawls: Vec<SiteCrawl> = execute_crawl(options, progress_callback, None)
        .await
        .map_err(|e| anyhow!("Crawl failed: {}", e))?;

    if !quiet {
        println!("\n{} Crawl complete!\n", "✓".green());
    }

    let reports: Vec<CrawlReport> = crawls
        .iter()
        .map(|crawl| CrawlReport::from_crawl(crawl, &config))
        .collect();

    match output_path {
        Some(path) => {
            save_report(&reports, format, &path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            if !quiet {
                println!("{} Report saved to {}", "✓".green(), path.display());
            }
        }
        None => {
            let rendered = render_report(&reports, format).context("Failed to render report")?;
            print!("{}", rendered);
        }
    }

    Ok(())
}
