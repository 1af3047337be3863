use crate::config::CrawlConfig;
use crate::error::{FetchFailure, Result};
use crate::extractor;
use crate::result::{BatchOutcome, FetchOutcome, MIN_CONTENT_CHARS, PageRecord};
use crate::validator;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Fetches a batch of URLs with bounded concurrency.
///
/// Workers only read the config and return [`FetchOutcome`] values; the
/// controller owns all crawl state.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    config: Arc<CrawlConfig>,
}

impl Dispatcher {
    pub fn new(config: Arc<CrawlConfig>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(config.workers)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch every URL in `batch`, returning once all of them have resolved.
    ///
    /// Outcomes come back in batch order regardless of which fetch finishes
    /// first, so links reach the frontier in discovery order.
    pub async fn dispatch(&self, batch: Vec<String>, base_domain: &str) -> BatchOutcome {
        let batch_size = batch.len();
        let start = Instant::now();

        let outcomes: Vec<FetchOutcome> = stream::iter(batch)
            .map(|url| self.fetch_page(url, base_domain))
            .buffered(self.config.workers)
            .collect()
            .await;

        let outcome = BatchOutcome::from_outcomes(outcomes);
        debug!(
            "Batch of {} resolved in {:?}: {} stored, {} failed, {} links",
            batch_size,
            start.elapsed(),
            outcome.pages.len(),
            outcome.failures.len(),
            outcome.links.len()
        );
        outcome
    }

    /// Sleep for the configured politeness delay.
    pub async fn politeness_pause(&self) {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
    }

    async fn fetch_page(&self, url: String, base_domain: &str) -> FetchOutcome {
        match self.fetch_and_extract(&url, base_domain).await {
            Ok((page, links)) => FetchOutcome::Stored { page, links },
            Err(reason) => {
                warn!("Skipping {}: {}", url, reason);
                FetchOutcome::Failed { url, reason }
            }
        }
    }

    async fn fetch_and_extract(
        &self,
        url: &str,
        base_domain: &str,
    ) -> std::result::Result<(PageRecord, Vec<String>), FetchFailure> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::from_request(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let is_html = content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/html"));
        if !is_html {
            return Err(FetchFailure::NotHtml(content_type));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::from_body(&e))?;

        // parsing happens after the last await so the document never crosses one
        let extracted = extractor::extract(&body, url);
        let text_len = extracted.text.chars().count();
        if text_len <= MIN_CONTENT_CHARS {
            return Err(FetchFailure::ContentTooShort(text_len));
        }

        let links: Vec<String> = extracted
            .links
            .into_iter()
            .filter(|link| {
                validator::is_valid_url(link, base_domain, self.config.same_domain_only)
            })
            .collect();

        debug!("Stored {} ({} chars, {} links)", url, text_len, links.len());

        Ok((
            PageRecord {
                url: url.to_string(),
                text: extracted.text,
            },
            links,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn long_paragraph(topic: &str) -> String {
        format!(
            "<p>{} is described here at length so that the extracted text clears the minimum \
             content threshold without any trouble at all.</p>",
            topic
        )
    }

    fn html_response(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
    }

    fn dispatcher(config: CrawlConfig) -> Dispatcher {
        Dispatcher::new(Arc::new(config)).unwrap()
    }

    #[tokio::test]
    async fn test_stores_page_and_filters_links() {
        let mock_server = MockServer::start().await;
        let base = validator::base_domain_of(&mock_server.uri()).unwrap();

        let body = format!(
            r#"<html><body>{}
                <a href="/next">Next</a>
                <a href="/logo.png">Logo</a>
                <a href="https://elsewhere.test/">Elsewhere</a>
            </body></html>"#,
            long_paragraph("Rust")
        );
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_response(body))
            .mount(&mock_server)
            .await;

        let seed = format!("{}/", mock_server.uri());
        let outcome = dispatcher(CrawlConfig::default())
            .dispatch(vec![seed.clone()], &base)
            .await;

        assert_eq!(outcome.pages.len(), 1);
        assert_eq!(outcome.pages[0].url, seed);
        assert!(outcome.pages[0].text.starts_with("Rust is described here"));
        assert_eq!(outcome.links, vec![format!("{}/next", mock_server.uri())]);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_soft_failures_are_classified() {
        let mock_server = MockServer::start().await;
        let base = validator::base_domain_of(&mock_server.uri()).unwrap();

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/short"))
            .respond_with(html_response("<p>tiny</p>".to_string()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/created"))
            .respond_with(
                ResponseTemplate::new(201).set_body_raw(long_paragraph("Created"), "text/html"),
            )
            .mount(&mock_server)
            .await;

        let batch: Vec<String> = ["/missing", "/data", "/short", "/created"]
            .iter()
            .map(|p| format!("{}{}", mock_server.uri(), p))
            .collect();
        let outcome = dispatcher(CrawlConfig::default())
            .dispatch(batch, &base)
            .await;

        assert!(outcome.pages.is_empty());
        assert!(outcome.links.is_empty());
        assert_eq!(outcome.failures.len(), 4);

        let reason_for = |suffix: &str| {
            outcome
                .failures
                .iter()
                .find(|f| f.url.ends_with(suffix))
                .map(|f| f.reason.clone())
                .unwrap()
        };
        assert_eq!(reason_for("/missing"), FetchFailure::Status(404));
        assert_eq!(
            reason_for("/data"),
            FetchFailure::NotHtml(Some("application/json".to_string()))
        );
        assert_eq!(reason_for("/short"), FetchFailure::ContentTooShort(4));
        assert_eq!(reason_for("/created"), FetchFailure::Status(201));
    }

    #[tokio::test]
    async fn test_timeout_is_a_soft_failure() {
        let mock_server = MockServer::start().await;
        let base = validator::base_domain_of(&mock_server.uri()).unwrap();

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                html_response(long_paragraph("Slow")).set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let config = CrawlConfig::default().with_timeout(Duration::from_millis(200));
        let outcome = dispatcher(config)
            .dispatch(vec![format!("{}/slow", mock_server.uri())], &base)
            .await;

        assert!(outcome.pages.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].reason, FetchFailure::Timeout);
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_soft_failure() {
        let outcome = dispatcher(CrawlConfig::default().with_timeout(Duration::from_secs(2)))
            .dispatch(vec!["http://127.0.0.1:1/".to_string()], "127.0.0.1:1")
            .await;

        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0].reason,
            FetchFailure::Transport(_) | FetchFailure::Timeout
        ));
    }

    #[tokio::test]
    async fn test_links_follow_batch_order_not_completion_order() {
        let mock_server = MockServer::start().await;
        let base = validator::base_domain_of(&mock_server.uri()).unwrap();

        let slow = format!(
            r#"<html><body>{}<a href="/a1">A1</a></body></html>"#,
            long_paragraph("Slow")
        );
        let fast = format!(
            r#"<html><body>{}<a href="/b1">B1</a></body></html>"#,
            long_paragraph("Fast")
        );
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(html_response(slow).set_delay(Duration::from_millis(400)))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(html_response(fast))
            .mount(&mock_server)
            .await;

        let batch = vec![
            format!("{}/a", mock_server.uri()),
            format!("{}/b", mock_server.uri()),
        ];
        let outcome = dispatcher(CrawlConfig::default().with_workers(2))
            .dispatch(batch.clone(), &base)
            .await;

        assert_eq!(
            outcome.links,
            vec![
                format!("{}/a1", mock_server.uri()),
                format!("{}/b1", mock_server.uri()),
            ]
        );
        let stored: Vec<&str> = outcome.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(stored, vec![batch[0].as_str(), batch[1].as_str()]);
    }

    #[tokio::test]
    async fn test_batch_runs_concurrently() {
        let mock_server = MockServer::start().await;
        let base = validator::base_domain_of(&mock_server.uri()).unwrap();

        for i in 0..4 {
            Mock::given(method("GET"))
                .and(path(format!("/p{}", i)))
                .respond_with(
                    html_response(long_paragraph("Parallel"))
                        .set_delay(Duration::from_millis(300)),
                )
                .mount(&mock_server)
                .await;
        }

        let batch: Vec<String> = (0..4)
            .map(|i| format!("{}/p{}", mock_server.uri(), i))
            .collect();
        let start = Instant::now();
        let outcome = dispatcher(CrawlConfig::default().with_workers(4))
            .dispatch(batch, &base)
            .await;

        assert_eq!(outcome.pages.len(), 4);
        // four sequential fetches would take at least 1.2s
        assert!(start.elapsed() < Duration::from_millis(1100));
    }
}
