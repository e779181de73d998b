//! HTTP fetcher for element documentation pages.
//!
//! One GET per element, no retries and no caching. Every failure comes back
//! as an error for the caller to log and skip.

use reqwest::Client;
use scraper::Selector;
use tracing::{debug, instrument};

use elemdoc_shared::{ElemdocError, EnrichConfig, FetchedDoc, Result};

use crate::DocSource;
use crate::extract::{extract_text, parse_selector};

/// Fetches and flattens documentation pages from the configured site.
pub struct DocFetcher {
    config: EnrichConfig,
    client: Client,
    selector: Selector,
}

impl DocFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: EnrichConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ElemdocError::Network(format!("failed to build HTTP client: {e}")))?;

        let selector = parse_selector(&config.content_selector)?;

        Ok(Self {
            config,
            client,
            selector,
        })
    }

    /// The URL that will be requested for `element`.
    pub fn url_for(&self, element: &str) -> String {
        self.config.doc_url(element)
    }

    /// Fetch the page for `element` and extract its readable text.
    #[instrument(skip(self))]
    pub async fn fetch_doc(&self, element: &str) -> Result<FetchedDoc> {
        let url = self.url_for(element);
        debug!(%url, "fetching documentation page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ElemdocError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ElemdocError::Network(format!(
                "{url}: HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ElemdocError::Network(format!("{url}: body read failed: {e}")))?;

        let text = extract_text(&body, &self.selector)
            .map_err(|e| ElemdocError::extract(format!("{url}: {e}")))?;

        debug!(%url, chars = text.len(), "extracted documentation text");

        Ok(FetchedDoc { text, url })
    }
}

impl DocSource for DocFetcher {
    async fn fetch(&self, element: &str) -> Result<FetchedDoc> {
        self.fetch_doc(element).await
    }
}

#[cfg(test)]
mod fetcher_tests {
    use super::*;
    use elemdoc_shared::AppConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> EnrichConfig {
        let mut config = EnrichConfig::from(&AppConfig::default());
        config.url_template = format!("{}/Element/{{element}}", server.uri());
        config.request_delay = Duration::ZERO;
        config
    }

    #[tokio::test]
    async fn fetches_and_extracts_article() {
        let server = MockServer::start().await;
        let page = r#"<html><body>
            <header>MDN Web Docs</header>
            <article>
                <h1>&lt;nav&gt;: The Navigation Section element</h1>
                <p>Represents a section of a page.</p>
            </article>
        </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/Element/nav"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = DocFetcher::new(config_for(&server)).unwrap();
        let doc = fetcher.fetch("nav").await.unwrap();

        assert_eq!(doc.url, format!("{}/Element/nav", server.uri()));
        assert_eq!(
            doc.text,
            "<nav>: The Navigation Section element\nRepresents a section of a page."
        );

        // The browser User-Agent contains commas, so it is checked on the
        // recorded request rather than with a header matcher.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let user_agent = requests[0]
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok());
        assert_eq!(user_agent, Some(AppConfig::default().fetch.user_agent.as_str()));
    }

    #[tokio::test]
    async fn alias_changes_requested_path() {
        let server = MockServer::start().await;
        Mock::given(path("/Element/Heading_Elements"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<article><p>Headings</p></article>"),
            )
            .mount(&server)
            .await;

        let fetcher = DocFetcher::new(config_for(&server)).unwrap();
        let doc = fetcher.fetch("h1-h6").await.unwrap();
        assert!(doc.url.ends_with("/Element/Heading_Elements"));
        assert_eq!(doc.text, "Headings");
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(path("/Element/blink"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/Element/marquee"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = DocFetcher::new(config_for(&server)).unwrap();

        let err = fetcher.fetch("blink").await.unwrap_err();
        assert!(matches!(err, ElemdocError::Network(_)));
        assert!(err.to_string().contains("HTTP 404"));

        let err = fetcher.fetch("marquee").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn missing_article_is_extract_error() {
        let server = MockServer::start().await;
        Mock::given(path("/Element/div"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><main>x</main></body></html>"),
            )
            .mount(&server)
            .await;

        let fetcher = DocFetcher::new(config_for(&server)).unwrap();
        let err = fetcher.fetch("div").await.unwrap_err();
        assert!(matches!(err, ElemdocError::Extract { .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let mut config = EnrichConfig::from(&AppConfig::default());
        // Port 9 (discard) on loopback is not expected to accept HTTP.
        config.url_template = "http://127.0.0.1:9/Element/{element}".into();
        config.timeout = Duration::from_secs(2);

        let fetcher = DocFetcher::new(config).unwrap();
        let err = fetcher.fetch("p").await.unwrap_err();
        assert!(matches!(err, ElemdocError::Network(_)));
    }

    #[test]
    fn invalid_selector_rejected_at_construction() {
        let mut config = EnrichConfig::from(&AppConfig::default());
        config.content_selector = "<<".into();
        assert!(DocFetcher::new(config).is_err());
    }
}
