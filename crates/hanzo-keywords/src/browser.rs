//! Page rendering capability used by the harvester
//!
//! A [`Browser`] hands out one [`BrowsingSession`] per run. The session turns
//! an operator-supplied page reference into rendered markup and must be
//! closed on every exit path.

use crate::config::BrowserConfig;
use crate::error::{KeywordError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Rendered markup of a page, with the URL it was finally loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub url: Url,
    pub html: String,
}

/// Factory for browsing sessions
#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    /// Acquire the rendering resource; failure aborts the run
    async fn open(&self) -> Result<Box<dyn BrowsingSession>>;
}

/// An open rendering resource
#[async_trait::async_trait]
pub trait BrowsingSession: Send + Sync {
    /// Load and render the page behind `reference`
    async fn render(&self, reference: &str) -> Result<RenderedPage>;

    /// Release the resource
    async fn close(&self) -> Result<()>;
}

/// Parse an operator reference into a URL.
///
/// `http(s)://` and `file://` URLs are taken as-is. A scheme-less reference
/// that starts with a host name (`www.google.com/search?q=cats`) and is not an
/// existing file gets `https://`. Anything else is a path to a saved page.
pub fn parse_reference(reference: &str) -> Result<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(KeywordError::InvalidUrl("empty reference".to_string()));
    }
    match Url::parse(reference) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => Ok(url),
        Ok(url) if url.scheme().len() > 1 => Err(KeywordError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            url.scheme(),
            reference
        ))),
        // bare paths, including Windows drive letters parsed as a scheme
        _ => {
            let path = std::path::absolute(PathBuf::from(reference))?;
            if !path.exists() && looks_like_web_address(reference) {
                return Url::parse(&format!("https://{}", reference)).map_err(|e| {
                    KeywordError::InvalidUrl(format!("{} (read as a web address): {}", reference, e))
                });
            }
            Url::from_file_path(&path)
                .map_err(|_| KeywordError::InvalidUrl(reference.to_string()))
        }
    }
}

/// `www.` prefix, or a dotted host name followed by a path or query
fn looks_like_web_address(reference: &str) -> bool {
    let host = reference.split(['/', '?', '#']).next().unwrap_or_default();
    let labels: Vec<&str> = host.split('.').collect();
    let host_like = labels.len() >= 2
        && labels
            .iter()
            .all(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    host_like && (host.starts_with("www.") || reference.len() > host.len())
}

/// Browser that fetches pages over HTTP and reads saved pages from disk
pub struct HttpBrowser {
    config: BrowserConfig,
}

impl Default for HttpBrowser {
    fn default() -> Self {
        Self::new(BrowserConfig::default())
    }
}

impl HttpBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Browser for HttpBrowser {
    async fn open(&self) -> Result<Box<dyn BrowsingSession>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .redirect(if self.config.follow_redirects {
                reqwest::redirect::Policy::limited(self.config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            })
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| KeywordError::Browser(e.to_string()))?;

        debug!(timeout_secs = self.config.timeout_secs, "opened http browsing session");
        Ok(Box::new(HttpSession {
            client,
            timeout_secs: self.config.timeout_secs,
        }))
    }
}

/// Session over a shared HTTP client
pub struct HttpSession {
    client: Client,
    timeout_secs: u64,
}

impl HttpSession {
    /// Timeouts carry the configured ceiling, whichever phase hit it
    fn request_error(&self, err: reqwest::Error) -> KeywordError {
        if err.is_timeout() {
            KeywordError::Timeout(self.timeout_secs)
        } else {
            KeywordError::from(err)
        }
    }

    async fn fetch(&self, url: Url) -> Result<RenderedPage> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeywordError::Http {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| self.request_error(e))?;
        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }

    async fn read_saved(&self, url: Url) -> Result<RenderedPage> {
        let path = url
            .to_file_path()
            .map_err(|_| KeywordError::InvalidUrl(url.to_string()))?;
        let html = tokio::fs::read_to_string(&path).await?;
        Ok(RenderedPage { url, html })
    }
}

#[async_trait::async_trait]
impl BrowsingSession for HttpSession {
    async fn render(&self, reference: &str) -> Result<RenderedPage> {
        let url = parse_reference(reference)?;
        debug!(url = %url, "rendering page");
        if url.scheme() == "file" {
            self.read_saved(url).await
        } else {
            self.fetch(url).await
        }
    }

    async fn close(&self) -> Result<()> {
        debug!("closed http browsing session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{response, serve_once};

    #[test]
    fn test_parse_reference_accepts_urls() {
        let url = parse_reference(" https://www.google.com/search?q=cats ").unwrap();
        assert_eq!(url.host_str(), Some("www.google.com"));
        assert_eq!(url.query(), Some("q=cats"));
    }

    #[test]
    fn test_parse_reference_rejects_other_schemes() {
        assert!(matches!(
            parse_reference("ftp://example.com/results"),
            Err(KeywordError::InvalidUrl(_))
        ));
        assert!(parse_reference("   ").is_err());
    }

    #[test]
    fn test_parse_reference_treats_paths_as_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serp.html");
        let url = parse_reference(path.to_str().unwrap()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.to_file_path().unwrap(), path);
    }

    #[test]
    fn test_parse_reference_adds_scheme_to_web_addresses() {
        let url = parse_reference("www.google.com/search?q=cats").unwrap();
        assert_eq!(url.as_str(), "https://www.google.com/search?q=cats");

        let url = parse_reference("duckduckgo.com/?q=solar+energy").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("duckduckgo.com"));
    }

    #[test]
    fn test_parse_reference_keeps_bare_file_names_local() {
        assert_eq!(parse_reference("serp.html").unwrap().scheme(), "file");
        assert_eq!(parse_reference("saved/results.html").unwrap().scheme(), "file");
    }

    #[tokio::test]
    async fn test_fetch_returns_page_markup() {
        let server = serve_once(
            "/search?q=cats",
            response("200 OK", "<html><body>results</body></html>"),
            Duration::ZERO,
        )
        .await;
        let session = HttpBrowser::default().open().await.unwrap();

        let page = session.render(&server.url).await.unwrap();
        assert_eq!(page.html, "<html><body>results</body></html>");
        assert_eq!(page.url.path(), "/search");
        assert!(server.request().await.starts_with("GET /search?q=cats"));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_http_error() {
        let server = serve_once("/search", response("429 Too Many Requests", ""), Duration::ZERO).await;
        let session = HttpBrowser::default().open().await.unwrap();

        let result = session.render(&server.url).await;
        assert!(matches!(result, Err(KeywordError::Http { status: 429, .. })));
    }

    #[tokio::test]
    async fn test_stalled_body_reports_configured_timeout() {
        let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 100\r\n\r\n<html>";
        let server = serve_once("/search", head.to_string(), Duration::from_secs(3)).await;
        let browser = HttpBrowser::new(BrowserConfig {
            timeout_secs: 1,
            ..Default::default()
        });
        let session = browser.open().await.unwrap();

        let result = session.render(&server.url).await;
        assert!(matches!(result, Err(KeywordError::Timeout(1))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_session_reads_saved_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serp.html");
        std::fs::write(&path, "<html><body>saved</body></html>").unwrap();

        let session = HttpBrowser::default().open().await.unwrap();
        let page = session.render(path.to_str().unwrap()).await.unwrap();
        assert!(page.html.contains("saved"));
        assert_eq!(page.url.scheme(), "file");
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_saved_page_is_io_error() {
        let session = HttpBrowser::default().open().await.unwrap();
        let result = session.render("/definitely/not/here/serp.html").await;
        assert!(matches!(result, Err(KeywordError::Io(_))));
        session.close().await.unwrap();
    }
}
