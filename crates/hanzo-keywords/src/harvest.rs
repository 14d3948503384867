//! Extracting organic result records from a rendered results page

use crate::browser::BrowsingSession;
use crate::config::HarvestConfig;
use crate::error::{KeywordError, Result};
use crate::text::collapse_whitespace;
use crate::types::SerpRecord;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Anything that can turn a page reference into result records
#[async_trait::async_trait]
pub trait Harvest: Send + Sync {
    async fn harvest(&self, reference: &str) -> Result<Vec<SerpRecord>>;
}

/// Compiled CSS selectors for one result-page layout
#[derive(Debug, Clone)]
pub struct SerpSelectors {
    container: Selector,
    title: Selector,
    link: Selector,
    snippets: Vec<Selector>,
    title_source: String,
    link_source: String,
}

impl SerpSelectors {
    pub fn compile(config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&config.container_selector)?,
            title: parse_selector(&config.title_selector)?,
            link: parse_selector(&config.link_selector)?,
            snippets: config
                .snippet_selectors
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
            title_source: config.title_selector.clone(),
            link_source: config.link_selector.clone(),
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| KeywordError::Selector(selector.to_string()))
}

fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Harvests result records through an open browsing session
pub struct PageHarvester<'a> {
    session: &'a dyn BrowsingSession,
    selectors: SerpSelectors,
    max_results: usize,
    debug_path: std::path::PathBuf,
    page_wait: Duration,
}

impl<'a> PageHarvester<'a> {
    pub fn new(session: &'a dyn BrowsingSession, config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            session,
            selectors: SerpSelectors::compile(config)?,
            max_results: config.max_results,
            debug_path: config.debug_path.clone(),
            page_wait: Duration::from_secs(config.page_wait_secs),
        })
    }

    /// Render `reference`, persist its markup, and extract up to `max_results` records
    pub async fn harvest_page(&self, reference: &str, max_results: usize) -> Result<Vec<SerpRecord>> {
        let page = self.session.render(reference).await?;

        if !self.page_wait.is_zero() {
            debug!(secs = self.page_wait.as_secs(), "waiting for page to settle");
            tokio::time::sleep(self.page_wait).await;
        }

        if let Err(e) = tokio::fs::write(&self.debug_path, &page.html).await {
            warn!(path = %self.debug_path.display(), error = %e, "failed to write page snapshot");
        }

        Ok(extract_records(&page.html, &page.url, &self.selectors, max_results))
    }
}

#[async_trait::async_trait]
impl Harvest for PageHarvester<'_> {
    async fn harvest(&self, reference: &str) -> Result<Vec<SerpRecord>> {
        self.harvest_page(reference, self.max_results).await
    }
}

/// Extract records from markup.
///
/// At most `max_results` containers are considered, in document order. A
/// container missing its title or link is skipped; the rest are still read.
pub fn extract_records(
    html: &str,
    base: &Url,
    selectors: &SerpSelectors,
    max_results: usize,
) -> Vec<SerpRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for (index, container) in document
        .select(&selectors.container)
        .take(max_results)
        .enumerate()
    {
        match extract_record(&container, base, selectors) {
            Ok(record) => records.push(record),
            Err(e) => debug!(index, error = %e, "skipping result container"),
        }
    }
    records
}

fn extract_record(container: &ElementRef, base: &Url, selectors: &SerpSelectors) -> Result<SerpRecord> {
    let title = container
        .select(&selectors.title)
        .next()
        .ok_or_else(|| KeywordError::MissingElement(selectors.title_source.clone()))?;
    let link = container
        .select(&selectors.link)
        .next()
        .ok_or_else(|| KeywordError::MissingElement(selectors.link_source.clone()))?;

    let link = link
        .value()
        .attr("href")
        .and_then(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_default();

    let snippet = selectors
        .snippets
        .iter()
        .find_map(|selector| container.select(selector).next())
        .map(|el| element_text(&el))
        .unwrap_or_default();

    Ok(SerpRecord {
        title: element_text(&title),
        link,
        snippet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::RenderedPage;

    const SERP: &str = r#"
    <html><body><div id="search">
      <div class="g"><div class="tF2Cxc">
        <div class="yuRUbf"><a href="https://example.com/cats"><h3>All About   Cats</h3></a></div>
        <div class="VwiC3b">Cats are <em>great</em> pets.</div>
      </div></div>
      <div class="g"><div class="tF2Cxc">
        <div class="yuRUbf"><a href="/url?q=dogs"><h3>Dogs</h3></a></div>
        <div class="IsZvec">Dogs need food.</div>
      </div></div>
      <div class="g"><div class="tF2Cxc">
        <div class="yuRUbf"><a href="https://example.com/no-title">untitled</a></div>
      </div></div>
      <div class="g"><div class="tF2Cxc">
        <h3>Birds</h3>
        <div class="yuRUbf"><a href="https://example.com/birds">birds</a></div>
      </div></div>
      <div class="g"><div class="tF2Cxc">
        <h3>Fish</h3><div class="yuRUbf"><a href="https://example.com/fish">fish</a></div>
      </div></div>
      <div class="g"><div class="tF2Cxc">
        <h3>Hamsters</h3><div class="yuRUbf"><a href="https://example.com/hamsters">h</a></div>
      </div></div>
    </div></body></html>
    "#;

    fn selectors() -> SerpSelectors {
        SerpSelectors::compile(&HarvestConfig::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://www.google.com/search?q=pets").unwrap()
    }

    #[test]
    fn test_extracts_records_in_document_order() {
        let records = extract_records(SERP, &base(), &selectors(), 5);

        // third container has no title and is skipped; hamsters is the sixth
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].title, "All About Cats");
        assert_eq!(records[0].link, "https://example.com/cats");
        assert_eq!(records[0].snippet, "Cats are great pets.");
        assert_eq!(records[3].title, "Fish");
    }

    #[test]
    fn test_snippet_falls_back_then_defaults_to_empty() {
        let records = extract_records(SERP, &base(), &selectors(), 5);
        assert_eq!(records[1].snippet, "Dogs need food.");
        assert_eq!(records[2].snippet, "");
    }

    #[test]
    fn test_relative_links_resolve_against_page() {
        let records = extract_records(SERP, &base(), &selectors(), 2);
        assert_eq!(records[1].link, "https://www.google.com/url?q=dogs");
    }

    #[test]
    fn test_missing_href_gives_empty_link() {
        let html = r#"<div class="tF2Cxc"><h3>T</h3><div class="yuRUbf"><a>no href</a></div></div>"#;
        let records = extract_records(html, &base(), &selectors(), 5);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, "");
    }

    #[test]
    fn test_no_containers_is_empty_not_error() {
        let records = extract_records("<html><body><p>captcha</p></body></html>", &base(), &selectors(), 5);
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let config = HarvestConfig {
            container_selector: "div[".to_string(),
            ..Default::default()
        };
        assert!(matches!(SerpSelectors::compile(&config), Err(KeywordError::Selector(_))));
    }

    struct StaticSession {
        html: &'static str,
    }

    #[async_trait::async_trait]
    impl BrowsingSession for StaticSession {
        async fn render(&self, reference: &str) -> Result<RenderedPage> {
            Ok(RenderedPage {
                url: Url::parse(reference)?,
                html: self.html.to_string(),
            })
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_harvest_writes_snapshot_and_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarvestConfig {
            max_results: 2,
            debug_path: dir.path().join("last_serp.html"),
            ..Default::default()
        };
        let session = StaticSession { html: SERP };
        let harvester = PageHarvester::new(&session, &config).unwrap();

        let records = harvester.harvest("https://www.google.com/search?q=pets").await.unwrap();
        assert_eq!(records.len(), 2);

        let snapshot = std::fs::read_to_string(dir.path().join("last_serp.html")).unwrap();
        assert_eq!(snapshot, SERP);
    }

    #[tokio::test]
    async fn test_render_failure_propagates() {
        let session = StaticSession { html: SERP };
        let config = HarvestConfig {
            debug_path: tempfile::tempdir().unwrap().path().join("never.html"),
            ..Default::default()
        };
        let harvester = PageHarvester::new(&session, &config).unwrap();
        assert!(harvester.harvest("not a url").await.is_err());
    }
}
