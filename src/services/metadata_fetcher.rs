//! Page metadata scraping for Linkshelf.
//!
//! Fetches a page, pulls a title and favicon out of its `<head>`, and falls
//! back to a hostname-keyed favicon service whenever anything goes wrong.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::services::url_normalizer;
use crate::types::errors::MetadataError;
use crate::types::metadata::PageMetadata;
use crate::types::settings::MetadataSettings;

const TITLE_SELECTORS: [&str; 2] = [
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
];

const ICON_SELECTORS: [&str; 3] = [
    r#"link[rel="icon"]"#,
    r#"link[rel="shortcut icon"]"#,
    r#"link[rel="apple-touch-icon"]"#,
];

/// Trait defining metadata lookup. Implementations never fail outward.
#[async_trait]
pub trait MetadataFetcherTrait: Send + Sync {
    async fn fetch_metadata(&self, url: &str) -> PageMetadata;
}

/// Metadata fetcher backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct MetadataFetcher {
    http: Client,
    favicon_service_url: String,
}

impl MetadataFetcher {
    /// Builds a fetcher with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    /// Returns `MetadataError::Request` if the TLS backend cannot be initialised.
    pub fn new(settings: &MetadataSettings) -> Result<Self, MetadataError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            favicon_service_url: settings.favicon_service_url.clone(),
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<PageMetadata, MetadataError> {
        let page_url = Url::parse(url).map_err(|_| MetadataError::InvalidUrl(url.to_string()))?;
        let response = self
            .http
            .get(page_url.clone())
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;
        Ok(extract_metadata(&html, &page_url, &self.favicon_service_url))
    }
}

#[async_trait]
impl MetadataFetcherTrait for MetadataFetcher {
    async fn fetch_metadata(&self, url: &str) -> PageMetadata {
        match self.try_fetch(url).await {
            Ok(metadata) => {
                debug!(%url, title = %metadata.title, favicon = %metadata.favicon, "fetched page metadata");
                metadata
            }
            Err(err) => {
                warn!(%url, error = %err, "metadata fetch failed, using favicon fallback");
                PageMetadata {
                    title: String::new(),
                    favicon: fallback_favicon(&self.favicon_service_url, url),
                }
            }
        }
    }
}

/// Favicon-service URL for the host of `page_url`, or empty if it has no host.
pub fn fallback_favicon(favicon_service_url: &str, page_url: &str) -> String {
    url_normalizer::host_of(page_url)
        .map(|host| favicon_service_for_host(favicon_service_url, &host))
        .unwrap_or_default()
}

fn favicon_service_for_host(favicon_service_url: &str, host: &str) -> String {
    format!("{favicon_service_url}?domain={host}")
}

/// Extracts title and favicon from an already-fetched HTML document.
///
/// Title order: Open Graph, Twitter card, `<title>`. Favicon order:
/// `icon`, `shortcut icon`, `apple-touch-icon`, then the favicon service.
pub fn extract_metadata(html: &str, page_url: &Url, favicon_service_url: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    let host = page_url.host_str().unwrap_or_default();

    let title = TITLE_SELECTORS
        .iter()
        .find_map(|selector| first_attr(&document, selector, "content"))
        .or_else(|| title_text(&document))
        .unwrap_or_default()
        .trim()
        .to_string();

    let favicon = match ICON_SELECTORS
        .iter()
        .find_map(|selector| first_attr(&document, selector, "href"))
    {
        Some(href) => match page_url.join(&href) {
            Ok(resolved) if is_unreliable_icon_proxy(&resolved) => {
                favicon_service_for_host(favicon_service_url, host)
            }
            Ok(resolved) => resolved.to_string(),
            Err(_) => href,
        },
        None => favicon_service_for_host(favicon_service_url, host),
    };

    PageMetadata { title, favicon }
}

/// gstatic's versioned `faviconV2` endpoints (t0..t3 subdomains) are
/// unreliable when hot-linked.
fn is_unreliable_icon_proxy(icon: &Url) -> bool {
    icon.host_str()
        .is_some_and(|host| host.ends_with("gstatic.com"))
        && icon.path().contains("faviconV2")
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .filter(|value| !value.is_empty())
        .map(String::from)
}

fn title_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.is_empty())
}
