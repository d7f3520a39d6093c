//! Page loading: byte fetch, charset detection and decoding.
//!
//! netkeiba serves EUC-JP on most pages and UTF-8 on a few newer ones, so the
//! charset is sniffed from the bytes rather than trusted from headers.

use async_trait::async_trait;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use reqwest::Url;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ScrapeError;

/// Source of raw page bytes
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the body at `url`. A single attempt, no caching.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, ScrapeError>;
}

/// HTTP transport backed by reqwest
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, ScrapeError> {
        let transport = |e: reqwest::Error| ScrapeError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}

/// Decoded page ready for querying
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    text: String,
    encoding: &'static Encoding,
}

impl Page {
    /// Decode raw bytes fetched from `url`.
    pub fn from_bytes(url: Url, bytes: &[u8]) -> Result<Self, ScrapeError> {
        let (text, encoding) = decode_document(bytes);
        if text.trim().is_empty() {
            return Err(ScrapeError::Parse {
                url: url.to_string(),
                reason: "document is empty".to_string(),
            });
        }
        Ok(Self { url, text, encoding })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Parse into a selector-queryable tree.
    ///
    /// `Html` is not `Send`; callers parse, extract and drop it before awaiting.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.text)
    }

    /// Join a link found on this page against the page URL.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href.trim()).ok()
    }
}

/// Decode page bytes using the BOM if present, otherwise a chardetng guess.
pub fn decode_document(bytes: &[u8]) -> (String, &'static Encoding) {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        }
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("Malformed {} sequences replaced while decoding", used.name());
    }
    (text.into_owned(), used)
}

pub fn parse_url(url: &str) -> Result<Url, ScrapeError> {
    Url::parse(url.trim()).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Fetch and decode one page.
pub async fn load(source: &dyn PageSource, url: &Url) -> Result<Page, ScrapeError> {
    let bytes = source.fetch(url).await?;
    let page = Page::from_bytes(url.clone(), &bytes)?;
    debug!(
        "Loaded {} ({} bytes, {})",
        url,
        bytes.len(),
        page.encoding_name()
    );
    Ok(page)
}
