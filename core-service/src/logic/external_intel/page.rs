//! Target page fetch
//!
//! One GET per extraction; the body is capped, parsed once, and reduced to
//! the title and anchor targets.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::types::{PageSnapshot, SignalError};
use super::PageSource;

pub struct HttpPageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpPageFetcher {
    pub fn new(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<PageSnapshot, SignalError> {
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignalError::Status(status.as_u16()));
        }

        let mut body = CappedBody::new(self.max_bytes);
        while let Some(chunk) = response.chunk().await? {
            if !body.push(&chunk) {
                log::debug!("Page body for {} truncated at {} bytes", url, self.max_bytes);
                break;
            }
        }

        Ok(parse_html(&body.to_text()))
    }
}

/// Response body accumulator that stops at `limit` bytes
#[derive(Debug)]
pub struct CappedBody {
    bytes: Vec<u8>,
    limit: usize,
}

impl CappedBody {
    pub fn new(limit: usize) -> Self {
        Self { bytes: Vec::new(), limit }
    }

    /// Append as much of `chunk` as fits; `false` once the limit is reached
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        let room = self.limit.saturating_sub(self.bytes.len());
        if chunk.len() >= room {
            self.bytes.extend_from_slice(&chunk[..room]);
            return false;
        }
        self.bytes.extend_from_slice(chunk);
        true
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Reduce an HTML document to a [`PageSnapshot`]
pub fn parse_html(html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let hrefs = match Selector::parse("a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| href.trim().to_string())
            .collect(),
        Err(_) => Vec::new(),
    };

    PageSnapshot { title, hrefs }
}
