//! Search index presence via Google Custom Search
//!
//! A `site:<url>` query with at least one item means the URL is indexed.

use async_trait::async_trait;
use serde::Deserialize;

use super::types::SignalError;
use super::IndexSource;

#[derive(Debug, Deserialize)]
struct SearchApiResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

pub fn parse_index_presence(body: &str) -> Result<bool, SignalError> {
    let parsed: SearchApiResponse = serde_json::from_str(body)?;
    Ok(!parsed.items.is_empty())
}

pub struct GoogleIndexClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    engine_id: Option<String>,
}

impl GoogleIndexClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: Option<String>,
        engine_id: Option<String>,
    ) -> Self {
        Self { client, endpoint, api_key, engine_id }
    }
}

#[async_trait]
impl IndexSource for GoogleIndexClient {
    async fn is_indexed(&self, url: &str) -> Result<bool, SignalError> {
        let (key, cx) = match (self.api_key.as_deref(), self.engine_id.as_deref()) {
            (Some(key), Some(cx)) => (key, cx),
            _ => return Err(SignalError::MissingCredentials),
        };

        let query = format!("site:{}", url);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("key", key), ("cx", cx), ("q", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignalError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_index_presence(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_present() {
        let body = r#"{"kind":"customsearch#search","items":[{"link":"https://www.example.com/"}]}"#;
        assert!(parse_index_presence(body).unwrap());
    }

    #[test]
    fn test_no_items() {
        let body = r#"{"kind":"customsearch#search","searchInformation":{"totalResults":"0"}}"#;
        assert!(!parse_index_presence(body).unwrap());
        assert!(!parse_index_presence(r#"{"items":[]}"#).unwrap());
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(parse_index_presence("<html>"), Err(SignalError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_engine_id() {
        let client = GoogleIndexClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9".into(),
            Some("key".into()),
            None,
        );
        assert_eq!(client.is_indexed("https://example.com").await, Err(SignalError::MissingCredentials));
    }
}
