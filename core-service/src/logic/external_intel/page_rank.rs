//! OpenPageRank Integration
//!
//! Domain reputation keyed by hostname:
//! `GET <endpoint>?domains[]=<host>` with the key in the `API-OPR` header.

use async_trait::async_trait;
use serde::Deserialize;

use super::types::SignalError;
use super::RankSource;

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct OprApiResponse {
    #[serde(default)]
    response: Vec<OprDomainResult>,
}

#[derive(Debug, Deserialize)]
struct OprDomainResult {
    #[serde(default)]
    page_rank_integer: Option<u32>,
}

/// Rank of the first domain in an OpenPageRank response body
pub fn parse_page_rank(body: &str) -> Result<u32, SignalError> {
    let parsed: OprApiResponse = serde_json::from_str(body)?;
    let first = parsed
        .response
        .into_iter()
        .next()
        .ok_or_else(|| SignalError::Parse("empty response list".to_string()))?;

    // Unknown domains come back without a rank
    Ok(first.page_rank_integer.unwrap_or(0))
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct OpenPageRankClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenPageRankClient {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>) -> Self {
        Self { client, endpoint, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl RankSource for OpenPageRankClient {
    async fn page_rank(&self, host: &str) -> Result<u32, SignalError> {
        let api_key = self.api_key.as_deref().ok_or(SignalError::MissingCredentials)?;

        let response = self
            .client
            .get(&self.endpoint)
            .header("API-OPR", api_key)
            .query(&[("domains[]", host)])
            .send()
            .await?;

        match response.status().as_u16() {
            200..=299 => {}
            401 | 403 => {
                log::warn!("OpenPageRank rejected the configured API key");
                return Err(SignalError::Status(response.status().as_u16()));
            }
            code => return Err(SignalError::Status(code)),
        }

        let body = response.text().await?;
        parse_page_rank(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_domain() {
        let body = r#"{"status_code":200,"response":[{"status_code":200,"error":"",
            "page_rank_integer":5,"page_rank_decimal":5.14,"rank":"4798","domain":"example.com"}],
            "last_updated":"3rd Jan 2025"}"#;
        assert_eq!(parse_page_rank(body).unwrap(), 5);
    }

    #[test]
    fn test_parse_unknown_domain_is_zero() {
        let body = r#"{"status_code":200,"response":[{"status_code":404,"error":"Domain not found",
            "domain":"nope.invalid"}]}"#;
        assert_eq!(parse_page_rank(body).unwrap(), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_page_rank("not json"), Err(SignalError::Parse(_))));
        assert!(matches!(parse_page_rank(r#"{"response":[]}"#), Err(SignalError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let client = OpenPageRankClient::new(reqwest::Client::new(), "http://127.0.0.1:9".into(), None);
        assert!(!client.is_configured());
        assert_eq!(client.page_rank("example.com").await, Err(SignalError::MissingCredentials));
    }
}
