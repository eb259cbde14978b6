//! URL normalization and decomposition

use serde::Serialize;
use thiserror::Error;
use tldextract::TldExtractor;
use url::Url;

/// Input that cannot be turned into scheme/host/path at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    #[error("URL is empty")]
    Empty,

    #[error("cannot parse URL '{url}': {reason}")]
    Unparsable { url: String, reason: String },

    #[error("URL '{0}' has no host")]
    NoHost(String),
}

/// Registrable-domain split of a hostname
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainParts {
    pub subdomain: String,
    /// Registrable label without suffix ("example" in "a.example.co.uk")
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// "example.co.uk"; empty when there is no registrable domain
    pub fn registrable(&self) -> String {
        match (self.domain.is_empty(), self.suffix.is_empty()) {
            (false, false) => format!("{}.{}", self.domain, self.suffix),
            (false, true) => self.domain.clone(),
            _ => String::new(),
        }
    }
}

/// A URL as the extractor sees it
#[derive(Debug, Clone)]
pub struct ParsedUrl {
    /// Trimmed input, scheme-prefixed if needed; lexical features run on this
    pub raw: String,
    pub url: Url,
    pub hostname: String,
    pub path: String,
    pub query: Option<String>,
    pub domain: DomainParts,
}

impl ParsedUrl {
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }
}

/// Trim and, when asked, prefix `http://` to scheme-less input
pub fn normalize(input: &str, assume_http: bool) -> Result<String, MalformedInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MalformedInputError::Empty);
    }

    if assume_http && !trimmed.contains("://") {
        Ok(format!("http://{}", trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse normalized input into its parts
pub fn parse(
    input: &str,
    assume_http: bool,
    extractor: &TldExtractor,
) -> Result<ParsedUrl, MalformedInputError> {
    let raw = normalize(input, assume_http)?;

    let url = Url::parse(&raw).map_err(|e| MalformedInputError::Unparsable {
        url: raw.clone(),
        reason: e.to_string(),
    })?;

    let parsed_host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(MalformedInputError::NoHost(raw)),
    };

    let (hostname, path, query) = match RawParts::split(&raw) {
        Some(parts) => {
            let host = parts.hostname();
            (
                if host.is_empty() { parsed_host } else { host },
                parts.path.to_string(),
                parts.query.map(str::to_string),
            )
        }
        None => (parsed_host, url.path().to_string(), url.query().map(str::to_string)),
    };

    let domain = split_domain(extractor, &url, &hostname);

    Ok(ParsedUrl {
        path,
        query,
        raw,
        url,
        hostname,
        domain,
    })
}

/// Components of `scheme://authority/path?query#fragment` exactly as written,
/// without percent-encoding, IDNA mapping or dot-segment removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawParts<'a> {
    authority: &'a str,
    path: &'a str,
    query: Option<&'a str>,
}

impl<'a> RawParts<'a> {
    fn split(raw: &'a str) -> Option<Self> {
        let (_, rest) = raw.split_once("://")?;

        let authority_end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);

        let tail = tail.split('#').next().unwrap_or("");
        let (path, query) = match tail.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (tail, None),
        };

        Some(Self { authority, path, query })
    }

    /// Lowercased host with userinfo, port and IPv6 brackets removed
    fn hostname(&self) -> String {
        let host_port = self.authority.rsplit_once('@').map_or(self.authority, |(_, h)| h);
        let host = match host_port.strip_prefix('[') {
            Some(bracketed) => bracketed.split(']').next().unwrap_or(""),
            None => host_port.split(':').next().unwrap_or(""),
        };
        host.to_lowercase()
    }
}

fn split_domain(extractor: &TldExtractor, url: &Url, hostname: &str) -> DomainParts {
    // IP literals have no registrable domain
    if matches!(url.host(), Some(url::Host::Ipv4(_)) | Some(url::Host::Ipv6(_))) {
        return DomainParts::default();
    }

    match extractor.extract(url.as_str()) {
        Ok(result) => DomainParts {
            subdomain: result.subdomain.unwrap_or_default(),
            domain: result.domain.unwrap_or_default(),
            suffix: result.suffix.unwrap_or_default(),
        },
        Err(e) => {
            log::debug!("Domain split failed for {}: {}", hostname, e);
            DomainParts::default()
        }
    }
}
