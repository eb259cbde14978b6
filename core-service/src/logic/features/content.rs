//! Signal-derived Features
//!
//! The four features that depend on remote lookups, with their fallbacks.

use serde::{Deserialize, Serialize};
use url::Url;

/// `page_rank` when the reputation lookup fails
pub const PAGE_RANK_FALLBACK: u32 = 0;

/// `google_index` when the index lookup fails (treated as indexed)
pub const GOOGLE_INDEX_FALLBACK: bool = true;

/// `domain_in_title` when the page is unreachable or has no title
pub const DOMAIN_IN_TITLE_FALLBACK: bool = false;

/// `ratio_intHyperlinks` when the page is unreachable or has no anchors
pub const INT_HYPERLINKS_FALLBACK: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFeatures {
    pub domain_in_title: u8,
    pub ratio_int_hyperlinks: f64,
    pub page_rank: u32,
    pub google_index: u8,
}

impl ContentFeatures {
    /// Every lookup at its fallback
    pub fn fallback() -> Self {
        Self {
            domain_in_title: DOMAIN_IN_TITLE_FALLBACK as u8,
            ratio_int_hyperlinks: INT_HYPERLINKS_FALLBACK,
            page_rank: PAGE_RANK_FALLBACK,
            google_index: GOOGLE_INDEX_FALLBACK as u8,
        }
    }
}

/// Registrable domain label appears in the title, case-insensitively.
/// An empty label (IP hosts) never matches.
pub fn title_contains_domain(domain_label: &str, title: Option<&str>) -> bool {
    if domain_label.is_empty() {
        return false;
    }
    match title {
        Some(title) => title.to_lowercase().contains(&domain_label.to_lowercase()),
        None => DOMAIN_IN_TITLE_FALLBACK,
    }
}

/// Share of anchors whose resolved host equals the page host;
/// `None` when the page has no anchors.
///
/// Targets without a host (`mailto:`, `javascript:`, `tel:`) count as internal.
pub fn internal_link_ratio(page: &Url, hrefs: &[String]) -> Option<f64> {
    if hrefs.is_empty() {
        return None;
    }

    let page_host = page.host_str();
    let internal = hrefs
        .iter()
        .filter(|href| match page.join(href) {
            Ok(target) => match target.host_str() {
                Some(host) => Some(host) == page_host,
                None => true,
            },
            Err(_) => false,
        })
        .count();

    Some(internal as f64 / hrefs.len() as f64)
}
