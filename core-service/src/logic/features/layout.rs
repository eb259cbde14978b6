//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The trained pipeline was fit on exactly these columns in exactly this
//! order. A vector in any other order still scores, just meaninglessly.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//! 4. Any of the above → retrain and re-export the pipeline manifest

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    "phish_hints",           // 0: Suspicious keyword present in URL
    "domain_in_title",       // 1: Domain label appears in page title
    "length_words_raw",      // 2: Total length of URL word tokens
    "nb_www",                // 3: Occurrences of "www"
    "shortest_word_host",    // 4: Shortest hostname label
    "nb_qm",                 // 5: Count of '?'
    "ratio_digits_host",     // 6: Digit share of hostname
    "google_index",          // 7: Search index has the URL
    "nb_dots",               // 8: Count of '.'
    "longest_words_raw",     // 9: Longest URL word token
    "ratio_intHyperlinks",   // 10: Share of same-host anchors on page
    "page_rank",             // 11: Domain reputation rank
    "avg_word_path",         // 12: Mean token length in path
    "ratio_digits_url",      // 13: Digit share of whole URL
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 14;

// ============================================================================
// FEATURE KINDS
// ============================================================================

/// Value domain a column must stay within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// 0 or 1
    Flag,
    /// Non-negative integer
    Count,
    /// Real in [0, 1]
    Ratio,
    /// Non-negative real
    NonNegative,
}

impl FeatureKind {
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            FeatureKind::Flag => value == 0.0 || value == 1.0,
            FeatureKind::Count => value >= 0.0 && value.fract() == 0.0,
            FeatureKind::Ratio => (0.0..=1.0).contains(&value),
            FeatureKind::NonNegative => value >= 0.0,
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeatureKind::Flag => "flag (0 or 1)",
            FeatureKind::Count => "non-negative integer",
            FeatureKind::Ratio => "ratio in [0, 1]",
            FeatureKind::NonNegative => "non-negative number",
        };
        f.write_str(s)
    }
}

/// Kind of the feature at `index`, in layout order
pub const FEATURE_KINDS: [FeatureKind; FEATURE_COUNT] = [
    FeatureKind::Flag,        // phish_hints
    FeatureKind::Flag,        // domain_in_title
    FeatureKind::Count,       // length_words_raw
    FeatureKind::Count,       // nb_www
    FeatureKind::Count,       // shortest_word_host
    FeatureKind::Count,       // nb_qm
    FeatureKind::Ratio,       // ratio_digits_host
    FeatureKind::Flag,        // google_index
    FeatureKind::Count,       // nb_dots
    FeatureKind::Count,       // longest_words_raw
    FeatureKind::Ratio,       // ratio_intHyperlinks
    FeatureKind::Count,       // page_rank
    FeatureKind::NonNegative, // avg_word_path
    FeatureKind::Ratio,       // ratio_digits_url
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over a version byte and an ordered list of names
pub fn hash_layout<S: AsRef<str>>(version: u8, names: &[S]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the compiled-in layout
pub fn layout_hash() -> u32 {
    hash_layout(FEATURE_VERSION, FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

pub fn feature_kind(name: &str) -> Option<FeatureKind> {
    feature_index(name).map(|i| FEATURE_KINDS[i])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 14);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_KINDS.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_names_unique() {
        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            assert_eq!(feature_index(name), Some(i), "duplicate column {}", name);
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_layout_hash_is_order_sensitive() {
        let mut swapped: Vec<&str> = FEATURE_LAYOUT.to_vec();
        swapped.swap(0, 1);
        assert_ne!(hash_layout(FEATURE_VERSION, &swapped), layout_hash());
        assert_ne!(hash_layout(FEATURE_VERSION + 1, FEATURE_LAYOUT), layout_hash());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("phish_hints"), Some(0));
        assert_eq!(feature_index("ratio_intHyperlinks"), Some(10));
        assert_eq!(feature_index("ratio_digits_url"), Some(13));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("phish_hints"));
        assert_eq!(feature_name(11), Some("page_rank"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_feature_kinds() {
        assert_eq!(feature_kind("google_index"), Some(FeatureKind::Flag));
        assert_eq!(feature_kind("ratio_digits_host"), Some(FeatureKind::Ratio));
        assert!(FeatureKind::Flag.accepts(1.0));
        assert!(!FeatureKind::Flag.accepts(0.5));
        assert!(FeatureKind::Count.accepts(3.0));
        assert!(!FeatureKind::Count.accepts(-1.0));
        assert!(!FeatureKind::Count.accepts(2.5));
        assert!(!FeatureKind::Ratio.accepts(1.01));
        assert!(!FeatureKind::NonNegative.accepts(f64::NAN));
        assert!(!FeatureKind::Ratio.accepts(f64::INFINITY));
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
        assert_eq!(info.hash, layout_hash());
    }
}
