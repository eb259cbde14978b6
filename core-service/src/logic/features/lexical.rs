//! Lexical URL Features
//!
//! Pure string analysis over the normalized URL, its hostname and path.
//! No I/O; every function here is deterministic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::url_parts::ParsedUrl;

/// Keywords typical of credential-harvesting URLs
pub const PHISH_HINT_KEYWORDS: &[&str] = &["login", "update", "secure", "ebayisapi", "webscr"];

/// Maximal runs of non-word characters
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static regex"));

/// Unicode decimal digits, one match per character
static DECIMAL_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Nd}").expect("static regex"));

/// Non-empty word tokens of `text`
pub fn word_tokens(text: &str) -> Vec<&str> {
    NON_WORD.split(text).filter(|t| !t.is_empty()).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn digit_ratio(s: &str) -> f64 {
    let total = char_len(s);
    if total == 0 {
        return 0.0;
    }
    let digits = DECIMAL_DIGIT.find_iter(s).count();
    digits as f64 / total as f64
}

/// Length statistics over one token set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WordStats {
    pub count: usize,
    pub total_len: usize,
    pub longest: usize,
}

impl WordStats {
    pub fn of(text: &str) -> Self {
        word_tokens(text).into_iter().fold(Self::default(), |mut acc, token| {
            let len = char_len(token);
            acc.count += 1;
            acc.total_len += len;
            acc.longest = acc.longest.max(len);
            acc
        })
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_len as f64 / self.count as f64
        }
    }
}

/// The ten features computed without any lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalFeatures {
    pub shortest_word_host: u32,
    pub nb_www: u32,
    pub phish_hints: u8,
    pub ratio_digits_host: f64,
    pub longest_words_raw: u32,
    pub ratio_digits_url: f64,
    pub length_words_raw: u32,
    pub avg_word_path: f64,
    pub nb_qm: u32,
    pub nb_dots: u32,
}

impl LexicalFeatures {
    pub fn from_parsed(parsed: &ParsedUrl) -> Self {
        let url = parsed.raw.as_str();
        let host = parsed.hostname.as_str();
        let words = WordStats::of(url);

        Self {
            shortest_word_host: shortest_label(host) as u32,
            nb_www: url.matches("www").count() as u32,
            phish_hints: has_phish_hint(url) as u8,
            ratio_digits_host: digit_ratio(host),
            longest_words_raw: words.longest as u32,
            ratio_digits_url: digit_ratio(url),
            length_words_raw: words.total_len as u32,
            avg_word_path: WordStats::of(&parsed.path).mean(),
            nb_qm: url.matches('?').count() as u32,
            nb_dots: url.matches('.').count() as u32,
        }
    }
}

/// Shortest non-empty dot label; 0 for an empty host
pub fn shortest_label(host: &str) -> usize {
    host.split('.')
        .filter(|label| !label.is_empty())
        .map(char_len)
        .min()
        .unwrap_or(0)
}

pub fn has_phish_hint(url: &str) -> bool {
    let lower = url.to_lowercase();
    PHISH_HINT_KEYWORDS.iter().any(|k| lower.contains(k))
}
