//! URL Feature Extractor
//!
//! Lexical features first (pure), then the three lookups concurrently, each
//! under its own deadline. Only an unusable URL fails the call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tldextract::{TldExtractor, TldOption};

use super::content::{self, ContentFeatures};
use super::lexical::LexicalFeatures;
use super::record::FeatureRecord;
use super::url_parts::{self, MalformedInputError, ParsedUrl};
use crate::logic::config::LookupConfig;
use crate::logic::external_intel::{
    best_effort, RetryPolicy, Signal, SignalError, SignalOutcome, SignalSources,
};

// ============================================================================
// FEATURE WRITER TRAIT
// ============================================================================

/// A group of features that knows its own column names
pub trait FeatureWriter {
    fn write(&self, record: &mut FeatureRecord);
}

impl FeatureWriter for LexicalFeatures {
    fn write(&self, record: &mut FeatureRecord) {
        record.set("shortest_word_host", self.shortest_word_host as f64);
        record.set("nb_www", self.nb_www as f64);
        record.set("phish_hints", self.phish_hints as f64);
        record.set("ratio_digits_host", self.ratio_digits_host);
        record.set("longest_words_raw", self.longest_words_raw as f64);
        record.set("ratio_digits_url", self.ratio_digits_url);
        record.set("length_words_raw", self.length_words_raw as f64);
        record.set("avg_word_path", self.avg_word_path);
        record.set("nb_qm", self.nb_qm as f64);
        record.set("nb_dots", self.nb_dots as f64);
    }
}

impl FeatureWriter for ContentFeatures {
    fn write(&self, record: &mut FeatureRecord) {
        record.set("domain_in_title", self.domain_in_title as f64);
        record.set("ratio_intHyperlinks", self.ratio_int_hyperlinks);
        record.set("page_rank", self.page_rank as f64);
        record.set("google_index", self.google_index as f64);
    }
}

// ============================================================================
// EXTRACTION RESULT
// ============================================================================

/// How each lookup ended for one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub signals: BTreeMap<Signal, SignalOutcome>,
}

impl ExtractionReport {
    /// Signals whose features carry fallback values
    pub fn degraded(&self) -> Vec<Signal> {
        self.signals
            .iter()
            .filter(|(_, outcome)| !outcome.is_ok())
            .map(|(signal, _)| *signal)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.degraded().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Normalized URL the features were computed on
    pub url: String,
    pub record: FeatureRecord,
    pub report: ExtractionReport,
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct FeatureExtractor {
    sources: SignalSources,
    policy: RetryPolicy,
    assume_http: bool,
    tld: TldExtractor,
}

impl FeatureExtractor {
    pub fn new(sources: SignalSources, config: &LookupConfig) -> Self {
        Self {
            sources,
            policy: RetryPolicy::from_config(config),
            assume_http: config.assume_http,
            tld: TldExtractor::new(TldOption::default()),
        }
    }

    /// Extractor backed by the real HTTP sources
    pub fn from_config(config: &LookupConfig) -> Result<Self, SignalError> {
        Ok(Self::new(SignalSources::http(config)?, config))
    }

    pub fn parse(&self, url: &str) -> Result<ParsedUrl, MalformedInputError> {
        url_parts::parse(url, self.assume_http, &self.tld)
    }

    /// Lexical features only; no network
    pub fn lexical(&self, url: &str) -> Result<LexicalFeatures, MalformedInputError> {
        Ok(LexicalFeatures::from_parsed(&self.parse(url)?))
    }

    pub async fn extract(&self, url: &str) -> Result<FeatureRecord, MalformedInputError> {
        Ok(self.extract_with_report(url).await?.record)
    }

    pub async fn extract_with_report(&self, url: &str) -> Result<Extraction, MalformedInputError> {
        let parsed = self.parse(url)?;
        let lexical = LexicalFeatures::from_parsed(&parsed);

        log::debug!("Extracting features for {} (host {})", parsed.raw, parsed.hostname);

        let page = best_effort(Signal::PageContent, self.policy, None, || async {
            self.sources.page.fetch_page(&parsed.url).await.map(Some)
        });
        let rank = best_effort(
            Signal::PageRank,
            self.policy,
            content::PAGE_RANK_FALLBACK,
            || self.sources.rank.page_rank(&parsed.hostname),
        );
        let index = best_effort(
            Signal::GoogleIndex,
            self.policy,
            content::GOOGLE_INDEX_FALLBACK,
            || self.sources.index.is_indexed(&parsed.raw),
        );

        let (page, rank, index) = tokio::join!(page, rank, index);

        let snapshot = page.value.as_ref();
        let content = ContentFeatures {
            domain_in_title: snapshot
                .map(|p| content::title_contains_domain(&parsed.domain.domain, p.title.as_deref()))
                .unwrap_or(content::DOMAIN_IN_TITLE_FALLBACK) as u8,
            ratio_int_hyperlinks: snapshot
                .and_then(|p| content::internal_link_ratio(&parsed.url, &p.hrefs))
                .unwrap_or(content::INT_HYPERLINKS_FALLBACK),
            page_rank: rank.value,
            google_index: index.value as u8,
        };

        let mut record = FeatureRecord::new();
        lexical.write(&mut record);
        content.write(&mut record);

        let mut report = ExtractionReport::default();
        report.signals.insert(Signal::PageContent, page.outcome);
        report.signals.insert(Signal::PageRank, rank.outcome);
        report.signals.insert(Signal::GoogleIndex, index.outcome);

        if !report.is_complete() {
            log::info!("Features for {} use fallbacks for: {:?}", parsed.raw, report.degraded());
        }

        Ok(Extraction { url: parsed.raw, record, report })
    }
}
