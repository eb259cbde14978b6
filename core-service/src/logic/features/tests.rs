//! Integration Tests for Feature Extraction
//!
//! Extractor + mocked signal sources, end to end.

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::logic::external_intel::{Signal, SignalError, SignalOutcome, SignalSources};
    use crate::logic::features::{
        FeatureExtractor, MalformedInputError, FEATURE_COUNT, FEATURE_LAYOUT,
    };
    use crate::logic::testing::{
        failing_sources, healthy_sources, test_lookup_config, StaticIndex, StaticPage, StaticRank,
    };

    fn extractor(sources: SignalSources) -> FeatureExtractor {
        FeatureExtractor::new(sources, &test_lookup_config())
    }

    /// Tất cả lookups thành công
    #[tokio::test]
    async fn test_extract_with_healthy_sources() {
        let extraction = extractor(healthy_sources())
            .extract_with_report("https://www.example.com")
            .await
            .unwrap();
        let record = &extraction.record;

        assert_eq!(record.len(), FEATURE_COUNT);
        for name in FEATURE_LAYOUT {
            assert!(record.get(name).is_some(), "missing {}", name);
        }

        assert_eq!(record.get("page_rank"), Some(5.0));
        assert_eq!(record.get("domain_in_title"), Some(1.0));
        assert_eq!(record.get("google_index"), Some(1.0));
        assert_eq!(record.get("ratio_intHyperlinks"), Some(0.8));
        assert_eq!(record.get("nb_www"), Some(1.0));
        assert_eq!(record.get("phish_hints"), Some(0.0));
        assert!(extraction.report.is_complete());
    }

    /// Mọi nguồn bên ngoài đều lỗi
    #[tokio::test]
    async fn test_extract_total_outage_uses_fallbacks() {
        let extraction = extractor(failing_sources())
            .extract_with_report("http://secure-login-update.example.com/webscr?x=1")
            .await
            .unwrap();
        let record = &extraction.record;

        assert_eq!(record.len(), FEATURE_COUNT);
        assert_eq!(record.get("page_rank"), Some(0.0));
        assert_eq!(record.get("google_index"), Some(1.0));
        assert_eq!(record.get("domain_in_title"), Some(0.0));
        assert_eq!(record.get("ratio_intHyperlinks"), Some(1.0));

        // Lexical features are unaffected
        assert_eq!(record.get("phish_hints"), Some(1.0));
        assert_eq!(record.get("nb_qm"), Some(1.0));
        assert_eq!(record.get("nb_www"), Some(0.0));
        assert!(record.get("nb_dots").unwrap() >= 2.0);

        let degraded = extraction.report.degraded();
        assert_eq!(degraded, vec![Signal::PageContent, Signal::PageRank, Signal::GoogleIndex]);
        assert!(matches!(
            extraction.report.signals[&Signal::GoogleIndex],
            SignalOutcome::Skipped { .. }
        ));
    }

    #[tokio::test]
    async fn test_extract_is_deterministic() {
        let ex = extractor(healthy_sources());
        let a = ex.extract("https://www.example.com/login?id=42").await.unwrap();
        let b = ex.extract("https://www.example.com/login?id=42").await.unwrap();

        assert_eq!(serde_json::to_vec(&a).unwrap(), serde_json::to_vec(&b).unwrap());
    }

    #[tokio::test]
    async fn test_slow_source_does_not_stall_others() {
        let sources = SignalSources::new(
            Arc::new(StaticPage {
                result: Ok(crate::logic::testing::example_page()),
                delay: Duration::from_millis(10),
            }),
            Arc::new(StaticRank { result: Ok(9), delay: Duration::from_secs(30) }),
            Arc::new(StaticIndex { result: Ok(false) }),
        );

        let started = Instant::now();
        let extraction = extractor(sources).extract_with_report("https://www.example.com").await.unwrap();

        // Bounded by the 200ms per-lookup deadline, not by the slow source
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(extraction.record.get("page_rank"), Some(0.0));
        assert_eq!(extraction.record.get("google_index"), Some(0.0));
        assert_eq!(extraction.record.get("domain_in_title"), Some(1.0));
        assert_eq!(extraction.report.signals[&Signal::PageRank], SignalOutcome::TimedOut);
        assert!(extraction.report.signals[&Signal::PageContent].is_ok());
    }

    #[tokio::test]
    async fn test_page_without_links_or_title() {
        let sources = SignalSources::new(
            Arc::new(StaticPage {
                result: Ok(Default::default()),
                delay: Duration::ZERO,
            }),
            Arc::new(StaticRank { result: Ok(3), delay: Duration::ZERO }),
            Arc::new(StaticIndex { result: Err(SignalError::Timeout) }),
        );

        let record = extractor(sources).extract("example.com").await.unwrap();
        assert_eq!(record.get("domain_in_title"), Some(0.0));
        assert_eq!(record.get("ratio_intHyperlinks"), Some(1.0));
        assert_eq!(record.get("page_rank"), Some(3.0));
    }

    #[tokio::test]
    async fn test_malformed_input_fails() {
        let ex = extractor(healthy_sources());
        assert_eq!(ex.extract("").await.unwrap_err(), MalformedInputError::Empty);
        assert!(ex.extract("http://").await.is_err());
    }

    #[tokio::test]
    async fn test_contract_row_from_extraction() {
        let record = extractor(failing_sources()).extract("https://example.com").await.unwrap();
        let row = record.to_row(FEATURE_LAYOUT).unwrap();
        assert_eq!(row.len(), FEATURE_COUNT);
    }
}
