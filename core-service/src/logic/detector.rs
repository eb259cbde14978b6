//! Phishing Detector - URL → features → prediction (+ explanation)

use serde::{Deserialize, Serialize};

use crate::logic::config::{LookupConfig, ModelConfig};
use crate::logic::error::PhishError;
use crate::logic::explain::Explanation;
use crate::logic::features::{Extraction, ExtractionReport, FeatureExtractor, FeatureRecord};
use crate::logic::model::{InferenceAdapter, Prediction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub url: String,
    pub prediction: Prediction,
    pub features: FeatureRecord,
    pub signals: ExtractionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
    /// Set when an explanation was requested but could not be produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_unavailable: Option<String>,
}

impl Verdict {
    pub fn is_phishing(&self) -> bool {
        self.prediction.label.is_phishing()
    }
}

pub struct PhishingDetector {
    extractor: FeatureExtractor,
    adapter: InferenceAdapter,
}

impl PhishingDetector {
    pub fn new(extractor: FeatureExtractor, adapter: InferenceAdapter) -> Self {
        Self { extractor, adapter }
    }

    /// HTTP-backed lookups + artifact from `model.manifest_path`
    pub fn from_config(lookup: &LookupConfig, model: &ModelConfig) -> Result<Self, PhishError> {
        let extractor = FeatureExtractor::from_config(lookup)?;
        let adapter = InferenceAdapter::load(model)?;
        Ok(Self::new(extractor, adapter))
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn adapter(&self) -> &InferenceAdapter {
        &self.adapter
    }

    pub async fn features(&self, url: &str) -> Result<Extraction, PhishError> {
        Ok(self.extractor.extract_with_report(url).await?)
    }

    pub async fn check(&self, url: &str, explain: bool) -> Result<Verdict, PhishError> {
        let extraction = self.features(url).await?;
        let prediction = self.adapter.classify(&extraction.record)?;

        let (explanation, explanation_unavailable) = if explain {
            match self.adapter.explain(&extraction.record) {
                Ok(e) => (Some(e), None),
                Err(e) => {
                    log::warn!("Explanation not available for {}: {}", extraction.url, e);
                    (None, Some(format!("explanation not available: {}", e)))
                }
            }
        } else {
            (None, None)
        };

        log::info!(
            "{} → {} (p={})",
            extraction.url,
            prediction.label,
            prediction
                .probability
                .map(|p| format!("{:.3}", p))
                .unwrap_or_else(|| "n/a".to_string())
        );

        Ok(Verdict {
            url: extraction.url,
            prediction,
            features: extraction.record,
            signals: extraction.report,
            explanation,
            explanation_unavailable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::ExplainConfig;
    use crate::logic::external_intel::SignalSources;
    use crate::logic::model::{Label, ScoreModel};
    use crate::logic::testing::{
        failing_sources, healthy_sources, test_artifact, test_lookup_config, ConstantModel,
        LabelOnlyModel, LogisticModel,
    };

    fn detector(sources: SignalSources, model: Box<dyn ScoreModel>, config: &ModelConfig) -> PhishingDetector {
        let extractor = FeatureExtractor::new(sources, &test_lookup_config());
        let adapter = InferenceAdapter::new(test_artifact(model), config).unwrap();
        PhishingDetector::new(extractor, adapter)
    }

    #[tokio::test]
    async fn test_end_to_end_legitimate() {
        let d = detector(healthy_sources(), Box::new(ConstantModel::new(0.1)), &ModelConfig::default());
        let verdict = d.check("https://www.example.com", false).await.unwrap();

        assert_eq!(verdict.prediction.label, Label::Legitimate);
        assert_eq!(verdict.prediction.class, 0);
        assert_eq!(verdict.prediction.probability, Some(0.1));
        assert!(!verdict.is_phishing());

        assert_eq!(verdict.features.get("page_rank"), Some(5.0));
        assert_eq!(verdict.features.get("domain_in_title"), Some(1.0));
        assert_eq!(verdict.features.get("google_index"), Some(1.0));
        assert_eq!(verdict.features.get("ratio_intHyperlinks"), Some(0.8));
        assert!(verdict.explanation.is_none());
        assert!(verdict.explanation_unavailable.is_none());
    }

    #[tokio::test]
    async fn test_outage_still_classifies() {
        let d = detector(failing_sources(), Box::new(ConstantModel::new(0.9)), &ModelConfig::default());
        let verdict = d
            .check("http://secure-login-update.example.com/webscr?x=1", true)
            .await
            .unwrap();
        assert_eq!(verdict.prediction.label, Label::Phishing);
        assert_eq!(verdict.signals.degraded().len(), 3);
        assert!(verdict.explanation.is_some());
    }

    #[tokio::test]
    async fn test_explanation_attached() {
        let weights = vec![0.9, -0.4, 0.01, -0.3, 0.1, 0.5, 0.7, -0.8, 0.2, 0.02, -0.6, -0.15, 0.05, 0.6];
        let d = detector(
            healthy_sources(),
            Box::new(LogisticModel { weights, bias: -0.2 }),
            &ModelConfig::default(),
        );
        let verdict = d.check("https://www.example.com/login", true).await.unwrap();
        let explanation = verdict.explanation.unwrap();
        let probability = verdict.prediction.probability.unwrap();
        assert!((explanation.total() - (probability - explanation.base_value)).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_explanation_unavailable_is_not_fatal() {
        let d = detector(healthy_sources(), Box::new(LabelOnlyModel(0)), &ModelConfig::default());
        let verdict = d.check("https://www.example.com", true).await.unwrap();
        assert_eq!(verdict.prediction.label, Label::Legitimate);
        assert!(verdict.explanation.is_none());
        assert!(verdict
            .explanation_unavailable
            .as_deref()
            .unwrap()
            .starts_with("explanation not available"));

        let config = ModelConfig {
            explain: ExplainConfig { enabled: false, ..ExplainConfig::default() },
            ..ModelConfig::default()
        };
        let d = detector(healthy_sources(), Box::new(ConstantModel::new(0.2)), &config);
        let verdict = d.check("https://www.example.com", true).await.unwrap();
        assert!(verdict.explanation_unavailable.is_some());
    }

    #[tokio::test]
    async fn test_malformed_url_surfaces() {
        let d = detector(healthy_sources(), Box::new(ConstantModel::new(0.1)), &ModelConfig::default());
        let err = d.check("   ", false).await.unwrap_err();
        assert!(matches!(err, PhishError::MalformedInput(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_verdict_serializes() {
        let d = detector(healthy_sources(), Box::new(ConstantModel::new(0.1)), &ModelConfig::default());
        let verdict = d.check("https://www.example.com", false).await.unwrap();
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["prediction"]["label"], "legitimate");
        assert_eq!(json["prediction"]["class"], 0);
        assert!(json.get("explanation").is_none());
        assert_eq!(json["signals"]["signals"]["page_rank"]["status"], "ok");
    }
}
