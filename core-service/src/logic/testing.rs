//! In-process stand-ins for the signal sources and the scoring model

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ndarray::ArrayView2;
use url::Url;

use crate::logic::config::LookupConfig;
use crate::logic::external_intel::{
    IndexSource, PageSnapshot, PageSource, RankSource, SignalError, SignalSources,
};
use crate::logic::features::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::model::{
    ArtifactManifest, ClassifierArtifact, ClassifierSpec, InferenceError, PowerTransformParams,
    ScalerParams, ScoreModel, Scores, MANIFEST_FORMAT_VERSION,
};

pub struct StaticPage {
    pub result: Result<PageSnapshot, SignalError>,
    pub delay: Duration,
}

#[async_trait]
impl PageSource for StaticPage {
    async fn fetch_page(&self, _url: &Url) -> Result<PageSnapshot, SignalError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

pub struct StaticRank {
    pub result: Result<u32, SignalError>,
    pub delay: Duration,
}

#[async_trait]
impl RankSource for StaticRank {
    async fn page_rank(&self, _host: &str) -> Result<u32, SignalError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

pub struct StaticIndex {
    pub result: Result<bool, SignalError>,
}

#[async_trait]
impl IndexSource for StaticIndex {
    async fn is_indexed(&self, _url: &str) -> Result<bool, SignalError> {
        self.result.clone()
    }
}

/// Page titled "Example Domain" with 4 of 5 anchors on the page host
pub fn example_page() -> PageSnapshot {
    PageSnapshot {
        title: Some("Example Domain".to_string()),
        hrefs: ["/a", "/b", "/c", "#top", "https://other.org/"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

pub fn healthy_sources() -> SignalSources {
    SignalSources::new(
        Arc::new(StaticPage { result: Ok(example_page()), delay: Duration::ZERO }),
        Arc::new(StaticRank { result: Ok(5), delay: Duration::ZERO }),
        Arc::new(StaticIndex { result: Ok(true) }),
    )
}

pub fn failing_sources() -> SignalSources {
    SignalSources::new(
        Arc::new(StaticPage {
            result: Err(SignalError::Network("dns error".into())),
            delay: Duration::ZERO,
        }),
        Arc::new(StaticRank { result: Err(SignalError::Status(500)), delay: Duration::ZERO }),
        Arc::new(StaticIndex { result: Err(SignalError::MissingCredentials) }),
    )
}

pub fn test_lookup_config() -> LookupConfig {
    LookupConfig::default().with_timeout(Duration::from_millis(200))
}

/// Identity stages over the extractor layout, three background rows
pub fn test_manifest(threshold: Option<f32>) -> ArtifactManifest {
    ArtifactManifest {
        format_version: MANIFEST_FORMAT_VERSION,
        feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        layout_hash: Some(layout_hash()),
        power_transform: PowerTransformParams { lambdas: vec![1.0; FEATURE_COUNT] },
        scaler: ScalerParams {
            center: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        },
        classifier: ClassifierSpec::TreeEnsemble {
            path: "<memory>".to_string(),
            base_score: 0.5,
            sha256: None,
        },
        background: vec![
            vec![0.0, 1.0, 25.0, 1.0, 3.0, 0.0, 0.0, 1.0, 2.0, 8.0, 0.9, 6.0, 4.0, 0.0],
            vec![1.0, 0.0, 60.0, 0.0, 2.0, 1.0, 0.1, 0.0, 4.0, 15.0, 0.2, 0.0, 6.5, 0.12],
            vec![0.0, 0.0, 40.0, 1.0, 3.0, 0.0, 0.0, 1.0, 3.0, 10.0, 1.0, 2.0, 5.0, 0.03],
        ],
        threshold,
    }
}

pub fn test_artifact(model: Box<dyn ScoreModel>) -> Arc<ClassifierArtifact> {
    test_artifact_with_threshold(model, None)
}

pub fn test_artifact_with_threshold(
    model: Box<dyn ScoreModel>,
    threshold: Option<f32>,
) -> Arc<ClassifierArtifact> {
    let artifact = ClassifierArtifact::from_manifest(test_manifest(threshold), model)
        .expect("test manifest is valid");
    Arc::new(artifact)
}

/// Same probability for every row
pub struct ConstantModel {
    pub probability: f32,
    pub calls: AtomicUsize,
}

impl ConstantModel {
    pub fn new(probability: f32) -> Self {
        Self { probability, calls: AtomicUsize::new(0) }
    }
}

impl ScoreModel for ConstantModel {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn score(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Scores::Probabilities(vec![self.probability; rows.nrows()]))
    }
}

/// sigmoid(bias + w·x)
pub struct LogisticModel {
    pub weights: Vec<f32>,
    pub bias: f32,
}

impl ScoreModel for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn score(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError> {
        let probs = rows
            .rows()
            .into_iter()
            .map(|row| {
                let z: f32 = self.bias + row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f32>();
                1.0 / (1.0 + (-z).exp())
            })
            .collect();
        Ok(Scores::Probabilities(probs))
    }
}

/// Hard labels only
pub struct LabelOnlyModel(pub i64);

impl ScoreModel for LabelOnlyModel {
    fn kind(&self) -> &'static str {
        "label_only"
    }

    fn score(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError> {
        Ok(Scores::Labels(vec![self.0; rows.nrows()]))
    }
}
