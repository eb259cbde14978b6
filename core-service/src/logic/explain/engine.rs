//! Sampled permutation Shapley values
//!
//! Marginal contributions are taken along random feature orderings, moving a
//! background row towards the explained row one feature at a time. Each
//! ordering telescopes from `f(background)` to `f(x)`, so contributions sum to
//! `f(x) - mean f(background)` exactly.
//!
//! Every sampled ordering is paired with its reverse (antithetic sampling).
//! The generator is reseeded per call, repeated explanations are identical.

use std::cmp::Ordering;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::types::{describe, ExplainError, Explanation, FeatureContribution};
use crate::logic::config::ExplainConfig;
use crate::logic::model::{PhishingPipeline, Scores};

/// Background rows beyond this are ignored
pub const MAX_BACKGROUND_ROWS: usize = 64;

pub struct ShapleyExplainer {
    /// Background in the classifier input space
    background: Array2<f32>,
    base_value: f32,
    pairs: usize,
    seed: u64,
}

impl ShapleyExplainer {
    pub fn new(
        pipeline: &PhishingPipeline,
        background: &[Vec<f64>],
        config: &ExplainConfig,
    ) -> Result<Self, ExplainError> {
        if !config.enabled {
            return Err(ExplainError::Disabled);
        }
        if background.is_empty() {
            return Err(ExplainError::NoBackground);
        }

        let width = pipeline.columns().len();
        let mut rows = Vec::with_capacity(background.len().min(MAX_BACKGROUND_ROWS));
        for (i, row) in background.iter().take(MAX_BACKGROUND_ROWS).enumerate() {
            if row.len() != width {
                return Err(ExplainError::BackgroundShape { row: i, expected: width, found: row.len() });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ExplainError::NonFiniteBackground(i));
            }
            rows.push(row.iter().map(|&v| v as f32).collect::<Vec<f32>>());
        }

        let prepared = pipeline.prepare_batch(&rows)?;
        let probs = match pipeline.score_prepared(prepared.view())? {
            Scores::Probabilities(p) => p,
            Scores::Labels(_) => return Err(ExplainError::LabelOnly),
        };
        let base_value = probs.iter().sum::<f32>() / probs.len() as f32;

        log::debug!(
            "Explainer ready: {} background rows, base value {:.4}",
            rows.len(),
            base_value
        );

        Ok(Self {
            background: prepared,
            base_value,
            pairs: config.permutations.div_ceil(2).max(1),
            seed: config.seed,
        })
    }

    pub fn base_value(&self) -> f32 {
        self.base_value
    }

    pub fn background_rows(&self) -> usize {
        self.background.nrows()
    }

    /// Orderings sampled per explanation
    pub fn permutations(&self) -> usize {
        self.pairs * 2
    }

    /// Explain one raw row (artifact column order)
    pub fn explain(&self, pipeline: &PhishingPipeline, raw: &[f32]) -> Result<Explanation, ExplainError> {
        let width = pipeline.columns().len();
        if raw.len() != width {
            return Err(ExplainError::Inference(format!(
                "row has {} values, expected {}",
                raw.len(),
                width
            )));
        }
        let x = pipeline.prepare(raw);
        let orderings = self.orderings(width);

        // (ordering, background) → width + 1 points from background to x
        let steps = width + 1;
        let n_rows = orderings.len() * self.background.nrows() * steps;
        let mut data = Vec::with_capacity(n_rows * width);
        for order in &orderings {
            for bg in self.background.rows() {
                let mut z: Vec<f32> = bg.to_vec();
                data.extend_from_slice(&z);
                for &j in order {
                    z[j] = x[j];
                    data.extend_from_slice(&z);
                }
            }
        }
        let batch = Array2::from_shape_vec((n_rows, width), data)
            .map_err(|e| ExplainError::Inference(format!("Array error: {}", e)))?;

        let scores = match pipeline.score_prepared(batch.view())? {
            Scores::Probabilities(p) => p,
            Scores::Labels(_) => return Err(ExplainError::LabelOnly),
        };

        let mut phi = vec![0.0f64; width];
        let mut chains = scores.chunks(steps);
        for order in &orderings {
            for _ in 0..self.background.nrows() {
                let chain = chains
                    .next()
                    .ok_or_else(|| ExplainError::Inference("score batch too short".into()))?;
                for (k, &j) in order.iter().enumerate() {
                    phi[j] += (chain[k + 1] - chain[k]) as f64;
                }
            }
        }
        let samples = (orderings.len() * self.background.nrows()) as f64;
        let probability = scores.last().copied().unwrap_or(self.base_value);

        let mut contributions: Vec<FeatureContribution> = pipeline
            .columns()
            .iter()
            .zip(raw)
            .zip(&phi)
            .map(|((name, &value), &total)| FeatureContribution {
                name: name.clone(),
                value: value as f64,
                contribution: (total / samples) as f32,
                description: describe(name),
            })
            .collect();

        contributions.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(Ordering::Equal)
        });

        Ok(Explanation {
            base_value: self.base_value,
            probability,
            contributions,
            method: "permutation_shapley".to_string(),
            permutations: orderings.len(),
            background_rows: self.background.nrows(),
        })
    }

    fn orderings(&self, width: usize) -> Vec<Vec<usize>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::with_capacity(self.pairs * 2);
        for _ in 0..self.pairs {
            let mut order: Vec<usize> = (0..width).collect();
            order.shuffle(&mut rng);
            let reversed: Vec<usize> = order.iter().rev().copied().collect();
            out.push(order);
            out.push(reversed);
        }
        out
    }
}
