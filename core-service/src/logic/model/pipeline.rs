//! Fitted pipeline: power transform → robust scaler → classifier

use std::fmt;

use ndarray::{Array2, ArrayView2};
use thiserror::Error;

use super::inference::{InferenceError, ScoreModel, Scores};
use super::transform::{PowerTransform, RobustScaler};

/// Stage parameter lists disagree with the column count
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stage '{stage}' has {found} parameters, expected {expected}")]
pub struct StageShapeError {
    pub stage: &'static str,
    pub expected: usize,
    pub found: usize,
}

pub struct PhishingPipeline {
    columns: Vec<String>,
    power: PowerTransform,
    scaler: RobustScaler,
    model: Box<dyn ScoreModel>,
}

impl fmt::Debug for PhishingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhishingPipeline")
            .field("columns", &self.columns)
            .field("power", &self.power)
            .field("scaler", &self.scaler)
            .field("model", &self.model.kind())
            .finish()
    }
}

impl PhishingPipeline {
    pub fn new(
        columns: Vec<String>,
        power: PowerTransform,
        scaler: RobustScaler,
        model: Box<dyn ScoreModel>,
    ) -> Result<Self, StageShapeError> {
        let expected = columns.len();
        if power.len() != expected {
            return Err(StageShapeError { stage: "power_transform", expected, found: power.len() });
        }
        if scaler.center().len() != expected {
            return Err(StageShapeError {
                stage: "scaler.center",
                expected,
                found: scaler.center().len(),
            });
        }
        if scaler.scale().len() != expected {
            return Err(StageShapeError {
                stage: "scaler.scale",
                expected,
                found: scaler.scale().len(),
            });
        }
        Ok(Self { columns, power, scaler, model })
    }

    /// Ordered input columns the classifier was trained on
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn power(&self) -> &PowerTransform {
        &self.power
    }

    pub fn scaler(&self) -> &RobustScaler {
        &self.scaler
    }

    pub fn model(&self) -> &dyn ScoreModel {
        self.model.as_ref()
    }

    /// Raw row → classifier input space
    pub fn prepare(&self, raw: &[f32]) -> Vec<f32> {
        let mut row = raw.to_vec();
        self.power.apply(&mut row);
        self.scaler.apply(&mut row);
        row
    }

    pub fn prepare_batch<R: AsRef<[f32]>>(&self, raw: &[R]) -> Result<Array2<f32>, InferenceError> {
        let width = self.columns.len();
        let mut data = Vec::with_capacity(raw.len() * width);
        for row in raw {
            let row = row.as_ref();
            if row.len() != width {
                return Err(InferenceError(format!(
                    "row has {} values, expected {}",
                    row.len(),
                    width
                )));
            }
            data.extend(self.prepare(row));
        }
        Array2::from_shape_vec((raw.len(), width), data)
            .map_err(|e| InferenceError(format!("Array error: {}", e)))
    }

    /// Score rows already in the classifier input space
    pub fn score_prepared(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError> {
        if rows.ncols() != self.columns.len() {
            return Err(InferenceError(format!(
                "input has {} columns, model expects {}",
                rows.ncols(),
                self.columns.len()
            )));
        }
        let scores = self.model.score(rows)?;
        if scores.len() != rows.nrows() {
            return Err(InferenceError(format!(
                "model returned {} scores for {} rows",
                scores.len(),
                rows.nrows()
            )));
        }
        Ok(scores)
    }

    /// Probabilities for prepared rows; fails for label-only classifiers
    pub fn probabilities(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<f32>, InferenceError> {
        match self.score_prepared(rows)? {
            Scores::Probabilities(p) => Ok(p),
            Scores::Labels(_) => Err(InferenceError(format!(
                "{} classifier exposes labels only",
                self.model.kind()
            ))),
        }
    }
}
