//! ONNX Runtime backend
//!
//! Input `[N, F]` f32. Output selection:
//! - probability output `[N, 2]` → class-1 column, `[N, 1]` / `[N]` → as is
//! - otherwise the label output (i64) → label-only scores

use std::path::Path;

use ndarray::ArrayView2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::{InferenceError, ScoreModel, Scores};

pub struct OnnxModel {
    session: Mutex<Session>,
    probability_output: Option<String>,
    label_output: Option<String>,
}

impl OnnxModel {
    /// Load ONNX model từ file
    pub fn load(
        model_path: &Path,
        probability_output: Option<&str>,
        label_output: Option<&str>,
    ) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(InferenceError(format!("Model not found: {}", model_path.display())));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError(format!("Failed to load model: {}", e)))?;

        let has_output = |name: &str| session.outputs().iter().any(|o| o.name() == name);
        let probability_output = probability_output.filter(|n| has_output(n)).map(str::to_string);
        let label_output = label_output.filter(|n| has_output(n)).map(str::to_string);

        if probability_output.is_none() && label_output.is_none() {
            let names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();
            return Err(InferenceError(format!(
                "model has neither the probability nor the label output (outputs: {})",
                names.join(", ")
            )));
        }
        if probability_output.is_none() {
            log::warn!("ONNX model exposes labels only; predictions will carry no probability");
        }

        log::info!("ONNX model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            probability_output,
            label_output,
        })
    }

    pub fn has_probabilities(&self) -> bool {
        self.probability_output.is_some()
    }
}

impl ScoreModel for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn score(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError> {
        let n = rows.nrows();
        let input_tensor = Value::from_array(rows.to_owned())
            .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        if let Some(name) = &self.probability_output {
            let output = outputs
                .get(name.as_str())
                .ok_or_else(|| InferenceError(format!("No output '{}'", name)))?;
            let output_tensor = output
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;
            let data = output_tensor.1;

            if n == 0 {
                return Ok(Scores::Probabilities(Vec::new()));
            }
            let width = data.len() / n;
            if width == 0 || data.len() != width * n {
                return Err(InferenceError(format!(
                    "probability output has {} values for {} rows",
                    data.len(),
                    n
                )));
            }
            let column = if width >= 2 { 1 } else { 0 };
            let probs = (0..n).map(|i| data[i * width + column]).collect();
            return Ok(Scores::Probabilities(probs));
        }

        let name = self
            .label_output
            .as_deref()
            .ok_or_else(|| InferenceError("No output defined".to_string()))?;
        let output = outputs
            .get(name)
            .ok_or_else(|| InferenceError(format!("No output '{}'", name)))?;
        let output_tensor = output
            .try_extract_tensor::<i64>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;
        Ok(Scores::Labels(output_tensor.1.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let err = OnnxModel::load(Path::new("does/not/exist.onnx"), Some("probabilities"), None)
            .err()
            .unwrap();
        assert!(err.0.contains("Model not found"));
    }
}
