//! Fitted pre-classifier stages
//!
//! Parameters come from the training run and are never refit here:
//! - Yeo-Johnson power transform (no standardization)
//! - Robust scaler: `(x - median) / IQR`

use serde::{Deserialize, Serialize};

/// Per-column Yeo-Johnson transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerTransform {
    lambdas: Vec<f64>,
}

impl PowerTransform {
    pub fn new(lambdas: Vec<f64>) -> Self {
        Self { lambdas }
    }

    /// λ = 1 leaves every value unchanged
    pub fn identity(columns: usize) -> Self {
        Self { lambdas: vec![1.0; columns] }
    }

    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }

    pub fn len(&self) -> usize {
        self.lambdas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lambdas.is_empty()
    }

    pub fn apply(&self, row: &mut [f32]) {
        for (x, &lambda) in row.iter_mut().zip(&self.lambdas) {
            *x = yeo_johnson(*x as f64, lambda) as f32;
        }
    }
}

pub fn yeo_johnson(x: f64, lambda: f64) -> f64 {
    let eps = f64::EPSILON;
    if x >= 0.0 {
        if lambda.abs() < eps {
            x.ln_1p()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else if (lambda - 2.0).abs() > eps {
        -((-x + 1.0).powf(2.0 - lambda) - 1.0) / (2.0 - lambda)
    } else {
        -(-x).ln_1p()
    }
}

/// Per-column centering and scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl RobustScaler {
    /// Zero scales are treated as 1
    pub fn new(center: Vec<f64>, scale: Vec<f64>) -> Self {
        let scale = scale.into_iter().map(|s| if s == 0.0 { 1.0 } else { s }).collect();
        Self { center, scale }
    }

    pub fn identity(columns: usize) -> Self {
        Self { center: vec![0.0; columns], scale: vec![1.0; columns] }
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn len(&self) -> usize {
        self.center.len().min(self.scale.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn apply(&self, row: &mut [f32]) {
        for ((x, &c), &s) in row.iter_mut().zip(&self.center).zip(&self.scale) {
            *x = ((*x as f64 - c) / s) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_yeo_johnson_identity_at_one() {
        for x in [-3.0, -0.5, 0.0, 0.25, 7.0] {
            assert!(close(yeo_johnson(x, 1.0), x), "x={}", x);
        }
    }

    #[test]
    fn test_yeo_johnson_log_branches() {
        assert!(close(yeo_johnson(std::f64::consts::E - 1.0, 0.0), 1.0));
        assert!(close(yeo_johnson(-(std::f64::consts::E - 1.0), 2.0), -1.0));
    }

    #[test]
    fn test_yeo_johnson_power_branches() {
        // ((3 + 1)^0.5 - 1) / 0.5 = 2
        assert!(close(yeo_johnson(3.0, 0.5), 2.0));
        // -((3 + 1)^(2 - 1.5) - 1) / 0.5 = -2
        assert!(close(yeo_johnson(-3.0, 1.5), -2.0));
    }

    #[test]
    fn test_power_transform_apply() {
        let pt = PowerTransform::new(vec![1.0, 0.0]);
        let mut row = vec![4.0f32, 0.0];
        pt.apply(&mut row);
        assert_eq!(row, vec![4.0, 0.0]);
        assert_eq!(PowerTransform::identity(14).len(), 14);
    }

    #[test]
    fn test_robust_scaler() {
        let scaler = RobustScaler::new(vec![1.0, 2.0], vec![2.0, 0.0]);
        assert_eq!(scaler.scale(), &[2.0, 1.0]);

        let mut row = vec![5.0f32, 3.0];
        scaler.apply(&mut row);
        assert_eq!(row, vec![2.0, 1.0]);
    }
}
