//! Feature Record - Core data structure for ML input
//!
//! **Named feature values with layout metadata**
//!
//! Values are keyed by column name so a record can be checked against the
//! column contract of whatever artifact scores it. The scoring row is only
//! ever built by walking the artifact's ordered names (see [`FeatureRecord::to_row`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::layout::{
    feature_kind, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, FeatureKind,
};

// ============================================================================
// CONTRACT ERRORS
// ============================================================================

/// A column that exists but holds a value outside its kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidColumn {
    pub name: String,
    pub value: f64,
    pub expected: FeatureKind,
}

/// Record does not match the columns the classifier was trained on
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureContractError {
    #[error("missing feature columns: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("unexpected feature columns: {}", .0.join(", "))]
    Unexpected(Vec<String>),

    #[error("invalid feature values: {}", describe_invalid(.0))]
    InvalidValue(Vec<InvalidColumn>),

    #[error("record layout v{found_version} ({found_hash:08x}) does not match v{expected_version} ({expected_hash:08x})")]
    Layout {
        expected_version: u8,
        expected_hash: u32,
        found_version: u8,
        found_hash: u32,
    },
}

fn describe_invalid(columns: &[InvalidColumn]) -> String {
    columns
        .iter()
        .map(|c| format!("{}={} (expected {})", c.name, c.value, c.expected))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// Versioned feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values by column name
    pub values: BTreeMap<String, f64>,
}

impl FeatureRecord {
    /// Empty record stamped with the current layout
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: BTreeMap::new(),
        }
    }

    /// Create from raw values in layout order
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        let mut record = Self::new();
        for (name, value) in FEATURE_LAYOUT.iter().zip(values) {
            record.values.insert(name.to_string(), value);
        }
        record
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in compiled-in layout order (`None` for absent columns)
    pub fn layout_values(&self) -> Vec<(&'static str, Option<f64>)> {
        FEATURE_LAYOUT.iter().map(|&name| (name, self.get(name))).collect()
    }

    /// Build the model input row in the order given by `columns`.
    ///
    /// Strict: every column must be present, no other column may be, and
    /// every value must fit the kind its column declares.
    pub fn to_row<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<f32>, FeatureContractError> {
        let missing: Vec<String> = columns
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| !self.values.contains_key(*c))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(FeatureContractError::Missing(missing));
        }

        let unexpected: Vec<String> = self
            .values
            .keys()
            .filter(|k| !columns.iter().any(|c| c.as_ref() == k.as_str()))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            return Err(FeatureContractError::Unexpected(unexpected));
        }

        let mut invalid = Vec::new();
        let mut row = Vec::with_capacity(columns.len());
        for column in columns {
            let name = column.as_ref();
            let value = self.values[name];
            let kind = feature_kind(name).unwrap_or(FeatureKind::NonNegative);
            if !kind.accepts(value) {
                invalid.push(InvalidColumn { name: name.to_string(), value, expected: kind });
            }
            row.push(value as f32);
        }

        if !invalid.is_empty() {
            return Err(FeatureContractError::InvalidValue(invalid));
        }

        Ok(row)
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": self.values,
        })
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureRecord {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// TESTS
// ============================================================================
