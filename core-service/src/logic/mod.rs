//! Logic Module - Business Logic & Engines
//!
//! - `features/` - URL feature extraction (lexical + remote signals)
//! - `external_intel/` - page, PageRank and search-index lookups
//! - `model/` - pipeline artifact & inference (ONNX, native trees, threshold)
//! - `explain/` - per-feature attribution
//! - `detector` - the whole chain behind one call

pub mod config;
pub mod detector;
pub mod error;
pub mod explain;
pub mod external_intel;
pub mod features;
pub mod model;

#[cfg(test)]
pub mod testing;
