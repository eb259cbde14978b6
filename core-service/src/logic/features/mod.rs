//! Features Module - URL Feature Extraction Engine
//!
//! Tách logic trích xuất features khỏi inference.
//! - `layout` - the ordered column contract shared with the trained pipeline
//! - `lexical` - pure string features
//! - `content` - features derived from remote lookups
//! - `extractor` - runs both and assembles a [`FeatureRecord`]

pub mod content;
pub mod extractor;
pub mod layout;
pub mod lexical;
pub mod record;
pub mod url_parts;

#[cfg(test)]
mod tests;

// Re-export common types
pub use extractor::{Extraction, ExtractionReport, FeatureExtractor, FeatureWriter};
pub use layout::{
    feature_index, feature_name, layout_hash, FeatureKind, LayoutInfo, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use lexical::LexicalFeatures;
pub use record::{FeatureContractError, FeatureRecord};
pub use url_parts::{MalformedInputError, ParsedUrl};
