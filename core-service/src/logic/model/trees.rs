//! Native evaluator for XGBoost JSON tree dumps
//!
//! Format produced by `Booster.dump_model(fout, dump_format="json")`:
//! an array of trees, each a nested node object.
//!
//! `x < split_condition` → `yes`, NaN → `missing`, otherwise `no`.
//! `p = sigmoid(logit(base_score) + Σ leaf)`.

use std::collections::HashMap;
use std::path::Path;

use ndarray::ArrayView2;
use serde::Deserialize;

use super::inference::{InferenceError, ScoreModel, Scores};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpNode {
    Split {
        nodeid: usize,
        split: String,
        split_condition: f32,
        yes: usize,
        no: usize,
        missing: usize,
        #[serde(default)]
        children: Vec<DumpNode>,
    },
    Leaf {
        nodeid: usize,
        leaf: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f32),
}

/// One regression tree, nodes indexed by `nodeid`
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_dump(root: DumpNode, columns: &[String]) -> Result<Self, InferenceError> {
        let mut by_id: HashMap<usize, Node> = HashMap::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let (id, parsed) = match node {
                DumpNode::Leaf { nodeid, leaf } => (nodeid, Node::Leaf(leaf)),
                DumpNode::Split { nodeid, split, split_condition, yes, no, missing, children } => {
                    stack.extend(children);
                    let feature = resolve_feature(&split, columns)?;
                    (nodeid, Node::Split { feature, threshold: split_condition, yes, no, missing })
                }
            };
            if by_id.insert(id, parsed).is_some() {
                return Err(InferenceError(format!("duplicate tree node id {}", id)));
            }
        }

        let mut nodes = Vec::with_capacity(by_id.len());
        for id in 0..by_id.len() {
            let node = by_id
                .remove(&id)
                .ok_or_else(|| InferenceError(format!("tree node ids are not contiguous (missing {})", id)))?;
            nodes.push(node);
        }

        for node in &nodes {
            if let Node::Split { yes, no, missing, .. } = node {
                if [*yes, *no, *missing].iter().any(|&child| child >= nodes.len()) {
                    return Err(InferenceError("tree references an unknown child node".into()));
                }
            }
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, row: &[f32]) -> Result<f32, InferenceError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..=self.nodes.len() {
            match &self.nodes[index] {
                Node::Leaf(value) => return Ok(*value),
                Node::Split { feature, threshold, yes, no, missing } => {
                    let x = row[*feature];
                    index = if x.is_nan() {
                        *missing
                    } else if x < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
        Err(InferenceError("tree contains a cycle".into()))
    }
}

fn resolve_feature(split: &str, columns: &[String]) -> Result<usize, InferenceError> {
    if let Some(index) = columns.iter().position(|c| c == split) {
        return Ok(index);
    }
    split
        .strip_prefix('f')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|&i| i < columns.len())
        .ok_or_else(|| InferenceError(format!("unknown split feature '{}'", split)))
}

/// Gradient-boosted binary classifier (`binary:logistic`)
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    base_margin: f64,
    n_features: usize,
}

impl TreeEnsemble {
    pub fn from_json(json: &str, columns: &[String], base_score: f64) -> Result<Self, InferenceError> {
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(InferenceError(format!("base_score {} is not in (0, 1)", base_score)));
        }

        let dump: Vec<DumpNode> = serde_json::from_str(json)
            .map_err(|e| InferenceError(format!("Invalid tree dump: {}", e)))?;
        if dump.is_empty() {
            return Err(InferenceError("tree dump contains no trees".into()));
        }

        let trees = dump
            .into_iter()
            .map(|root| Tree::from_dump(root, columns))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_margin: (base_score / (1.0 - base_score)).ln(),
            n_features: columns.len(),
        })
    }

    pub fn load(path: &Path, columns: &[String], base_score: f64) -> Result<Self, InferenceError> {
        log::info!("Loading tree ensemble from: {}", path.display());
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError(format!("Failed to read {}: {}", path.display(), e)))?;
        let ensemble = Self::from_json(&json, columns, base_score)?;
        log::info!("Tree ensemble loaded ({} trees)", ensemble.tree_count());
        Ok(ensemble)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn margin(&self, row: &[f32]) -> Result<f64, InferenceError> {
        let mut margin = self.base_margin;
        for tree in &self.trees {
            margin += tree.leaf_value(row)? as f64;
        }
        Ok(margin)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ScoreModel for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }

    fn score(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError> {
        if rows.ncols() != self.n_features {
            return Err(InferenceError(format!(
                "input has {} columns, ensemble expects {}",
                rows.ncols(),
                self.n_features
            )));
        }

        let mut probs = Vec::with_capacity(rows.nrows());
        let mut buf = vec![0.0f32; self.n_features];
        for row in rows.rows() {
            for (dst, src) in buf.iter_mut().zip(row.iter()) {
                *dst = *src;
            }
            probs.push(sigmoid(self.margin(&buf)?) as f32);
        }
        Ok(Scores::Probabilities(probs))
    }
}
