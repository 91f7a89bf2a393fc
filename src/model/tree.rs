//! Regression tree ensembles.
//!
//! Trees are stored structure-of-arrays: node `i` is described by the
//! `i`-th entry of each array, and node `0` is the root. A split node sends
//! a row left when `row[feature] < threshold` and right otherwise.
//!
//! Trees must pass [`RegressionTree::validate`] before they are used for
//! prediction; traversal relies on the tree being acyclic with in-bounds
//! children.

use std::fmt;

use super::{Estimator, PredictionFailure, predict_checked};
use crate::types::FeatureVector;

/// Index of a node within its tree.
pub type NodeId = u32;

/// Structural validation errors for [`RegressionTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// Parallel node arrays disagree in length.
    LengthMismatch { expected: usize, actual: usize },
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path (DAG) or due to a cycle.
    DuplicateVisit { node: NodeId },
    /// A cycle was detected during traversal.
    CycleDetected { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
    /// A split references a feature the ensemble was not fitted on.
    FeatureOutOfRange {
        node: NodeId,
        feature: u32,
        n_features: usize,
    },
    /// A threshold or leaf value is NaN or infinite.
    NonFiniteValue { node: NodeId },
}

impl fmt::Display for TreeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTree => write!(f, "tree has no nodes"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "node arrays disagree in length ({expected} vs {actual})")
            }
            Self::ChildOutOfBounds {
                node,
                side,
                child,
                n_nodes,
            } => write!(
                f,
                "node {node} has {side} child {child} outside of {n_nodes} nodes"
            ),
            Self::SelfLoop { node } => write!(f, "node {node} is its own child"),
            Self::DuplicateVisit { node } => write!(f, "node {node} is reachable twice"),
            Self::CycleDetected { node } => write!(f, "cycle through node {node}"),
            Self::UnreachableNode { node } => write!(f, "node {node} is unreachable"),
            Self::FeatureOutOfRange {
                node,
                feature,
                n_features,
            } => write!(
                f,
                "node {node} splits on feature {feature} but only {n_features} exist"
            ),
            Self::NonFiniteValue { node } => write!(f, "node {node} holds a non-finite value"),
        }
    }
}

impl std::error::Error for TreeValidationError {}

/// A single regression tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    split_features: Box<[u32]>,
    thresholds: Box<[f64]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f64]>,
}

impl RegressionTree {
    /// Create a tree from parallel arrays, one entry per node.
    ///
    /// Split fields of leaves and the leaf value of splits are ignored.
    pub fn new(
        split_features: Vec<u32>,
        thresholds: Vec<f64>,
        left_children: Vec<NodeId>,
        right_children: Vec<NodeId>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f64>,
    ) -> Self {
        Self {
            split_features: split_features.into_boxed_slice(),
            thresholds: thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
        }
    }

    /// A single-leaf tree.
    pub fn leaf(value: f64) -> Self {
        Self::new(vec![0], vec![0.0], vec![0], vec![0], vec![true], vec![value])
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    fn node(&self, idx: NodeId) -> usize {
        idx as usize
    }

    /// Check structure against the feature count of the ensemble.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        for len in [
            self.split_features.len(),
            self.thresholds.len(),
            self.left_children.len(),
            self.right_children.len(),
            self.leaf_values.len(),
        ] {
            if len != n_nodes {
                return Err(TreeValidationError::LengthMismatch {
                    expected: n_nodes,
                    actual: len,
                });
            }
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, u8)> = vec![(0, 0)];

        while let Some((node, phase)) = stack.pop() {
            let idx = self.node(node);
            if phase == 1 {
                color[idx] = 2;
                continue;
            }
            match color[idx] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node }),
                _ => return Err(TreeValidationError::DuplicateVisit { node }),
            }
            color[idx] = 1;
            stack.push((node, 1));

            if self.is_leaf[idx] {
                if !self.leaf_values[idx].is_finite() {
                    return Err(TreeValidationError::NonFiniteValue { node });
                }
                continue;
            }

            let feature = self.split_features[idx];
            if feature as usize >= n_features {
                return Err(TreeValidationError::FeatureOutOfRange {
                    node,
                    feature,
                    n_features,
                });
            }
            if !self.thresholds[idx].is_finite() {
                return Err(TreeValidationError::NonFiniteValue { node });
            }

            let left = self.left_children[idx];
            let right = self.right_children[idx];
            if left == node || right == node {
                return Err(TreeValidationError::SelfLoop { node });
            }
            for (side, child) in [("left", left), ("right", right)] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
            }

            stack.push((right, 0));
            stack.push((left, 0));
        }

        if let Some(node) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode {
                node: node as NodeId,
            });
        }

        Ok(())
    }

    /// Traverse from the root to a leaf and return its value.
    ///
    /// Only called on trees that passed [`RegressionTree::validate`].
    pub(crate) fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx: NodeId = 0;
        while !self.is_leaf[self.node(idx)] {
            let node = self.node(idx);
            let value = row
                .get(self.split_features[node] as usize)
                .copied()
                .unwrap_or(f64::NAN);
            // NaN compares false, so missing values go right.
            idx = if value < self.thresholds[node] {
                self.left_children[node]
            } else {
                self.right_children[node]
            };
        }
        self.leaf_values[self.node(idx)]
    }
}

/// Additive ensemble of regression trees: `base_score + sum(tree(x))`.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    base_score: f64,
    n_features: usize,
}

impl TreeEnsemble {
    /// Build an ensemble, validating every tree.
    pub fn new(
        trees: Vec<RegressionTree>,
        base_score: f64,
        n_features: usize,
    ) -> Result<Self, (usize, TreeValidationError)> {
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(n_features).map_err(|e| (i, e))?;
        }
        Ok(Self {
            trees,
            base_score,
            n_features,
        })
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}

impl Estimator for TreeEnsemble {
    fn describe(&self) -> String {
        format!(
            "tree_ensemble({} trees, {} features)",
            self.trees.len(),
            self.n_features
        )
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionFailure> {
        predict_checked(self.n_features, features, |row| {
            self.trees
                .iter()
                .fold(self.base_score, |acc, tree| acc + tree.predict_row(row))
        })
    }
}
