//! Decision trees and random forests
//!
//! Trees use the flat node arrays scikit-learn keeps in `tree_`:
//! node `i` is a leaf when `children_left[i] == -1`, otherwise the row goes
//! left iff `x[feature[i]] <= threshold[i]`. Leaf `value` holds class weights.

use serde::{Deserialize, Serialize};

use super::{check_input, InferenceError, Predictor};

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    pub fn validate(&self) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("decision tree has no nodes".into());
        }
        if [self.children_right.len(), self.feature.len(), self.threshold.len(), self.value.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err("decision tree node arrays differ in length".into());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                let [a, b] = self.value[node];
                if !(a.is_finite() && b.is_finite()) || a < 0.0 || b < 0.0 || a + b <= 0.0 {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }
            // Children always come after their parent, which also rules out cycles
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(format!("node {} has out-of-range children", node));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= self.n_features {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {} has a NaN threshold", node));
            }
        }
        Ok(())
    }

    fn leaf_for(&self, features: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Probabilities without the input check (the caller did it)
    fn leaf_proba(&self, features: &[f64]) -> [f64; 2] {
        let [a, b] = self.value[self.leaf_for(features)];
        let total = a + b;
        [a / total, b / total]
    }
}

impl Predictor for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        check_input(features, self.n_features)?;
        Ok(self.leaf_proba(features))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("random forest has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features != self.n_features {
                return Err(format!("tree {} was fitted on a different feature count", i));
            }
            tree.validate().map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Predictor for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        check_input(features, self.n_features)?;

        let sum = self.trees.iter().fold([0.0, 0.0], |acc, tree| {
            let [p0, p1] = tree.leaf_proba(features);
            [acc[0] + p0, acc[1] + p1]
        });
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}
