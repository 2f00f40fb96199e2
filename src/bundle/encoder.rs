//! Label encoder fitted at training time

use serde::{Deserialize, Serialize};

/// Maps categorical strings to the integer codes the model was trained on.
/// The code of a value is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Code for `value`, or `None` if it was never seen during fitting
    pub fn encode(&self, value: &str) -> Option<i64> {
        self.classes
            .iter()
            .position(|class| class == value)
            .map(|idx| idx as i64)
    }

    /// Duplicate classes would make codes ambiguous
    pub fn has_duplicates(&self) -> bool {
        self.classes
            .iter()
            .enumerate()
            .any(|(i, class)| self.classes[..i].contains(class))
    }
}
