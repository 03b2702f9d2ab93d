//! Integer encoding of the categorical genotype target.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Maps genotype strings to integer class indices over a fitted, sorted
/// vocabulary. The encoder is fit once and applied unchanged to the other
/// partition; a value outside the fitted vocabulary is an error, never a
/// silent extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit the encoder on the distinct values of `labels`, sorted
    /// lexicographically.
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        LabelEncoder { classes }
    }

    /// Map each label to its class index, failing on any value absent from
    /// the fitted vocabulary.
    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| PipelineError::UnseenLabel(label.clone()).into())
            })
            .collect()
    }

    pub fn fit_transform(labels: &[String]) -> (Self, Vec<usize>) {
        let encoder = Self::fit(labels);
        let encoded = encoder
            .transform(labels)
            .expect("labels the encoder was fit on are always encodable");
        (encoder, encoded)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
