use serde::{Deserialize, Serialize};

use crate::models::logistic::LogisticParams;

/// Rule deciding which columns carry identifying/contextual information
/// rather than measurements. Supplied explicitly to every stage instead of
/// being inferred from naming conventions inside each stage.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MetadataRule {
    /// Columns whose name starts with the given prefix are metadata.
    Prefix(String),
    /// An enumerated set of metadata column names.
    Columns(Vec<String>),
}

impl MetadataRule {
    pub fn is_metadata(&self, name: &str) -> bool {
        match self {
            MetadataRule::Prefix(prefix) => name.starts_with(prefix.as_str()),
            MetadataRule::Columns(columns) => columns.iter().any(|c| c == name),
        }
    }
}

impl Default for MetadataRule {
    fn default() -> Self {
        MetadataRule::Prefix("Metadata_".to_string())
    }
}

/// Central configuration for a training run.
///
/// Every literal the pipeline depends on lives here: the seed threaded into
/// each sampling and splitting operation, the split fraction, the column
/// roles, and the classifier hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TrainConfig {
    /// Seed passed explicitly to every sampling and splitting operation.
    pub seed: u64,
    /// Fraction of the balanced dataset assigned to the train partition.
    pub train_frac: f64,
    /// Column holding the categorical genotype target.
    pub target_column: String,
    /// Secondary grouping column used for stratification (well).
    pub stratify_column: String,
    /// Name of the encoded integer label column added before fitting.
    pub label_column: String,
    /// Column injected to tag each row with its plate of origin.
    pub plate_column: String,
    /// Plate-of-origin values for the plate and its prime replicate.
    pub plate_labels: (String, String),
    /// Rule separating metadata columns from feature columns.
    pub metadata: MetadataRule,
    /// Logistic-regression hyper-parameters.
    pub logistic: LogisticParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            train_frac: 0.85,
            target_column: "Metadata_genotype".to_string(),
            stratify_column: "Metadata_Well".to_string(),
            label_column: "label".to_string(),
            plate_column: "Metadata_plate".to_string(),
            plate_labels: ("3".to_string(), "3p".to_string()),
            metadata: MetadataRule::default(),
            logistic: LogisticParams::default(),
        }
    }
}
