//! Project-root discovery and the fixed input/output paths of a run.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::PipelineError;

/// Walk upward from `start` until a directory containing a `.git` marker
/// directory is found. Fails with `PipelineError::RootNotFound` otherwise,
/// before any data I/O happens.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        if dir.join(".git").is_dir() {
            return Ok(dir.to_path_buf());
        }
    }
    Err(PipelineError::RootNotFound.into())
}

/// The four fixed input tables, resolved against the project root.
///
/// The feature-selected pair donates the common schema; the annotated pair
/// donates the rows that are actually combined and modeled.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub feature_selected: (PathBuf, PathBuf),
    pub annotated: (PathBuf, PathBuf),
}

impl InputPaths {
    pub fn resolve(root: &Path) -> Self {
        let features = root
            .join("nf1_painting_repo")
            .join("3.processing_features")
            .join("data");
        let selected = features.join("feature_selected_data");
        let annotated = features.join("annotated_data");
        Self {
            feature_selected: (
                selected.join("Plate_3_sc_norm_fs.parquet"),
                selected.join("Plate_3_prime_sc_norm_fs.parquet"),
            ),
            annotated: (
                annotated.join("Plate_3_sc.parquet"),
                annotated.join("Plate_3_prime_sc.parquet"),
            ),
        }
    }
}

/// The three fixed output artifacts, resolved against a data directory.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub model: PathBuf,
    pub encoder: PathBuf,
    pub test_set: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            model: data_dir.join("lr_model.json"),
            encoder: data_dir.join("label_encoder.json"),
            test_set: data_dir.join("test_set.json"),
        }
    }
}
