//! The end-to-end training pipeline.
//!
//! A single linear run: locate the project root, load the plate tables,
//! align them to the common schema, normalize, balance, split, encode,
//! fit, and persist the three artifacts. Every stage is blocking; the run
//! completes or fails outright with no partial-result recovery.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::TrainConfig;
use crate::encoding::LabelEncoder;
use crate::io::parquet::read_feature_table;
use crate::models::logistic::OvrLogisticRegression;
use crate::paths::{find_project_root, InputPaths, OutputPaths};
use crate::preprocessing;
use crate::sampling;
use crate::table::{align_plates, FeatureTable};

/// Everything a finished run produced, returned for inspection by callers
/// and tests; the same values are persisted to the output paths.
pub struct TrainedArtifacts {
    pub model: OvrLogisticRegression,
    pub encoder: LabelEncoder,
    pub test_set: FeatureTable,
}

/// Discover the project root from the working directory and run the
/// pipeline with the fixed input/output paths.
pub fn run(config: &TrainConfig) -> Result<TrainedArtifacts> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let root = find_project_root(&cwd)?;
    log::info!("Project root: {}", root.display());

    let inputs = InputPaths::resolve(&root);
    let outputs = OutputPaths::in_dir(Path::new("data"));
    run_with_paths(config, &inputs, &outputs)
}

/// Run the full pipeline against explicit input/output paths.
pub fn run_with_paths(
    config: &TrainConfig,
    inputs: &InputPaths,
    outputs: &OutputPaths,
) -> Result<TrainedArtifacts> {
    let schema_a = read_feature_table(&inputs.feature_selected.0)?;
    let schema_b = read_feature_table(&inputs.feature_selected.1)?;
    let data_a = read_feature_table(&inputs.annotated.0)?;
    let data_b = read_feature_table(&inputs.annotated.1)?;

    let mut combined = align_plates(
        &schema_a,
        &schema_b,
        &data_a,
        &data_b,
        &config.plate_column,
        (&config.plate_labels.0, &config.plate_labels.1),
    )?;
    log::info!(
        "Combined plates: {} rows x {} columns",
        combined.nrows(),
        combined.ncols()
    );

    preprocessing::fit_transform(&mut combined, &config.metadata)?;
    log::info!("Normalized {} feature columns", combined.feature_names(&config.metadata).len());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let balanced = sampling::balance_classes(
        &combined,
        &config.target_column,
        &config.stratify_column,
        &mut rng,
    )?;
    log::info!("Balanced dataset: {} rows", balanced.nrows());

    let (train, test) = sampling::train_test_split(
        &balanced,
        &config.target_column,
        &config.stratify_column,
        config.train_frac,
        &mut rng,
    )?;
    log::info!("Split: {} train rows, {} test rows", train.nrows(), test.nrows());

    // The encoder is fit on the test partition first and applied unchanged
    // to the train partition; a train-only genotype is a fatal error.
    let encoder = LabelEncoder::fit(test.str_column(&config.target_column)?);
    let test_labels = encoder.transform(test.str_column(&config.target_column)?)?;
    let train_labels = encoder.transform(train.str_column(&config.target_column)?)?;

    let mut train = train.drop_metadata(&config.metadata, &[]);
    let mut test = test.drop_metadata(&config.metadata, &[config.target_column.as_str()]);
    train.push_float_column(
        &config.label_column,
        train_labels.iter().map(|&v| v as f64).collect(),
    )?;
    test.push_float_column(
        &config.label_column,
        test_labels.iter().map(|&v| v as f64).collect(),
    )?;

    let x = train.numeric_matrix(&[config.label_column.as_str()])?;
    let model = OvrLogisticRegression::fit(&x, &train_labels, &config.logistic)?;

    persist(&model, &encoder, &test, outputs)?;

    Ok(TrainedArtifacts {
        model,
        encoder,
        test_set: test,
    })
}

fn persist(
    model: &OvrLogisticRegression,
    encoder: &LabelEncoder,
    test_set: &FeatureTable,
    outputs: &OutputPaths,
) -> Result<()> {
    if let Some(dir) = outputs.model.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }
    write_json(model, &outputs.model)?;
    write_json(encoder, &outputs.encoder)?;
    write_json(test_set, &outputs.test_set)?;
    log::info!(
        "Wrote {}, {} and {}",
        outputs.model.display(),
        outputs.encoder.display(),
        outputs.test_set.display()
    );
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("Failed to serialize to {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open artifact: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to deserialize {}", path.display()))
}

/// Reload a persisted classifier artifact.
pub fn load_model(path: &Path) -> Result<OvrLogisticRegression> {
    read_json(path)
}

/// Reload a persisted label-encoder artifact.
pub fn load_encoder(path: &Path) -> Result<LabelEncoder> {
    read_json(path)
}

/// Reload the persisted held-out test table.
pub fn load_test_set(path: &Path) -> Result<FeatureTable> {
    read_json(path)
}
