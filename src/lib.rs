//! cytoclass: genotype classification from single-cell morphology features.
//!
//! This crate trains a one-vs-rest logistic-regression classifier that
//! predicts a categorical genotype label from single-cell morphology
//! measurements extracted from microscopy plates. It loads a plate and its
//! prime replicate, aligns them to a common feature schema, min-max
//! normalizes the features, class-balances and splits the data with an
//! explicit seed, encodes the labels, fits the classifier, and persists the
//! model, encoder, and held-out test set.
//!
//! The design favors small, testable modules: table manipulation, sampling,
//! encoding and the model wrapper can each be exercised on their own.
pub mod config;
pub mod encoding;
pub mod error;
pub mod io;
pub mod models;
pub mod paths;
pub mod pipeline;
pub mod preprocessing;
pub mod sampling;
pub mod table;
