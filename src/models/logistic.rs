//! One-vs-rest multinomial logistic regression over `linfa-logistic`.
//!
//! One binary model is fit per class present in the training labels; the
//! binary fits run in parallel. Prediction takes the argmax of the per-class
//! probabilities. Non-convergence within the iteration cap is not surfaced
//! specially; the best iterate reached is kept.

use anyhow::{anyhow, bail, Result};
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for the logistic-regression fit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LogisticParams {
    /// Maximum iterations per binary subproblem.
    pub max_iterations: u64,
    pub with_intercept: bool,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            with_intercept: true,
        }
    }
}

/// A fitted one-vs-rest classifier: one binary logistic model per class
/// index observed in the training labels. Immutable once fit.
#[derive(Serialize, Deserialize)]
pub struct OvrLogisticRegression {
    params: LogisticParams,
    models: Vec<(usize, FittedLogisticRegression<f64, bool>)>,
}

impl OvrLogisticRegression {
    /// Fit one binary model per distinct class in `y`. `x` rows are samples,
    /// columns are (already normalized) features.
    pub fn fit(x: &Array2<f64>, y: &[usize], params: &LogisticParams) -> Result<Self> {
        if x.nrows() != y.len() {
            bail!(
                "Feature matrix has {} rows but {} labels were given",
                x.nrows(),
                y.len()
            );
        }
        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            bail!("Need at least two classes to fit a classifier");
        }
        log::info!(
            "Fitting {} one-vs-rest logistic models over {} samples x {} features",
            classes.len(),
            x.nrows(),
            x.ncols()
        );

        let models = classes
            .into_par_iter()
            .map(|class| {
                let targets: Array1<bool> = y.iter().map(|&v| v == class).collect();
                let dataset = Dataset::new(x.clone(), targets);
                LogisticRegression::default()
                    .max_iterations(params.max_iterations)
                    .with_intercept(params.with_intercept)
                    .fit(&dataset)
                    .map(|fitted| (class, fitted))
                    .map_err(|e| anyhow!("Failed to fit model for class {}: {}", class, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            params: params.clone(),
            models,
        })
    }

    /// Per-class probabilities, one column per fitted class in `classes()`
    /// order. Columns are independent binary probabilities, not a softmax.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut probs = Array2::zeros((x.nrows(), self.models.len()));
        for (col, (_, model)) in self.models.iter().enumerate() {
            let p = model.predict_probabilities(x);
            probs.column_mut(col).assign(&p);
        }
        probs
    }

    /// Predicted class index per row (argmax over per-class probabilities).
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        let probs = self.predict_proba(x);
        probs
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0usize;
                let mut best_p = f64::NEG_INFINITY;
                for (i, &p) in row.iter().enumerate() {
                    if p > best_p {
                        best_p = p;
                        best = i;
                    }
                }
                self.models[best].0
            })
            .collect()
    }

    /// Class indices the model was fit on, ascending.
    pub fn classes(&self) -> Vec<usize> {
        self.models.iter().map(|(class, _)| *class).collect()
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }
}
