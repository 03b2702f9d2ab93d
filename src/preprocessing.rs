//! Min-max normalization of the combined plate table.
//!
//! The scaler is fit once over the full combined dataset's non-metadata
//! columns, before any sampling or splitting, and applied in place. Values
//! outside the fit range are possible only on data the scaler never saw;
//! no separate inference path exists here.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::MetadataRule;
use crate::table::FeatureTable;

/// Fitted per-column min-max transform parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub columns: Vec<String>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

/// Fit a `MinMaxScaler` over every non-metadata float column of the table.
pub fn fit_scaler(table: &FeatureTable, rule: &MetadataRule) -> Result<MinMaxScaler> {
    let columns = table.feature_names(rule);
    if columns.is_empty() {
        bail!("No feature columns to normalize");
    }
    if table.nrows() == 0 {
        bail!("Cannot fit a scaler on an empty table");
    }

    let mut min = Vec::with_capacity(columns.len());
    let mut max = Vec::with_capacity(columns.len());
    for name in &columns {
        let values = table.float_column(name)?;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in values {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        min.push(lo);
        max.push(hi);
    }

    Ok(MinMaxScaler { columns, min, max })
}

/// Rescale the scaler's columns in place to [0,1] on the fit range.
/// Constant columns map to 0.
pub fn transform_in_place(table: &mut FeatureTable, scaler: &MinMaxScaler) -> Result<()> {
    for (i, name) in scaler.columns.iter().enumerate() {
        let (lo, hi) = (scaler.min[i], scaler.max[i]);
        let range = hi - lo;
        let values = table.float_column_mut(name)?;
        for v in values.iter_mut() {
            *v = if range == 0.0 { 0.0 } else { (*v - lo) / range };
        }
    }
    Ok(())
}

/// Fit the scaler and normalize the table in one call, returning the fitted
/// parameters.
pub fn fit_transform(table: &mut FeatureTable, rule: &MetadataRule) -> Result<MinMaxScaler> {
    let scaler = fit_scaler(table, rule)?;
    transform_in_place(table, &scaler)?;
    Ok(scaler)
}
