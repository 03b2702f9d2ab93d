//! Class balancing and the stratified train/test split.
//!
//! Both operations take the RNG explicitly so that run-to-run membership is
//! reproducible for a fixed seed and input ordering. Grouping uses ordered
//! maps so iteration order never depends on hashing.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::table::FeatureTable;

/// Down-sample each target class to the cardinality of the smallest class,
/// sampling within each class stratified by the `stratify` column.
///
/// For each class the sampling fraction is `smallest / class_size` (1.0 for
/// the smallest class, which passes through unchanged). Within a class, each
/// stratify group contributes `round(fraction * group_size)` rows drawn
/// without replacement; a group with too few rows for the fraction rounds
/// down to zero.
pub fn balance_classes(
    table: &FeatureTable,
    target: &str,
    stratify: &str,
    rng: &mut StdRng,
) -> Result<FeatureTable> {
    let labels = table.str_column(target)?;
    let groups = table.str_column(stratify)?;

    let mut class_rows: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        class_rows.entry(label).or_default().push(i);
    }
    if class_rows.is_empty() {
        bail!("Cannot balance an empty table");
    }

    let smallest = class_rows.values().map(Vec::len).min().unwrap_or(0);

    let mut selected: Vec<usize> = Vec::new();
    for (label, rows) in &class_rows {
        let fraction = smallest as f64 / rows.len() as f64;

        let mut wells: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for &row in rows {
            wells.entry(groups[row].as_str()).or_default().push(row);
        }

        let mut taken = 0usize;
        for well_rows in wells.values() {
            let n_take =
                ((fraction * well_rows.len() as f64).round() as usize).min(well_rows.len());
            let mut shuffled = well_rows.clone();
            shuffled.shuffle(rng);
            shuffled.truncate(n_take);
            shuffled.sort_unstable();
            taken += shuffled.len();
            selected.extend(shuffled);
        }
        log::debug!(
            "Class '{}': {} rows sampled from {} (fraction {:.4})",
            label,
            taken,
            rows.len(),
            fraction
        );
    }

    Ok(table.filter_rows(&selected))
}

/// Single train/test split, jointly stratified on the (target, stratify)
/// pair. Each stratum is shuffled with the caller's RNG and the first
/// `round(train_frac * stratum_size)` rows go to the train partition.
pub fn train_test_split(
    table: &FeatureTable,
    target: &str,
    stratify: &str,
    train_frac: f64,
    rng: &mut StdRng,
) -> Result<(FeatureTable, FeatureTable)> {
    if !(0.0..=1.0).contains(&train_frac) {
        bail!("Train fraction {} is not within [0, 1]", train_frac);
    }
    let labels = table.str_column(target)?;
    let groups = table.str_column(stratify)?;

    let mut strata: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
    for i in 0..table.nrows() {
        strata
            .entry((labels[i].as_str(), groups[i].as_str()))
            .or_default()
            .push(i);
    }

    let mut train_rows: Vec<usize> = Vec::new();
    let mut test_rows: Vec<usize> = Vec::new();
    for rows in strata.values() {
        let mut shuffled = rows.clone();
        shuffled.shuffle(rng);
        let n_train = ((train_frac * shuffled.len() as f64).round() as usize).min(shuffled.len());
        train_rows.extend_from_slice(&shuffled[..n_train]);
        test_rows.extend_from_slice(&shuffled[n_train..]);
    }
    train_rows.sort_unstable();
    test_rows.sort_unstable();

    log::debug!(
        "Split {} rows into {} train / {} test across {} strata",
        table.nrows(),
        train_rows.len(),
        test_rows.len(),
        strata.len()
    );

    Ok((table.filter_rows(&train_rows), table.filter_rows(&test_rows)))
}
