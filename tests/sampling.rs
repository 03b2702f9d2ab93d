//! Integration tests for class balancing and the stratified split.

use std::collections::HashMap;

use cytoclass::sampling::{balance_classes, train_test_split};
use cytoclass::table::{Column, ColumnValues, FeatureTable};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Build a table with the given (genotype, well, rows) strata and one
/// feature column carrying the row index.
fn strata_table(strata: &[(&str, &str, usize)]) -> FeatureTable {
    let mut genotypes = Vec::new();
    let mut wells = Vec::new();
    let mut feature = Vec::new();
    let mut row = 0usize;
    for &(genotype, well, count) in strata {
        for _ in 0..count {
            genotypes.push(genotype.to_string());
            wells.push(well.to_string());
            feature.push(row as f64);
            row += 1;
        }
    }
    FeatureTable::new(vec![
        Column {
            name: "f1".to_string(),
            values: ColumnValues::Float(feature),
        },
        Column {
            name: "Metadata_genotype".to_string(),
            values: ColumnValues::Str(genotypes),
        },
        Column {
            name: "Metadata_Well".to_string(),
            values: ColumnValues::Str(wells),
        },
    ])
    .unwrap()
}

fn class_counts(table: &FeatureTable) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for label in table.str_column("Metadata_genotype").unwrap() {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Class balancing
// ---------------------------------------------------------------------------

#[test]
fn classes_100_40_60_balance_to_40_each() {
    // HET: 4 wells x 25 = 100, Null: 4 x 10 = 40, WT: 4 x 15 = 60
    let mut strata = Vec::new();
    for well in ["W1", "W2", "W3", "W4"] {
        strata.push(("HET", well, 25));
        strata.push(("Null", well, 10));
        strata.push(("WT", well, 15));
    }
    let table = strata_table(&strata);

    let mut rng = StdRng::seed_from_u64(0);
    let balanced = balance_classes(&table, "Metadata_genotype", "Metadata_Well", &mut rng).unwrap();

    let counts = class_counts(&balanced);
    assert_eq!(counts["HET"], 40);
    assert_eq!(counts["Null"], 40);
    assert_eq!(counts["WT"], 40);
}

#[test]
fn smallest_class_passes_through_unchanged() {
    let table = strata_table(&[("HET", "W1", 20), ("Null", "W1", 8)]);
    let mut rng = StdRng::seed_from_u64(0);
    let balanced = balance_classes(&table, "Metadata_genotype", "Metadata_Well", &mut rng).unwrap();

    // Both Null rows sets are identical, so all 8 survive sampling at 1.0.
    let counts = class_counts(&balanced);
    assert_eq!(counts["Null"], 8);
    assert_eq!(counts["HET"], 8);
}

#[test]
fn sparse_well_rounds_down_to_zero() {
    // 11 HET rows at fraction 5/11: the 1-row well contributes
    // round(5/11) = 0 rows, the 10-row well round(50/11) = 5.
    let table = strata_table(&[("HET", "W1", 10), ("HET", "W2", 1), ("Null", "W1", 5)]);
    let mut rng = StdRng::seed_from_u64(0);
    let balanced = balance_classes(&table, "Metadata_genotype", "Metadata_Well", &mut rng).unwrap();

    let counts = class_counts(&balanced);
    assert_eq!(counts["Null"], 5);
    assert_eq!(counts["HET"], 5);
}

#[test]
fn balancing_is_deterministic_for_fixed_seed() {
    let mut strata = Vec::new();
    for well in ["W1", "W2", "W3"] {
        strata.push(("HET", well, 12));
        strata.push(("Null", well, 6));
    }
    let table = strata_table(&strata);

    let mut rng_a = StdRng::seed_from_u64(7);
    let mut rng_b = StdRng::seed_from_u64(7);
    let a = balance_classes(&table, "Metadata_genotype", "Metadata_Well", &mut rng_a).unwrap();
    let b = balance_classes(&table, "Metadata_genotype", "Metadata_Well", &mut rng_b).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Stratified split
// ---------------------------------------------------------------------------

#[test]
fn split_is_deterministic_and_partitions_all_rows() {
    let mut strata = Vec::new();
    for well in ["W1", "W2"] {
        strata.push(("HET", well, 10));
        strata.push(("Null", well, 10));
    }
    let table = strata_table(&strata);

    let mut rng_a = StdRng::seed_from_u64(0);
    let (train_a, test_a) =
        train_test_split(&table, "Metadata_genotype", "Metadata_Well", 0.85, &mut rng_a).unwrap();

    let mut rng_b = StdRng::seed_from_u64(0);
    let (train_b, test_b) =
        train_test_split(&table, "Metadata_genotype", "Metadata_Well", 0.85, &mut rng_b).unwrap();

    assert_eq!(train_a, train_b);
    assert_eq!(test_a, test_b);
    assert_eq!(train_a.nrows() + test_a.nrows(), table.nrows());

    // No row lands in both partitions; f1 carries the original row index.
    let train_rows: Vec<f64> = train_a.float_column("f1").unwrap().to_vec();
    for v in test_a.float_column("f1").unwrap() {
        assert!(!train_rows.contains(v));
    }
}

#[test]
fn split_respects_strata_proportions() {
    // Each (genotype, well) stratum of 10 rows splits 9 train / 1 test.
    let mut strata = Vec::new();
    for well in ["W1", "W2", "W3"] {
        strata.push(("HET", well, 10));
        strata.push(("Null", well, 10));
    }
    let table = strata_table(&strata);

    let mut rng = StdRng::seed_from_u64(0);
    let (train, test) =
        train_test_split(&table, "Metadata_genotype", "Metadata_Well", 0.85, &mut rng).unwrap();

    assert_eq!(train.nrows(), 54);
    assert_eq!(test.nrows(), 6);
    let counts = class_counts(&test);
    assert_eq!(counts["HET"], 3);
    assert_eq!(counts["Null"], 3);
}

#[test]
fn split_rejects_bad_fraction() {
    let table = strata_table(&[("HET", "W1", 4)]);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(
        train_test_split(&table, "Metadata_genotype", "Metadata_Well", 1.5, &mut rng).is_err()
    );
}
