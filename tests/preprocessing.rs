//! Integration tests for min-max normalization.

use cytoclass::config::MetadataRule;
use cytoclass::preprocessing::{fit_scaler, fit_transform, transform_in_place};
use cytoclass::table::{Column, ColumnValues, FeatureTable};

fn sample_table() -> FeatureTable {
    FeatureTable::new(vec![
        Column {
            name: "f1".to_string(),
            values: ColumnValues::Float(vec![2.0, 4.0, 6.0, 10.0]),
        },
        Column {
            name: "f2".to_string(),
            values: ColumnValues::Float(vec![-1.0, 0.0, 1.0, 3.0]),
        },
        Column {
            name: "f_const".to_string(),
            values: ColumnValues::Float(vec![5.0, 5.0, 5.0, 5.0]),
        },
        Column {
            name: "Metadata_count".to_string(),
            values: ColumnValues::Float(vec![100.0, 200.0, 300.0, 400.0]),
        },
        Column {
            name: "Metadata_Well".to_string(),
            values: ColumnValues::Str(vec!["A".into(), "A".into(), "B".into(), "B".into()]),
        },
    ])
    .unwrap()
}

#[test]
fn fit_scaler_records_per_column_extrema() {
    let table = sample_table();
    let scaler = fit_scaler(&table, &MetadataRule::default()).unwrap();

    assert_eq!(scaler.columns, vec!["f1", "f2", "f_const"]);
    assert_eq!(scaler.min, vec![2.0, -1.0, 5.0]);
    assert_eq!(scaler.max, vec![10.0, 3.0, 5.0]);
}

#[test]
fn transformed_values_lie_in_unit_interval() {
    let mut table = sample_table();
    fit_transform(&mut table, &MetadataRule::default()).unwrap();

    for name in ["f1", "f2", "f_const"] {
        for &v in table.float_column(name).unwrap() {
            assert!((0.0..=1.0).contains(&v), "{} value {} out of [0,1]", name, v);
        }
    }
    // Extremes map exactly to the interval bounds.
    assert_eq!(table.float_column("f1").unwrap()[0], 0.0);
    assert_eq!(table.float_column("f1").unwrap()[3], 1.0);
}

#[test]
fn constant_column_maps_to_zero() {
    let mut table = sample_table();
    fit_transform(&mut table, &MetadataRule::default()).unwrap();
    for &v in table.float_column("f_const").unwrap() {
        assert_eq!(v, 0.0);
    }
}

#[test]
fn metadata_columns_are_untouched() {
    let mut table = sample_table();
    fit_transform(&mut table, &MetadataRule::default()).unwrap();
    assert_eq!(
        table.float_column("Metadata_count").unwrap(),
        &[100.0, 200.0, 300.0, 400.0]
    );
}

#[test]
fn transform_uses_fit_parameters_not_current_data() {
    let table = sample_table();
    let scaler = fit_scaler(&table, &MetadataRule::default()).unwrap();

    // A fresh table with values outside the fit range is not clamped.
    let mut other = FeatureTable::new(vec![
        Column {
            name: "f1".to_string(),
            values: ColumnValues::Float(vec![12.0]),
        },
        Column {
            name: "f2".to_string(),
            values: ColumnValues::Float(vec![-1.0]),
        },
        Column {
            name: "f_const".to_string(),
            values: ColumnValues::Float(vec![5.0]),
        },
    ])
    .unwrap();
    transform_in_place(&mut other, &scaler).unwrap();
    assert!(other.float_column("f1").unwrap()[0] > 1.0);
}
