//! Parquet reader/writer for `FeatureTable`.
//!
//! Numeric columns (Float32/Float64 and integer types) are widened to `f64`;
//! Utf8 columns become string metadata columns. Anything else is rejected
//! with the offending column name so schema surprises fail loudly.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use crate::table::{Column, ColumnValues, FeatureTable};

/// Read a parquet file into a `FeatureTable`.
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<FeatureTable> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open parquet file: {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Failed to read parquet metadata: {}", path.display()))?
        .build()
        .with_context(|| format!("Failed to build parquet reader: {}", path.display()))?;

    let mut columns: Vec<Column> = Vec::new();
    for batch in reader {
        let batch =
            batch.with_context(|| format!("Failed to read record batch: {}", path.display()))?;
        if columns.is_empty() {
            for field in batch.schema().fields() {
                columns.push(Column {
                    name: field.name().clone(),
                    values: empty_values(field.data_type())
                        .with_context(|| format!("In parquet file {}", path.display()))?,
                });
            }
        }
        append_batch(&mut columns, &batch)
            .with_context(|| format!("In parquet file {}", path.display()))?;
    }

    if columns.is_empty() {
        bail!("Parquet file {} contains no data", path.display());
    }
    let table = FeatureTable::new(columns)?;
    log::debug!(
        "Read {} rows x {} columns from {}",
        table.nrows(),
        table.ncols(),
        path.display()
    );
    Ok(table)
}

fn empty_values(data_type: &DataType) -> Result<ColumnValues> {
    match data_type {
        DataType::Float32 | DataType::Float64 | DataType::Int32 | DataType::Int64 => {
            Ok(ColumnValues::Float(Vec::new()))
        }
        DataType::Utf8 | DataType::LargeUtf8 => Ok(ColumnValues::Str(Vec::new())),
        other => bail!("Unsupported parquet column type: {:?}", other),
    }
}

fn append_batch(columns: &mut [Column], batch: &RecordBatch) -> Result<()> {
    for (col, array) in columns.iter_mut().zip(batch.columns()) {
        match &mut col.values {
            ColumnValues::Float(out) => append_floats(&col.name, array, out)?,
            ColumnValues::Str(out) => append_strings(&col.name, array, out)?,
        }
    }
    Ok(())
}

fn append_floats(name: &str, array: &ArrayRef, out: &mut Vec<f64>) -> Result<()> {
    // Nulls become NaN, matching how missing measurements travel elsewhere.
    match array.data_type() {
        DataType::Float64 => {
            let a = array.as_any().downcast_ref::<Float64Array>().unwrap();
            out.extend((0..a.len()).map(|i| if a.is_null(i) { f64::NAN } else { a.value(i) }));
        }
        DataType::Float32 => {
            let a = array.as_any().downcast_ref::<Float32Array>().unwrap();
            out.extend(
                (0..a.len()).map(|i| if a.is_null(i) { f64::NAN } else { a.value(i) as f64 }),
            );
        }
        DataType::Int32 => {
            let a = array.as_any().downcast_ref::<Int32Array>().unwrap();
            out.extend(
                (0..a.len()).map(|i| if a.is_null(i) { f64::NAN } else { a.value(i) as f64 }),
            );
        }
        DataType::Int64 => {
            let a = array.as_any().downcast_ref::<Int64Array>().unwrap();
            out.extend(
                (0..a.len()).map(|i| if a.is_null(i) { f64::NAN } else { a.value(i) as f64 }),
            );
        }
        other => bail!("Unsupported numeric type {:?} in column '{}'", other, name),
    }
    Ok(())
}

fn append_strings(name: &str, array: &ArrayRef, out: &mut Vec<String>) -> Result<()> {
    match array.data_type() {
        DataType::Utf8 => {
            let a = array.as_any().downcast_ref::<StringArray>().unwrap();
            for i in 0..a.len() {
                if a.is_null(i) {
                    bail!("Null value in string column '{}'", name);
                }
                out.push(a.value(i).to_string());
            }
        }
        DataType::LargeUtf8 => {
            let a = array.as_any().downcast_ref::<LargeStringArray>().unwrap();
            for i in 0..a.len() {
                if a.is_null(i) {
                    bail!("Null value in string column '{}'", name);
                }
                out.push(a.value(i).to_string());
            }
        }
        other => bail!("Unsupported string type {:?} in column '{}'", other, name),
    }
    Ok(())
}

/// Write a `FeatureTable` to a parquet file. Used by tests and fixtures;
/// the training pipeline itself only reads parquet.
pub fn write_feature_table<P: AsRef<Path>>(table: &FeatureTable, path: P) -> Result<()> {
    let path = path.as_ref();

    let mut fields = Vec::with_capacity(table.ncols());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.ncols());
    for name in table.column_names() {
        let col = table.column(name).expect("column listed but missing");
        match &col.values {
            ColumnValues::Float(v) => {
                fields.push(Field::new(name, DataType::Float64, false));
                arrays.push(Arc::new(Float64Array::from(v.clone())));
            }
            ColumnValues::Str(v) => {
                fields.push(Field::new(name, DataType::Utf8, false));
                arrays.push(Arc::new(StringArray::from(v.clone())));
            }
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .with_context(|| format!("Failed to assemble record batch for {}", path.display()))?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create parquet file: {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)
        .with_context(|| format!("Failed to open parquet writer: {}", path.display()))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
