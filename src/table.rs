//! Columnar feature table and the schema-alignment operations used to
//! combine plate replicates.
//!
//! A `FeatureTable` holds named columns of either numeric morphology
//! measurements (`Float`) or string metadata such as well, plate and
//! genotype (`Str`). All columns share one row count. The type is kept
//! deliberately small; anything model-shaped is converted to an ndarray
//! matrix at the classifier boundary.

use anyhow::{anyhow, bail, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::MetadataRule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnValues {
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, indices: &[usize]) -> ColumnValues {
        match self {
            ColumnValues::Float(v) => {
                ColumnValues::Float(indices.iter().map(|&i| v[i]).collect())
            }
            ColumnValues::Str(v) => {
                ColumnValues::Str(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ColumnValues::Float(_) => "float",
            ColumnValues::Str(_) => "str",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<Column>,
}

impl FeatureTable {
    /// Build a table from columns, validating that names are unique and all
    /// columns share the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let nrows = first.values.len();
            for col in &columns {
                if col.values.len() != nrows {
                    bail!(
                        "Column '{}' has {} rows, expected {}",
                        col.name,
                        col.values.len(),
                        nrows
                    );
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                bail!("Duplicate column name '{}'", col.name);
            }
        }
        Ok(Self { columns })
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column {
                values: ColumnValues::Float(v),
                ..
            }) => Ok(v),
            Some(_) => Err(anyhow!("Column '{}' is not a float column", name)),
            None => Err(anyhow!("Missing column '{}'", name)),
        }
    }

    pub fn str_column(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(Column {
                values: ColumnValues::Str(v),
                ..
            }) => Ok(v),
            Some(_) => Err(anyhow!("Column '{}' is not a string column", name)),
            None => Err(anyhow!("Missing column '{}'", name)),
        }
    }

    pub fn float_column_mut(&mut self, name: &str) -> Result<&mut Vec<f64>> {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(Column {
                values: ColumnValues::Float(v),
                ..
            }) => Ok(v),
            Some(_) => Err(anyhow!("Column '{}' is not a float column", name)),
            None => Err(anyhow!("Missing column '{}'", name)),
        }
    }

    /// Column names present in both tables, in this table's column order.
    pub fn common_columns(&self, other: &FeatureTable) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| other.column(&c.name).is_some())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Restrict the table to the named columns, in the given order.
    pub fn select_columns(&self, names: &[String]) -> Result<FeatureTable> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let col = self
                .column(name)
                .ok_or_else(|| anyhow!("Missing column '{}'", name))?;
            columns.push(col.clone());
        }
        FeatureTable::new(columns)
    }

    /// Set every row of a string column to `value`, appending the column if
    /// it does not exist yet.
    pub fn set_constant_str_column(&mut self, name: &str, value: &str) {
        let nrows = self.nrows();
        let values = ColumnValues::Str(vec![value.to_string(); nrows]);
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Append a float column, failing on a name clash or length mismatch.
    pub fn push_float_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if self.column(name).is_some() {
            bail!("Duplicate column name '{}'", name);
        }
        if self.ncols() > 0 && values.len() != self.nrows() {
            bail!(
                "Column '{}' has {} rows, expected {}",
                name,
                values.len(),
                self.nrows()
            );
        }
        self.columns.push(Column {
            name: name.to_string(),
            values: ColumnValues::Float(values),
        });
        Ok(())
    }

    /// Append the rows of `other`. Both tables must carry the same columns,
    /// by name and kind, in the same order.
    pub fn append_rows(&mut self, other: &FeatureTable) -> Result<()> {
        if self.ncols() != other.ncols() {
            bail!(
                "Cannot append table with {} columns to table with {}",
                other.ncols(),
                self.ncols()
            );
        }
        for (dst, src) in self.columns.iter_mut().zip(&other.columns) {
            if dst.name != src.name {
                bail!(
                    "Column mismatch while appending: '{}' vs '{}'",
                    dst.name,
                    src.name
                );
            }
            match (&mut dst.values, &src.values) {
                (ColumnValues::Float(d), ColumnValues::Float(s)) => d.extend_from_slice(s),
                (ColumnValues::Str(d), ColumnValues::Str(s)) => d.extend_from_slice(s),
                (d, s) => bail!(
                    "Column '{}' kind mismatch while appending: {} vs {}",
                    dst.name,
                    d.kind(),
                    s.kind()
                ),
            }
        }
        Ok(())
    }

    /// New table with only the rows at `indices`, in the given order.
    pub fn filter_rows(&self, indices: &[usize]) -> FeatureTable {
        FeatureTable {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values.select(indices),
                })
                .collect(),
        }
    }

    /// Drop metadata columns according to `rule`, keeping any column named
    /// in `keep` regardless of the rule.
    pub fn drop_metadata(&self, rule: &MetadataRule, keep: &[&str]) -> FeatureTable {
        FeatureTable {
            columns: self
                .columns
                .iter()
                .filter(|c| !rule.is_metadata(&c.name) || keep.contains(&c.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Names of non-metadata float columns, in table order.
    pub fn feature_names(&self, rule: &MetadataRule) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| {
                !rule.is_metadata(&c.name) && matches!(c.values, ColumnValues::Float(_))
            })
            .map(|c| c.name.clone())
            .collect()
    }

    /// Assemble the float columns (minus `exclude`) into a row-major matrix.
    pub fn numeric_matrix(&self, exclude: &[&str]) -> Result<Array2<f64>> {
        let selected: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| {
                matches!(c.values, ColumnValues::Float(_)) && !exclude.contains(&c.name.as_str())
            })
            .collect();
        if selected.is_empty() {
            bail!("No numeric feature columns to assemble into a matrix");
        }

        let nrows = self.nrows();
        let ncols = selected.len();
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in 0..nrows {
            for col in &selected {
                match &col.values {
                    ColumnValues::Float(v) => data.push(v[row]),
                    ColumnValues::Str(_) => unreachable!(),
                }
            }
        }
        Array2::from_shape_vec((nrows, ncols), data)
            .map_err(|e| anyhow!("Feature matrix shape error: {}", e))
    }
}

/// Align two plate replicates to a shared schema and stack their rows.
///
/// The schema donors define the common column set (intersection, in the
/// first donor's column order); the data donors are restricted to those
/// columns, tagged with their plate of origin, and concatenated. The output
/// row count is the sum of the two data donors' row counts.
pub fn align_plates(
    schema_a: &FeatureTable,
    schema_b: &FeatureTable,
    data_a: &FeatureTable,
    data_b: &FeatureTable,
    plate_column: &str,
    plate_labels: (&str, &str),
) -> Result<FeatureTable> {
    let common = schema_a.common_columns(schema_b);
    if common.is_empty() {
        bail!("Plate schemas share no columns");
    }
    log::debug!("{} columns shared between plate schemas", common.len());

    let mut combined = data_a.select_columns(&common)?;
    combined.set_constant_str_column(plate_column, plate_labels.0);

    let mut second = data_b.select_columns(&common)?;
    second.set_constant_str_column(plate_column, plate_labels.1);

    combined.append_rows(&second)?;
    Ok(combined)
}
