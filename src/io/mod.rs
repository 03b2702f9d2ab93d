//! Readers and writers for on-disk feature tables.
pub mod parquet;
