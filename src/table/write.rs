// src/table/write.rs

use crate::config::OutputFormat;
use crate::error::Result;
use crate::table::Table;
use polars::prelude::*;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::info;

/// Write `table` as CSV with a header row; returns the file size.
pub fn write_csv(table: &Table, path: &Path) -> Result<u64> {
    let mut df = table.frame().clone();
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(fs::metadata(path)?.len())
}

/// Write `table` as Brotli-compressed Parquet; returns the file size.
pub fn write_parquet(table: &Table, path: &Path) -> Result<u64> {
    let mut df = table.frame().clone();
    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file)
        .with_compression(ParquetCompression::Brotli(Some(BrotliLevel::try_new(5)?)))
        .finish(&mut df)?;
    Ok(fs::metadata(path)?.len())
}

/// Persist `table` as `<dir>/<stem>.<ext>`, overwriting any previous output.
pub fn write_table(table: &Table, dir: &Path, stem: &str, format: OutputFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    let bytes = match format {
        OutputFormat::Csv => write_csv(table, &path)?,
        OutputFormat::Parquet => write_parquet(table, &path)?,
    };
    info!(path = %path.display(), rows = table.num_rows(), bytes, "wrote table");
    Ok(path)
}
