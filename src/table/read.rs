// src/table/read.rs

use crate::error::Result;
use crate::table::{Table, Value};
use arrow::{
    array::{Array, StringArray},
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{fs, io::Cursor, path::Path, sync::Arc};
use tracing::{debug, warn};

/// Cells treated as missing, on top of empty fields.
static NULL_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(|NA|N/A|NaN|nan|null|NULL|None|<NA>)\s*$").expect("null token regex")
});

const BATCH_SIZE: usize = 64 * 1024;

/// Load a delimited file with a header row into a [`Table`].
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_csv_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let bytes = fs::read(path.as_ref())?;
    let table = read_csv_bytes(&bytes)?;
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "read table"
    );
    Ok(table)
}

/// Parse CSV bytes. Every column is read as text first, then typed as a
/// whole: bool, integer, float, or string, whichever fits every non-null cell.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<Table> {
    // header only: names come from the first row
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(bytes), Some(1))?;
    let headers: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();

    let fields: Vec<Field> = headers
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let reader = ReaderBuilder::new(Arc::new(Schema::new(fields)))
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_null_regex(NULL_TOKENS.clone())
        .build(Cursor::new(bytes))?;

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for batch in reader {
        let batch = batch?;
        for (i, col) in raw.iter_mut().enumerate() {
            match batch.column(i).as_any().downcast_ref::<StringArray>() {
                Some(sarr) => col.extend(sarr.iter().map(|v| v.map(str::to_string))),
                None => {
                    warn!(column = %headers[i], "column was not read as text, treating as missing");
                    col.extend(std::iter::repeat(None).take(batch.num_rows()));
                }
            }
        }
    }

    let columns: Vec<(String, Vec<Value>)> = headers
        .into_iter()
        .zip(raw.into_iter().map(infer_column))
        .collect();
    Table::from_columns(columns)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Pick one type for the whole column and convert every cell to it.
fn infer_column(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || cells.iter().flatten().map(|s| s.trim());

    if present().all(|s| parse_bool(s).is_some()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(|s| parse_bool(s.trim())).into())
            .collect();
    }
    if present().all(|s| s.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(|s| s.trim().parse::<i64>().ok()).into())
            .collect();
    }
    if present().all(|s| s.parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(|s| s.trim().parse::<f64>().ok()).into())
            .collect();
    }
    cells.into_iter().map(Value::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_column_types_inferred() {
        let csv = "link,score,rating,year,winner\n\
                   m/a,3/5,70.5,1998,True\n\
                   m/b,,NA,2010,False\n\
                   m/c,920,80,2010,\n";
        let t = read_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(t.columns(), &["link", "score", "rating", "year", "winner"]);
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.value(0, "score"), Some(Value::from("3/5")));
        assert_eq!(t.value(1, "score"), Some(Value::Null));
        assert_eq!(t.value(2, "score"), Some(Value::from("920")));
        assert!(matches!(t.value(0, "rating"), Some(Value::Float(_))));
        assert_eq!(t.value(1, "rating"), Some(Value::Null));
        assert!(matches!(t.value(2, "year"), Some(Value::Int(2010))));
        assert!(matches!(t.value(0, "winner"), Some(Value::Bool(true))));
        assert_eq!(t.value(2, "winner"), Some(Value::Null));
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "film,category\n\"11/22/63\",\"BEST PICTURE\"\n\"Crash, The\",Best Picture\n";
        let t = read_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(t.value(0, "film"), Some(Value::from("11/22/63")));
        assert_eq!(t.value(1, "film"), Some(Value::from("Crash, The")));
    }

    #[test]
    fn test_read_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"a,b\n1,x\n2,y\n").unwrap();
        let t = read_csv_table(tmp.path()).unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.value(1, "a"), Some(Value::Int(2)));
    }
}
