// src/table/mod.rs

pub mod read;
pub mod write;

use crate::error::{Error, Result, ValidationError};
use polars::prelude::*;
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// 2^63, the first float above `i64::MAX`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// `f` as an integer, when it is one exactly.
fn exact_int(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&f)).then_some(f as i64)
}

/// NaN sorts after every other float.
fn cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact integer/float comparison, no rounding through `f64`.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() || f >= I64_LIMIT {
        return Ordering::Less;
    }
    if f < -I64_LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| cmp_float(whole, f))
}

/// A single cell. Numbers compare by exact value across `Int`/`Float`, so a
/// column read as integers still joins against one read as floats.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness for winner-style flags: booleans, 0/1, and "true"/"false".
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integer view used when summing flags; floats only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            Value::Float(f) => exact_int(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => cmp_float(*a, *b),
            (Value::Int(i), Value::Float(f)) => cmp_int_float(*i, *f),
            (Value::Float(f), Value::Int(i)) => cmp_int_float(*i, *f).reverse(),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => match exact_int(*f) {
                Some(i) => i.hash(state),
                None if f.is_nan() => f64::NAN.to_bits().hash(state),
                None => f.to_bits().hash(state),
            },
            Value::Str(s) => s.hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<AnyValue<'_>> for Value {
    fn from(av: AnyValue<'_>) -> Self {
        match av {
            AnyValue::Null => Value::Null,
            AnyValue::Boolean(b) => Value::Bool(b),
            AnyValue::Int32(i) => Value::Int(i64::from(i)),
            AnyValue::Int64(i) => Value::Int(i),
            AnyValue::UInt32(u) => Value::Int(i64::from(u)),
            AnyValue::UInt64(u) => i64::try_from(u)
                .map(Value::Int)
                .unwrap_or(Value::Float(u as f64)),
            AnyValue::Float32(f) => Value::Float(f64::from(f)),
            AnyValue::Float64(f) => Value::Float(f),
            AnyValue::String(s) => Value::Str(s.to_string()),
            AnyValue::StringOwned(s) => Value::Str(s.to_string()),
            other => Value::Str(other.to_string()),
        }
    }
}

/// Narrowest polars dtype that holds every non-null value of a column.
/// Any text forces the whole column to `String`.
fn column_dtype<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let mut ty: Option<DataType> = None;
    for v in values {
        let next = match v {
            Value::Null => continue,
            Value::Bool(_) => DataType::Boolean,
            Value::Int(_) => DataType::Int64,
            Value::Float(_) => DataType::Float64,
            Value::Str(_) => return DataType::String,
        };
        ty = Some(match (ty, next) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Int64), DataType::Float64)
            | (Some(DataType::Float64), DataType::Int64) => DataType::Float64,
            _ => return DataType::String,
        });
    }
    ty.unwrap_or(DataType::String)
}

/// Build one typed series from cells.
fn to_series(name: &str, values: &[Value]) -> Series {
    let name = PlSmallStr::from(name);
    match column_dtype(values.iter()) {
        DataType::Boolean => Series::new(name, values.iter().map(Value::as_bool).collect::<Vec<_>>()),
        DataType::Int64 => Series::new(name, values.iter().map(Value::as_i64).collect::<Vec<_>>()),
        DataType::Float64 => Series::new(name, values.iter().map(Value::as_f64).collect::<Vec<_>>()),
        _ => Series::new(
            name,
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<Vec<Option<String>>>(),
        ),
    }
}

/// A named, typed table backed by a polars [`DataFrame`].
///
/// Row-dropping operations consume the table and hand back a new one, so a
/// stage owns exactly the table it produces.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl PartialEq for Table {
    /// Same column names and the same cells, compared as [`Value`]s.
    fn eq(&self, other: &Self) -> bool {
        self.columns() == other.columns()
            && self.num_rows() == other.num_rows()
            && (0..self.num_rows()).all(|i| self.row(i) == other.row(i))
    }
}

impl Table {
    /// Build a table column by column. All columns must have the same length.
    pub fn from_columns<S: AsRef<str>>(cols: Vec<(S, Vec<Value>)>) -> Result<Self> {
        let n = cols.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut columns: Vec<Column> = Vec::with_capacity(cols.len());
        for (name, values) in &cols {
            if values.len() != n {
                return Err(Error::ColumnLength {
                    column: name.as_ref().to_string(),
                    expected: n,
                    found: values.len(),
                });
            }
            columns.push(to_series(name.as_ref(), values).into());
        }
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect()
    }

    pub fn num_rows(&self) -> usize {
        self.frame.height()
    }

    pub fn num_columns(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    fn require(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| ValidationError::MissingColumn(name.to_string()).into())
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Value>> {
        let col = self.frame.column(name).ok()?;
        Some(
            (0..col.len())
                .map(|i| col.get(i).map(Value::from).unwrap_or(Value::Null))
                .collect(),
        )
    }

    pub fn row(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.num_rows() {
            return None;
        }
        Some(
            self.frame
                .get_columns()
                .iter()
                .map(|c| c.get(row).map(Value::from).unwrap_or(Value::Null))
                .collect(),
        )
    }

    pub fn value(&self, row: usize, name: &str) -> Option<Value> {
        let col = self.frame.column(name).ok()?;
        col.get(row).ok().map(Value::from)
    }

    /// Subset to `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        for n in names {
            self.require(n)?;
        }
        Ok(self.frame.select(names.iter().copied())?.into())
    }

    /// Keep the rows matching `predicate`.
    pub fn filter(self, predicate: Expr) -> Result<Table> {
        Ok(self.frame.lazy().filter(predicate).collect()?.into())
    }

    /// Drop every row whose `column` is missing.
    pub fn drop_nulls(self, column: &str) -> Result<Table> {
        self.require(column)?;
        self.filter(col(column).is_not_null())
    }

    /// Keep rows whose `column` is a string in `allowed`.
    pub fn retain_in(self, column: &str, allowed: &[&str]) -> Result<Table> {
        let is_text = self.require(column)?.dtype() == &DataType::String;
        let predicate = allowed
            .iter()
            .map(|a| col(column).eq(lit(*a)))
            .reduce(|acc, e| acc.or(e))
            .filter(|_| is_text)
            .unwrap_or(lit(false));
        self.filter(predicate)
    }

    /// Replace each value of `column` with `f(row_index, value)`. The new
    /// column is re-typed from the values `f` returns.
    pub fn try_map_column<F>(mut self, column: &str, mut f: F) -> Result<Table>
    where
        F: FnMut(usize, &Value) -> Result<Value>,
    {
        self.require(column)?;
        let mapped = self
            .column(column)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, v)| f(i, v))
            .collect::<Result<Vec<_>>>()?;
        self.frame.replace(column, to_series(column, &mapped))?;
        Ok(self)
    }

    /// Rename `from` to `to`; a no-op when `from` is absent.
    pub fn rename(mut self, from: &str, to: &str) -> Result<Table> {
        if self.has_column(from) {
            self.frame.rename(from, to.into())?;
        }
        Ok(self)
    }

    /// Drop repeated rows, keeping the first occurrence and the row order.
    pub fn drop_duplicates(self) -> Result<Table> {
        Ok(self
            .frame
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?
            .into())
    }

    /// Group by `keys` (ascending key order) and sum the integer `value`
    /// column into a new column named `out`. Rows with a null key are
    /// left out of every group.
    pub fn group_sum(&self, keys: &[&str], value: &str, out: &str) -> Result<Table> {
        for k in keys {
            self.require(k)?;
        }
        self.require(value)?;

        let present = keys
            .iter()
            .map(|k| col(*k).is_not_null())
            .reduce(|acc, e| acc.and(e))
            .unwrap_or(lit(true));
        let keyed = self.clone().filter(present)?;

        let values = keyed.column(value).unwrap_or_default();
        if let Some((row, v)) = values.iter().enumerate().find(|(_, v)| v.as_i64().is_none()) {
            return Err(Error::NotInteger {
                column: value.to_string(),
                row,
                value: v.to_string(),
            });
        }

        let by: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
        let grouped = keyed
            .frame
            .lazy()
            .group_by(by.clone())
            .agg([col(value).cast(DataType::Int64).sum().alias(out)])
            .sort_by_exprs(by, SortMultipleOptions::default())
            .collect()?;
        Ok(grouped.into())
    }
}
