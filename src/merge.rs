// src/merge.rs

use crate::error::{Error, Result, ValidationError};
use crate::table::{Table, Value};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

/// Whether a join may fan out the left table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Each left row matches at most one right row.
    Forbidden,
    /// One left row may match many right rows.
    Expected,
}

/// Row-order columns added for the duration of a join.
const LEFT_ROW: &str = "__left_row";
const RIGHT_ROW: &str = "__right_row";

fn key_values(table: &Table, key: &str) -> Result<Vec<Value>> {
    table
        .column(key)
        .ok_or_else(|| ValidationError::MissingColumn(key.to_string()).into())
}

/// Plain inner join on `key`.
///
/// Output columns are the left columns followed by the right columns minus
/// `key`; other names present on both sides get `_x` / `_y` suffixes. Rows
/// follow the left order, each left row repeated once per right match in
/// right order. Null keys never match.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    key_values(left, key)?;
    key_values(right, key)?;

    let shared: Vec<String> = left
        .columns()
        .into_iter()
        .filter(|c| c != key && right.has_column(c))
        .collect();
    let mut l = left.frame().clone();
    let mut r = right.frame().clone();
    for name in &shared {
        l.rename(name, format!("{}_x", name).into())?;
        r.rename(name, format!("{}_y", name).into())?;
    }

    let output: Vec<Expr> = l
        .get_column_names()
        .into_iter()
        .chain(r.get_column_names().into_iter().filter(|c| c.as_str() != key))
        .map(|c| col(c.clone()))
        .collect();

    let joined = l
        .lazy()
        .with_row_index(LEFT_ROW, None)
        .join(
            r.lazy().with_row_index(RIGHT_ROW, None),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort_by_exprs([col(LEFT_ROW), col(RIGHT_ROW)], SortMultipleOptions::default())
        .select(output)
        .collect()?;
    Ok(joined.into())
}

fn loose_key(v: &Value) -> String {
    match v {
        Value::Str(s) => s.trim().to_lowercase(),
        other => other.to_string(),
    }
}

/// Inner join on `key` with row-count checks.
///
/// With [`Growth::Forbidden`] the result may not have more rows than `left`
/// ([`Error::MergeExpansion`]); left rows without a match are dropped and
/// logged. With [`Growth::Expected`] the result may fan out, but a join that
/// loses every match while some left keys differ from right keys only in
/// case or surrounding whitespace fails with [`Error::MergeShrink`].
///
/// Partial near misses are reported as a warning: they usually point at a
/// key formatting problem upstream.
#[tracing::instrument(
    level = "debug",
    skip(left, right),
    fields(left_rows = left.num_rows(), right_rows = right.num_rows())
)]
pub fn guarded_inner_join(left: &Table, right: &Table, key: &str, growth: Growth) -> Result<Table> {
    let joined = inner_join(left, right, key)?;
    let before = left.num_rows();
    let after = joined.num_rows();

    if growth == Growth::Forbidden && after > before {
        return Err(Error::MergeExpansion {
            key: key.to_string(),
            before,
            after,
            delta: after - before,
        });
    }

    let left_keys = key_values(left, key)?;
    let right_keys: HashSet<Value> = key_values(right, key)?
        .into_iter()
        .filter(|v| !v.is_null())
        .collect();
    let matched = left_keys.iter().filter(|k| right_keys.contains(*k)).count();

    let unmatched = before - matched;
    if unmatched > 0 {
        let right_loose: HashSet<String> = right_keys.iter().map(loose_key).collect();
        let near_misses = left_keys
            .iter()
            .filter(|k| !k.is_null() && !right_keys.contains(*k))
            .filter(|k| right_loose.contains(&loose_key(k)))
            .count();

        if growth == Growth::Expected && after == 0 && near_misses > 0 {
            return Err(Error::MergeShrink {
                key: key.to_string(),
                expected: near_misses,
                actual: after,
            });
        }
        if near_misses > 0 {
            warn!(
                key,
                near_misses, "rows dropped whose key only differs in case or whitespace"
            );
        }
        info!(key, unmatched, "rows dropped without a match");
    }

    info!(key, ?growth, before, after, "merged");
    Ok(joined)
}
