// src/validate.rs

use crate::error::ValidationError;
use crate::table::Table;
use std::collections::BTreeMap;

type Check = std::result::Result<(), ValidationError>;

/// Every name in `required` must be a column of `table`.
pub fn require_columns(table: &Table, required: &[&str]) -> Check {
    match required.iter().find(|c| !table.has_column(c)) {
        Some(missing) => Err(ValidationError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// `column` must exist, hold no nulls, and hold only numbers.
pub fn require_numeric_column(table: &Table, column: &str) -> Check {
    let values = table
        .column(column)
        .ok_or_else(|| ValidationError::ColumnUnavailable(column.to_string()))?;

    let nulls = values.iter().filter(|v| v.is_null()).count();
    if nulls > 0 {
        return Err(ValidationError::NullValues {
            column: column.to_string(),
            count: nulls,
        });
    }

    if let Some((row, v)) = values.iter().enumerate().find(|(_, v)| !v.is_numeric()) {
        return Err(ValidationError::NonNumeric {
            column: column.to_string(),
            row,
            value: v.to_string(),
        });
    }
    Ok(())
}

/// At most one row per `year_column` may have a true `winner_column`.
/// Winner flags must be present and boolean.
pub fn require_single_winner_per_year(
    table: &Table,
    year_column: &str,
    winner_column: &str,
) -> Check {
    let years = table
        .column(year_column)
        .ok_or_else(|| ValidationError::ColumnUnavailable(year_column.to_string()))?;
    let winners = table
        .column(winner_column)
        .ok_or_else(|| ValidationError::ColumnUnavailable(winner_column.to_string()))?;

    if winners.iter().any(|w| w.is_null()) {
        return Err(ValidationError::NullWinner(winner_column.to_string()));
    }

    let mut per_year: BTreeMap<String, usize> = BTreeMap::new();
    for (row, (year, winner)) in years.iter().zip(&winners).enumerate() {
        let won = winner.as_bool().ok_or_else(|| ValidationError::NonBoolean {
            column: winner_column.to_string(),
            row,
            value: winner.to_string(),
        })?;
        if won {
            *per_year.entry(year.to_string()).or_insert(0) += 1;
        }
    }

    match per_year.into_iter().find(|(_, count)| *count > 1) {
        Some((year, count)) => Err(ValidationError::DuplicateYearWinner { year, count }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    const KEEP: &[&str] = &["rotten_tomatoes_link", "review_score"];

    fn reviews(scores: Vec<Value>) -> Table {
        let links = (0..scores.len() as i64).map(Value::Int).collect();
        Table::from_columns(vec![
            ("rotten_tomatoes_link", links),
            ("review_score", scores),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_table_passes() {
        let t = reviews(vec![98.0.into(), 85.0.into(), Value::Int(100)]);
        assert_eq!(require_columns(&t, KEEP), Ok(()));
        assert_eq!(require_numeric_column(&t, "review_score"), Ok(()));
    }

    #[test]
    fn test_missing_column() {
        let t = reviews(vec![98.0.into()]).select(&["review_score"]).unwrap();
        assert_eq!(
            require_columns(&t, KEEP),
            Err(ValidationError::MissingColumn("rotten_tomatoes_link".into()))
        );
        assert_eq!(
            require_numeric_column(&t, "audience_rating"),
            Err(ValidationError::ColumnUnavailable("audience_rating".into()))
        );
    }

    #[test]
    fn test_null_in_numeric_column() {
        let t = reviews(vec![100.0.into(), Value::Null, 85.0.into()]);
        assert_eq!(
            require_numeric_column(&t, "review_score"),
            Err(ValidationError::NullValues {
                column: "review_score".into(),
                count: 1
            })
        );
    }

    #[test]
    fn test_text_in_numeric_column() {
        let t = reviews(vec!["A+".into(), 100.0.into(), 85.0.into()]);
        assert!(matches!(
            require_numeric_column(&t, "review_score"),
            Err(ValidationError::NonNumeric { row: 0, .. })
        ));
        // one text cell makes the whole column text
        let t = reviews(vec![98.0.into(), 85.0.into(), "12".into()]);
        assert!(matches!(
            require_numeric_column(&t, "review_score"),
            Err(ValidationError::NonNumeric { row: 0, ref value, .. }) if value == "98"
        ));
    }

    fn awards(years: Vec<i64>, winners: Vec<Value>) -> Table {
        Table::from_columns(vec![
            ("year_film", years.into_iter().map(Value::Int).collect()),
            ("winner", winners),
        ])
        .unwrap()
    }

    #[test]
    fn test_one_winner_per_year() {
        let t = awards(vec![1998, 1999, 2000], vec![false.into(), true.into(), true.into()]);
        assert_eq!(require_single_winner_per_year(&t, "year_film", "winner"), Ok(()));
    }

    #[test]
    fn test_duplicate_year_winner() {
        let t = awards(vec![1998, 2000, 2000], vec![false.into(), true.into(), true.into()]);
        assert_eq!(
            require_single_winner_per_year(&t, "year_film", "winner"),
            Err(ValidationError::DuplicateYearWinner {
                year: "2000".into(),
                count: 2
            })
        );
    }

    #[test]
    fn test_null_winner() {
        let t = awards(vec![1998, 1999, 2000], vec![false.into(), Value::Null, true.into()]);
        assert_eq!(
            require_single_winner_per_year(&t, "year_film", "winner"),
            Err(ValidationError::NullWinner("winner".into()))
        );
    }
}
