// src/clean/movies.rs

use crate::clean::SourceCleaner;
use crate::error::Result;
use crate::table::Table;
use crate::validate::{require_columns, require_numeric_column};
use std::path::{Path, PathBuf};

pub const MOVIES_COLUMNS: &[&str] = &[
    "rotten_tomatoes_link",
    "movie_title",
    "tomatometer_rating",
    "audience_rating",
];

const RATING_COLUMNS: [&str; 2] = ["tomatometer_rating", "audience_rating"];

/// Movie metadata: keeps movies that carry both ratings.
pub struct MoviesCleaner {
    source: PathBuf,
}

impl MoviesCleaner {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl SourceCleaner for MoviesCleaner {
    fn name(&self) -> &'static str {
        "movies"
    }

    fn keep_columns(&self) -> &'static [&'static str] {
        MOVIES_COLUMNS
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn clean(&self, data: Table) -> Result<Table> {
        RATING_COLUMNS
            .iter()
            .try_fold(data, |t, col| t.drop_nulls(col))
    }

    fn validate(&self, data: &Table) -> Result<()> {
        require_columns(data, self.keep_columns())?;
        for col in RATING_COLUMNS {
            require_numeric_column(data, col)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};
    use crate::table::Value;

    fn movies(tomatometer: Vec<Value>, audience: Vec<Value>) -> Table {
        Table::from_columns(vec![
            ("rotten_tomatoes_link", vec![1.into(), 2.into(), 3.into()]),
            (
                "movie_title",
                vec!["ABC123".into(), "Gone with the Wind".into(), 6.into()],
            ),
            ("tomatometer_rating", tomatometer),
            ("audience_rating", audience),
        ])
        .unwrap()
    }

    #[test]
    fn test_clean_drops_missing_ratings() {
        let cleaner = MoviesCleaner::new("unused.csv");
        let t = movies(
            vec![70.0.into(), 80.0.into(), 90.5.into()],
            vec![10.0.into(), Value::Null, "12".into()],
        );
        assert_eq!(cleaner.clean(t).unwrap().num_rows(), 2);

        let t = Table::from_columns(vec![
            ("tomatometer_rating", vec![Value::Null, 11.into(), 12.into()]),
            ("audience_rating", vec![Value::Null, Value::Null, "10/10".into()]),
        ])
        .unwrap();
        assert_eq!(cleaner.clean(t).unwrap().num_rows(), 1);
    }

    #[test]
    fn test_validate_passes() {
        let cleaner = MoviesCleaner::new("unused.csv");
        let t = movies(
            vec![100.0.into(), 95.0.into(), 85.0.into()],
            vec![98.0.into(), 85.0.into(), 100.0.into()],
        );
        assert!(cleaner.validate(&t).is_ok());
    }

    #[test]
    fn test_validate_failures() {
        let cleaner = MoviesCleaner::new("unused.csv");
        let good = || -> Vec<Value> { vec![85.0.into(), 95.0.into(), 85.0.into()] };

        let cases = vec![
            movies(good(), good()).select(&["rotten_tomatoes_link", "tomatometer_rating"]).unwrap(),
            movies(vec![Value::Null, 95.0.into(), 85.0.into()], good()),
            movies(good(), vec![98.0.into(), Value::Null, 100.0.into()]),
            movies(vec![85.0.into(), "A+".into(), 85.0.into()], good()),
            movies(good(), vec![98.0.into(), 85.0.into(), "A-".into()]),
        ];
        for t in cases {
            assert!(matches!(cleaner.validate(&t), Err(Error::Validation(_))));
        }

        let t = movies(good(), vec![98.0.into(), Value::Null, 100.0.into()]);
        assert!(matches!(
            cleaner.validate(&t),
            Err(Error::Validation(ValidationError::NullValues { ref column, count: 1 }))
                if column == "audience_rating"
        ));
    }
}
