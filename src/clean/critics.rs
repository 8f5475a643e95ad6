// src/clean/critics.rs

use crate::clean::SourceCleaner;
use crate::error::Result;
use crate::score::normalize_value;
use crate::table::{Table, Value};
use crate::validate::{require_columns, require_numeric_column};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CRITICS_COLUMNS: &[&str] = &[
    "rotten_tomatoes_link",
    "critic_name",
    "top_critic",
    "review_type",
    "review_score",
];

pub const REVIEW_SCORE: &str = "review_score";

/// Critic reviews: keeps only reviews with a usable score, rescaled to 0-100.
pub struct CriticsCleaner {
    source: PathBuf,
}

impl CriticsCleaner {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl SourceCleaner for CriticsCleaner {
    fn name(&self) -> &'static str {
        "critics"
    }

    fn keep_columns(&self) -> &'static [&'static str] {
        CRITICS_COLUMNS
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn clean(&self, data: Table) -> Result<Table> {
        let data = data.drop_nulls(REVIEW_SCORE)?;
        let scored = data.num_rows();

        let data = data
            .try_map_column(REVIEW_SCORE, |_, v| {
                Ok(Value::from(normalize_value(v)?.value()))
            })?
            .drop_nulls(REVIEW_SCORE)?;

        debug!(
            unusable = scored - data.num_rows(),
            "dropped reviews without a usable score"
        );
        Ok(data)
    }

    fn validate(&self, data: &Table) -> Result<()> {
        require_columns(data, self.keep_columns())?;
        require_numeric_column(data, REVIEW_SCORE)?;
        Ok(())
    }
}
