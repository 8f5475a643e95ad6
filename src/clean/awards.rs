// src/clean/awards.rs

use crate::clean::SourceCleaner;
use crate::error::{Error, Result};
use crate::table::{Table, Value};
use crate::validate::{require_columns, require_single_winner_per_year};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const AWARDS_COLUMNS: &[&str] = &["year_film", "category", "film", "winner"];

/// Category names that denote the top award across the ceremony's history.
pub const BEST_PICTURE_CATEGORIES: &[&str] = &[
    "BEST MOTION PICTURE",
    "BEST PICTURE",
    "OUTSTANDING PICTURE",
    "OUTSTANDING MOTION PICTURE",
    "Best Picture",
];

pub const YEAR: &str = "year_film";
pub const FILM: &str = "film";
pub const WINNER: &str = "winner";
pub const NUM_WINS: &str = "num_wins";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardsVariant {
    /// Nomination rows with a known winner flag.
    Base,
    /// Top-category rows only, one winner per year.
    BestCategory,
    /// Wins per `(year_film, film)`, as `year_film, film, num_wins`.
    AnyWin,
}

pub struct AwardsCleaner {
    source: PathBuf,
    variant: AwardsVariant,
}

impl AwardsCleaner {
    pub fn new(source: impl Into<PathBuf>, variant: AwardsVariant) -> Self {
        Self {
            source: source.into(),
            variant,
        }
    }

    pub fn variant(&self) -> AwardsVariant {
        self.variant
    }

    fn clean_base(data: Table) -> Result<Table> {
        data.drop_nulls(WINNER)
    }
}

fn winner_as_int(row: usize, v: &Value) -> Result<Value> {
    v.as_bool()
        .map(i64::from)
        .or_else(|| v.as_i64())
        .map(Value::Int)
        .ok_or_else(|| Error::NotInteger {
            column: WINNER.to_string(),
            row,
            value: v.to_string(),
        })
}

impl SourceCleaner for AwardsCleaner {
    fn name(&self) -> &'static str {
        match self.variant {
            AwardsVariant::Base => "awards",
            AwardsVariant::BestCategory => "awards_best_category",
            AwardsVariant::AnyWin => "awards_any_win",
        }
    }

    fn keep_columns(&self) -> &'static [&'static str] {
        AWARDS_COLUMNS
    }

    fn source(&self) -> &Path {
        &self.source
    }

    fn clean(&self, data: Table) -> Result<Table> {
        let data = Self::clean_base(data)?;
        match self.variant {
            AwardsVariant::Base => Ok(data),
            AwardsVariant::BestCategory => data
                .retain_in("category", BEST_PICTURE_CATEGORIES)?
                .drop_duplicates(),
            AwardsVariant::AnyWin => data
                .try_map_column(WINNER, winner_as_int)?
                .group_sum(&[YEAR, FILM], WINNER, NUM_WINS),
        }
    }

    fn validate(&self, data: &Table) -> Result<()> {
        match self.variant {
            AwardsVariant::Base => require_columns(data, AWARDS_COLUMNS)?,
            AwardsVariant::BestCategory => {
                require_columns(data, AWARDS_COLUMNS)?;
                require_single_winner_per_year(data, YEAR, WINNER)?;
            }
            // TODO: decide whether num_wins should be checked for negative counts
            AwardsVariant::AnyWin => debug!("aggregated wins table, skipping validation"),
        }
        Ok(())
    }
}
