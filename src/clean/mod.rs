// src/clean/mod.rs

pub mod awards;
pub mod critics;
pub mod movies;

pub use awards::{AwardsCleaner, AwardsVariant};
pub use critics::CriticsCleaner;
pub use movies::MoviesCleaner;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::table::{read::read_csv_table, Table};
use crate::validate::require_columns;
use std::path::Path;
use tracing::{info, info_span};

/// Read → clean → validate for one raw source.
///
/// `read` loads the source and keeps only [`SourceCleaner::keep_columns`];
/// `clean` reshapes and filters; `validate` checks the result. Failures from
/// any step propagate out of [`SourceCleaner::run`] untouched.
pub trait SourceCleaner {
    /// Short name used in logs and the run summary.
    fn name(&self) -> &'static str;

    /// Columns the cleaned table must contain.
    fn keep_columns(&self) -> &'static [&'static str];

    fn source(&self) -> &Path;

    fn read(&self) -> Result<Table> {
        read_csv_table(self.source())?.select(self.keep_columns())
    }

    fn clean(&self, data: Table) -> Result<Table>;

    fn validate(&self, data: &Table) -> Result<()> {
        require_columns(data, self.keep_columns())?;
        Ok(())
    }

    fn run(&self) -> Result<Table> {
        let _span = info_span!("cleaner", name = self.name()).entered();

        let raw = self.read()?;
        let raw_rows = raw.num_rows();
        let data = self.clean(raw)?;
        self.validate(&data)?;

        info!(raw_rows, clean_rows = data.num_rows(), "cleaned source");
        Ok(data)
    }
}

/// The closed set of source cleaners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanerKind {
    Critics,
    Movies,
    AwardsBase,
    AwardsBestCategory,
    AwardsAnyWin,
}

impl CleanerKind {
    pub const ALL: [CleanerKind; 5] = [
        CleanerKind::Critics,
        CleanerKind::Movies,
        CleanerKind::AwardsBase,
        CleanerKind::AwardsBestCategory,
        CleanerKind::AwardsAnyWin,
    ];

    /// Build the cleaner, pointing it at its file under `config.data_dir`.
    pub fn build(self, config: &PipelineConfig) -> Box<dyn SourceCleaner> {
        match self {
            CleanerKind::Critics => Box::new(CriticsCleaner::new(config.critics_path())),
            CleanerKind::Movies => Box::new(MoviesCleaner::new(config.movies_path())),
            CleanerKind::AwardsBase => Box::new(AwardsCleaner::new(
                config.awards_path(),
                AwardsVariant::Base,
            )),
            CleanerKind::AwardsBestCategory => Box::new(AwardsCleaner::new(
                config.awards_path(),
                AwardsVariant::BestCategory,
            )),
            CleanerKind::AwardsAnyWin => Box::new(AwardsCleaner::new(
                config.awards_path(),
                AwardsVariant::AnyWin,
            )),
        }
    }
}
