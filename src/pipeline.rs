// src/pipeline.rs

use crate::archive::{extract_csv_archives, remove_archives};
use crate::clean::CleanerKind;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::merge::{guarded_inner_join, Growth};
use crate::table::{write::write_table, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::PathBuf,
};
use tracing::info;

pub const LINK: &str = "rotten_tomatoes_link";
pub const TITLE: &str = "movie_title";

pub const BEST_PICTURE_OUTPUT: &str = "best_picture_data";
pub const ANY_WIN_OUTPUT: &str = "any_win_data";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Row count after one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageCount>,
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    fn record(&mut self, stage: &str, table: &Table) {
        self.stages.push(StageCount {
            stage: stage.to_string(),
            rows: table.num_rows(),
        });
    }

    pub fn rows(&self, stage: &str) -> Option<usize> {
        self.stages.iter().find(|s| s.stage == stage).map(|s| s.rows)
    }
}

/// Cleaned inputs to the merge stage.
pub struct CleanSources {
    pub critics: Table,
    pub movies: Table,
    pub best_picture: Table,
    pub any_win: Table,
}

/// Title-anchored outputs.
#[derive(Debug)]
pub struct Enriched {
    pub critics: Table,
    pub best_picture: Table,
    pub any_win: Table,
}

/// Anchor critic reviews to movie titles, then attach them to both awards
/// tables. Awards titles that do not appear verbatim in the reviews are
/// dropped by the inner join and only logged.
pub fn enrich(sources: CleanSources) -> Result<Enriched> {
    let titles = sources.movies.select(&[LINK, TITLE])?.drop_duplicates()?;

    let critics = guarded_inner_join(&sources.critics, &titles, LINK, Growth::Forbidden)?;
    let dropped = sources.critics.num_rows() - critics.num_rows();
    if dropped > 0 {
        info!(dropped, "reviews dropped because they did not match a movie title");
    }

    let attach = |awards: Table, label: &str| -> Result<Table> {
        let awards = awards.rename("film", TITLE)?;
        let joined = guarded_inner_join(&awards, &critics, TITLE, Growth::Expected)?;
        let joined = joined.drop_duplicates()?;
        info!(
            output = label,
            awards_rows = awards.num_rows(),
            rows = joined.num_rows(),
            "attached reviews"
        );
        Ok(joined)
    };
    let best_picture = attach(sources.best_picture, BEST_PICTURE_OUTPUT)?;
    let any_win = attach(sources.any_win, ANY_WIN_OUTPUT)?;

    Ok(Enriched {
        critics,
        best_picture,
        any_win,
    })
}

/// Run every stage in order and persist the enriched tables.
/// The first failing stage aborts the run.
pub fn run(config: &PipelineConfig) -> Result<(Enriched, RunSummary)> {
    let mut summary = RunSummary {
        started_at: Utc::now(),
        finished_at: Utc::now(),
        stages: Vec::new(),
        outputs: Vec::new(),
    };

    if config.extract_archives {
        let extracted = extract_csv_archives(&config.data_dir)?;
        if !extracted.is_empty() && config.remove_archives {
            let removed = remove_archives(&config.data_dir)?;
            info!(removed, "removed extracted archives");
        }
    }

    let any_win = CleanerKind::AwardsAnyWin.build(config).run()?;
    summary.record("awards_any_win", &any_win);
    let best_picture = CleanerKind::AwardsBestCategory.build(config).run()?;
    summary.record("awards_best_category", &best_picture);
    let movies = CleanerKind::Movies.build(config).run()?;
    summary.record("movies", &movies);
    let critics = CleanerKind::Critics.build(config).run()?;
    summary.record("critics", &critics);

    let enriched = enrich(CleanSources {
        critics,
        movies,
        best_picture,
        any_win,
    })?;
    summary.record("critics_titled", &enriched.critics);
    summary.record(BEST_PICTURE_OUTPUT, &enriched.best_picture);
    summary.record(ANY_WIN_OUTPUT, &enriched.any_win);

    let fmt = config.output_format;
    info!("writing best picture data");
    summary.outputs.push(write_table(
        &enriched.best_picture,
        &config.output_dir,
        BEST_PICTURE_OUTPUT,
        fmt,
    )?);
    info!("writing any win data");
    summary.outputs.push(write_table(
        &enriched.any_win,
        &config.output_dir,
        ANY_WIN_OUTPUT,
        fmt,
    )?);

    summary.finished_at = Utc::now();
    if config.write_summary {
        fs::create_dir_all(&config.output_dir)?;
        let path = config.output_dir.join(SUMMARY_FILE);
        serde_json::to_writer_pretty(File::create(&path)?, &summary)?;
        info!(path = %path.display(), "wrote run summary");
    }

    Ok((enriched, summary))
}
