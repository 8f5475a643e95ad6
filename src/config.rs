// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "RTCLEAN_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Where the raw sources live and where the enriched tables go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub critics_file: String,
    pub movies_file: String,
    pub awards_file: String,
    pub output_format: OutputFormat,
    /// Unpack `*.zip` dataset archives in `data_dir` before reading.
    pub extract_archives: bool,
    /// Delete the archives after a successful extraction.
    pub remove_archives: bool,
    /// Write `run_summary.json` next to the outputs.
    pub write_summary: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("data"),
            critics_file: "rotten_tomatoes_critic_reviews.csv".into(),
            movies_file: "rotten_tomatoes_movies.csv".into(),
            awards_file: "the_oscar_award.csv".into(),
            output_format: OutputFormat::Csv,
            extract_archives: true,
            remove_archives: false,
            write_summary: true,
        }
    }
}

impl PipelineConfig {
    /// Read a YAML config; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config: explicit path, then `RTCLEAN_CONFIG`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(p) => {
                info!(path = %p.display(), "loading config");
                Self::from_file(&p)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn critics_path(&self) -> PathBuf {
        self.data_dir.join(&self.critics_file)
    }

    pub fn movies_path(&self) -> PathBuf {
        self.data_dir.join(&self.movies_file)
    }

    pub fn awards_path(&self) -> PathBuf {
        self.data_dir.join(&self.awards_file)
    }
}
