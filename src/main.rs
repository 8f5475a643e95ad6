use anyhow::{Context, Result};
use rtclean::{config::PipelineConfig, pipeline};
use std::{env, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve config ───────────────────────────────────────────
    let explicit = env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(explicit.as_deref())?;
    info!(
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        format = config.output_format.extension(),
        "configured"
    );

    // ─── 3) clean, merge, write ──────────────────────────────────────
    let start = Instant::now();
    let (_, summary) = pipeline::run(&config).context("pipeline run failed")?;

    for path in &summary.outputs {
        info!(path = %path.display(), "output");
    }
    info!("done in {:?}", start.elapsed());
    Ok(())
}
