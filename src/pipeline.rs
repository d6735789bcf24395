use crate::config::Config;
use crate::constants::ALL_STAGING_TABLES;
use crate::db::Database;
use crate::error::Result;
use crate::explorer::{self, ExplorationReport};
use crate::loader::{self, LoadedTable};
use crate::metrics;
use crate::normalize::{self, TransformSummary};
use crate::schema;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

/// Options that the CLI can override per invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub drop_staging: bool,
    pub include_lineups: bool,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            drop_staging: config.pipeline.drop_staging,
            include_lineups: config.pipeline.include_lineups,
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub loaded: Vec<LoadedTable>,
    pub exploration: ExplorationReport,
    pub transform: TransformSummary,
    pub dropped_staging: Vec<String>,
    pub duration_secs: f64,
}

pub struct Pipeline;

impl Pipeline {
    /// Load, explore, build the schema, normalize, then drop staging.
    #[instrument(skip(db, config))]
    pub fn run(db: &Database, config: &Config, options: RunOptions) -> Result<PipelineResult> {
        let t_pipeline = Instant::now();
        info!("Starting pipeline");

        let loaded = timed("load", || loader::load_all(db, &config.sources))?;
        let exploration = timed("explore", || explorer::explore(db))?;
        timed("schema", || schema::build(db))?;
        let transform = timed("transform", || normalize::run(db, options.include_lineups))?;
        let dropped_staging = if options.drop_staging {
            timed("cleanup", || drop_staging(db))?
        } else {
            info!("Keeping staging tables");
            Vec::new()
        };

        let duration_secs = t_pipeline.elapsed().as_secs_f64();
        info!(duration_secs, "Pipeline finished");
        Ok(PipelineResult {
            loaded,
            exploration,
            transform,
            dropped_staging,
            duration_secs,
        })
    }
}

/// Drop every staging table. Irreversible: a later transform needs a fresh load.
#[instrument(skip(db))]
pub fn drop_staging(db: &Database) -> Result<Vec<String>> {
    let mut dropped = Vec::new();
    for table in ALL_STAGING_TABLES {
        if db.table_exists(table)? {
            db.drop_table(table)?;
            info!(table, "Dropped staging table");
            dropped.push(table.to_string());
        }
    }
    Ok(dropped)
}

fn timed<T>(step: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let out = f()?;
    metrics::step_duration(step, start.elapsed().as_secs_f64());
    Ok(out)
}
