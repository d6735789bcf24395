use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, info};

use mlb_loader::config::Config;
use mlb_loader::db::{Database, QueryResult};
use mlb_loader::pipeline::{self, Pipeline, RunOptions};
use mlb_loader::{explorer, loader, logging, metrics, normalize, schema};

#[derive(Parser)]
#[command(name = "mlb_loader")]
#[command(about = "Normalize baseball game logs into a relational SQLite database")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $MLB_LOADER_CONFIG or ./mlb_loader.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory holding the source CSV files, overriding the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: load, explore, schema, transform, cleanup
    Run {
        /// Leave the staging tables in place afterwards
        #[arg(long)]
        keep_staging: bool,
        /// Also record batting-order and fielding appearances
        #[arg(long)]
        lineups: bool,
    },
    /// Load the source files into staging tables
    Load,
    /// Print summary statistics of the staging tables
    Explore {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the normalized tables and seed the fixed enumerations
    Schema,
    /// Populate the normalized tables from staging
    Transform {
        /// Also record batting-order and fielding appearances
        #[arg(long)]
        lineups: bool,
    },
    /// Drop the staging tables
    Cleanup,
    /// List tables and views in the database
    Tables,
    /// Run an ad hoc read query
    Query {
        /// SQL to execute
        sql: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    if let Some(dir) = cli.data_dir {
        config.sources.dir = dir;
    }

    logging::init_logging(&config.logging);
    if config.metrics.enabled {
        metrics::init_metrics();
    }

    let db = Database::open(&config.database.path, config.database.foreign_keys)
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;

    if let Err(e) = dispatch(cli.command, &db, &config) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn dispatch(command: Commands, db: &Database, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            keep_staging,
            lineups,
        } => {
            let mut options = RunOptions::from(config);
            options.drop_staging &= !keep_staging;
            options.include_lineups |= lineups;

            let result = Pipeline::run(db, config, options).context("Pipeline failed")?;
            println!("\n📊 Pipeline Results:");
            for t in &result.loaded {
                println!("   Loaded {}: {} rows", t.table, t.rows);
            }
            println!("   Games: {}", result.transform.games);
            println!("   Team appearances: {}", result.transform.team_appearances);
            println!("   Person appearances: {}", result.transform.person_appearances);
            println!("   Dropped staging: {}", result.dropped_staging.len());
            println!("   Duration: {:.2}s", result.duration_secs);
            write_metrics_snapshot(config)?;
        }
        Commands::Load => {
            let loaded = loader::load_all(db, &config.sources).context("Load failed")?;
            for t in loaded {
                println!("{}: {} rows, {} columns", t.table, t.rows, t.columns);
            }
        }
        Commands::Explore { json } => {
            let report = explorer::explore(db)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Commands::Schema => {
            schema::build(db).context("Schema creation failed")?;
            println!("✅ Schema ready");
        }
        Commands::Transform { lineups } => {
            schema::build(db).context("Schema creation failed")?;
            let include_lineups = config.pipeline.include_lineups || lineups;
            let summary = normalize::run(db, include_lineups).context("Transform failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Cleanup => {
            let dropped = pipeline::drop_staging(db)?;
            info!(count = dropped.len(), "Cleanup finished");
            println!("Dropped: {}", dropped.join(", "));
        }
        Commands::Tables => {
            for t in db.show_tables()? {
                println!("{:<24} {}", t.name, t.kind);
            }
        }
        Commands::Query { sql } => {
            let result = db.run_query(&sql)?;
            print_table(&result);
        }
    }
    Ok(())
}

fn write_metrics_snapshot(config: &Config) -> anyhow::Result<()> {
    let Some(snapshot) = metrics::render() else {
        return Ok(());
    };
    match &config.metrics.snapshot_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, snapshot)
                .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
            println!("   Metrics: {}", path.display());
        }
        None => debug!("metrics snapshot:\n{}", snapshot),
    }
    Ok(())
}

fn print_table(result: &QueryResult) {
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    for row in &result.rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.len());
        }
    }
    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    println!("{}", render(&result.columns[..]));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &result.rows {
        println!("{}", render(&row[..]));
    }
    println!("({} rows)", result.rows.len());
}
