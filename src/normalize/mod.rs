//! Reshapes the staging tables into the normalized schema.
//!
//! Every statement is an `INSERT OR IGNORE ... SELECT` in autocommit mode, so a
//! run interrupted halfway can simply be repeated.

pub mod dimensions;
pub mod game;
pub mod person_appearance;
pub mod team_appearance;

use crate::constants::{GAME_LOG_STAGING, REQUIRED_STAGING_TABLES};
use crate::db::Database;
use crate::error::{LoaderError, Result};
use serde::Serialize;
use tracing::{info, instrument};

/// Which half of a game-log row a projection reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Visitor,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Visitor];

    /// Column prefix in the game log.
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Home => "h_",
            Side::Visitor => "v_",
        }
    }

    pub fn home_flag(self) -> i64 {
        match self {
            Side::Home => 1,
            Side::Visitor => 0,
        }
    }

    /// The game-log column holding this side's team id.
    pub fn team_column(self) -> String {
        format!("{}name", self.prefix())
    }
}

/// Rows newly inserted per normalized table during one transform run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformSummary {
    pub persons: usize,
    pub parks: usize,
    pub teams: usize,
    pub appearance_types: usize,
    pub games: usize,
    pub team_appearances: usize,
    pub person_appearances: usize,
}

/// Populate all normalized tables from staging. The schema must already exist.
#[instrument(skip(db))]
pub fn run(db: &Database, include_lineups: bool) -> Result<TransformSummary> {
    for table in REQUIRED_STAGING_TABLES {
        if !db.table_exists(table)? {
            return Err(LoaderError::StagingMissing(table.to_string()));
        }
    }
    check_game_log_columns(db, include_lineups)?;

    let mut summary = TransformSummary {
        persons: dimensions::insert_persons(db)?,
        parks: dimensions::insert_parks(db)?,
        teams: dimensions::insert_teams(db)?,
        appearance_types: dimensions::insert_appearance_types(db)?,
        ..TransformSummary::default()
    };

    game::synthesize_game_ids(db)?;
    summary.games = game::insert_games(db)?;
    summary.team_appearances = team_appearance::insert(db)?;
    summary.person_appearances = person_appearance::insert(db, include_lineups)?;

    info!(?summary, "Transform complete");
    Ok(summary)
}

/// A double-quoted name that matches no column is read by SQLite as a string
/// literal, so every column the generated SQL touches is checked first.
fn check_game_log_columns(db: &Database, include_lineups: bool) -> Result<()> {
    let mut columns: Vec<String> = game::SOURCE_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(team_appearance::source_columns());
    columns.extend(person_appearance::source_columns(include_lineups));
    for column in columns {
        if !db.column_exists(GAME_LOG_STAGING, &column)? {
            return Err(LoaderError::MissingColumn {
                table: GAME_LOG_STAGING.to_string(),
                column,
            });
        }
    }
    Ok(())
}
