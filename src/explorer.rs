//! Summary statistics over the staging tables, for a human deciding whether
//! the source snapshot looks sane before it is normalized. Nothing here is
//! persisted.

use crate::constants::{ALL_STAGING_TABLES, GAME_LOG_STAGING, TEAM_CODES_STAGING};
use crate::db::{display_value, quote_ident, Database};
use crate::error::{LoaderError, Result};
use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueDateRange {
    pub league: Option<String>,
    pub first_game: String,
    pub last_game: String,
    pub games: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueTeamCount {
    pub league: Option<String>,
    pub teams: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Franchise {
    pub franch_id: String,
    pub team_ids: Vec<String>,
}

/// Two team ids of one franchise whose active years intersect.
#[derive(Debug, Clone, Serialize)]
pub struct FranchiseOverlap {
    pub franch_id: String,
    pub first_team: String,
    pub first_years: (i64, i64),
    pub second_team: String,
    pub second_years: (i64, i64),
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport {
    pub staging_rows: Vec<TableCount>,
    pub games_without_home_league: i64,
    pub league_date_ranges: Vec<LeagueDateRange>,
    pub teams_per_league: Vec<LeagueTeamCount>,
    pub multi_team_franchises: Vec<Franchise>,
    pub franchise_overlaps: Vec<FranchiseOverlap>,
}

#[instrument(skip(db))]
pub fn explore(db: &Database) -> Result<ExplorationReport> {
    for table in [GAME_LOG_STAGING, TEAM_CODES_STAGING] {
        if !db.table_exists(table)? {
            return Err(LoaderError::StagingMissing(table.to_string()));
        }
    }

    let mut staging_rows = Vec::new();
    for table in ALL_STAGING_TABLES {
        if db.table_exists(table)? {
            staging_rows.push(TableCount {
                table: table.to_string(),
                rows: db.row_count(table)?,
            });
        }
    }

    let report = ExplorationReport {
        staging_rows,
        games_without_home_league: games_without_home_league(db)?,
        league_date_ranges: league_date_ranges(db)?,
        teams_per_league: teams_per_league(db)?,
        multi_team_franchises: multi_team_franchises(db)?,
        franchise_overlaps: franchise_overlaps(db)?,
    };

    info!(
        games_without_home_league = report.games_without_home_league,
        leagues = report.league_date_ranges.len(),
        franchises = report.multi_team_franchises.len(),
        "Exploration complete"
    );
    if !report.franchise_overlaps.is_empty() {
        warn!(
            overlaps = report.franchise_overlaps.len(),
            "Franchise ids shared by teams with overlapping years"
        );
    }
    Ok(report)
}

fn games_without_home_league(db: &Database) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE h_league IS NULL",
        quote_ident(GAME_LOG_STAGING)
    );
    Ok(db.conn().query_row(&sql, [], |row| row.get(0))?)
}

fn league_date_ranges(db: &Database) -> Result<Vec<LeagueDateRange>> {
    let sql = format!(
        "SELECT h_league, MIN(date), MAX(date), COUNT(*) FROM {} GROUP BY h_league ORDER BY MIN(date)",
        quote_ident(GAME_LOG_STAGING)
    );
    let mut stmt = db.conn().prepare(&sql)?;
    let ranges = stmt
        .query_map([], |row| {
            Ok(LeagueDateRange {
                league: row.get(0)?,
                first_game: format_game_date(&row.get::<_, Value>(1)?),
                last_game: format_game_date(&row.get::<_, Value>(2)?),
                games: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ranges)
}

fn teams_per_league(db: &Database) -> Result<Vec<LeagueTeamCount>> {
    let sql = format!(
        "SELECT league, COUNT(*) FROM {} GROUP BY league ORDER BY COUNT(*) DESC, league",
        quote_ident(TEAM_CODES_STAGING)
    );
    let mut stmt = db.conn().prepare(&sql)?;
    let counts = stmt
        .query_map([], |row| {
            Ok(LeagueTeamCount {
                league: row.get(0)?,
                teams: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts)
}

fn multi_team_franchises(db: &Database) -> Result<Vec<Franchise>> {
    let sql = format!(
        "SELECT franch_id, group_concat(team_id, ',') FROM {}
         WHERE franch_id IS NOT NULL
         GROUP BY franch_id
         HAVING COUNT(*) > 1
         ORDER BY COUNT(*) DESC, franch_id",
        quote_ident(TEAM_CODES_STAGING)
    );
    let mut stmt = db.conn().prepare(&sql)?;
    let franchises = stmt
        .query_map([], |row| {
            let joined: String = row.get(1)?;
            let mut team_ids: Vec<String> = joined.split(',').map(str::to_string).collect();
            team_ids.sort();
            Ok(Franchise {
                franch_id: row.get(0)?,
                team_ids,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(franchises)
}

/// Year ranges are inclusive, so a team ending in the year its successor
/// starts counts as an overlap.
fn franchise_overlaps(db: &Database) -> Result<Vec<FranchiseOverlap>> {
    let sql = format!(
        r#"
        SELECT a.franch_id, a.team_id, a.start, a."end", b.team_id, b.start, b."end"
        FROM {table} a
        JOIN {table} b ON a.franch_id = b.franch_id AND a.team_id < b.team_id
        WHERE a.start <= b."end" AND b.start <= a."end"
        ORDER BY a.franch_id, a.team_id, b.team_id
        "#,
        table = quote_ident(TEAM_CODES_STAGING)
    );
    let mut stmt = db.conn().prepare(&sql)?;
    let overlaps = stmt
        .query_map([], |row| {
            Ok(FranchiseOverlap {
                franch_id: row.get(0)?,
                first_team: row.get(1)?,
                first_years: (row.get(2)?, row.get(3)?),
                second_team: row.get(4)?,
                second_years: (row.get(5)?, row.get(6)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(overlaps)
}

/// Game-log dates are `YYYYMMDD`; anything else is shown as stored.
pub fn format_game_date(value: &Value) -> String {
    let raw = display_value(value);
    match NaiveDate::parse_from_str(&raw, "%Y%m%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => raw,
    }
}

impl ExplorationReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Staging tables:");
        for t in &self.staging_rows {
            let _ = writeln!(out, "   {:<24} {:>8} rows", t.table, t.rows);
        }
        let _ = writeln!(
            out,
            "\nGames without a home league: {}",
            self.games_without_home_league
        );
        let _ = writeln!(out, "\nLeagues (by first game):");
        for r in &self.league_date_ranges {
            let _ = writeln!(
                out,
                "   {:<4} {} to {} ({} games)",
                r.league.as_deref().unwrap_or("-"),
                r.first_game,
                r.last_game,
                r.games
            );
        }
        let _ = writeln!(out, "\nTeams per league:");
        for c in &self.teams_per_league {
            let _ = writeln!(out, "   {:<4} {}", c.league.as_deref().unwrap_or("-"), c.teams);
        }
        let _ = writeln!(
            out,
            "\nFranchises with more than one team id: {}",
            self.multi_team_franchises.len()
        );
        for f in &self.multi_team_franchises {
            let _ = writeln!(out, "   {:<4} {}", f.franch_id, f.team_ids.join(", "));
        }
        if self.franchise_overlaps.is_empty() {
            let _ = writeln!(out, "\nNo overlapping franchise year ranges");
        } else {
            let _ = writeln!(out, "\nOverlapping franchise year ranges:");
            for o in &self.franchise_overlaps {
                let _ = writeln!(
                    out,
                    "   {} {} {}-{} / {} {}-{}",
                    o.franch_id,
                    o.first_team,
                    o.first_years.0,
                    o.first_years.1,
                    o.second_team,
                    o.second_years.0,
                    o.second_years.1
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.run_batch(
            r#"
            CREATE TABLE game_log (date, h_league);
            INSERT INTO game_log VALUES
                (18710504, NULL), (18760422, 'NL'), (19010424, 'AL'), (19150412, 'NL');
            CREATE TABLE team_codes (team_id, league, start, "end", franch_id);
            INSERT INTO team_codes VALUES
                ('MLA', 'AL', 1901, 1901, 'BAL'),
                ('MIL', 'AL', 1902, 1953, 'BAL'),
                ('BAL', 'AL', 1954, 2010, 'BAL'),
                ('BOS', 'AL', 1901, 2010, 'BOS');
            "#,
        )
        .unwrap();
        db
    }

    #[test]
    fn test_format_game_date() {
        assert_eq!(format_game_date(&Value::Integer(18710504)), "1871-05-04");
        assert_eq!(format_game_date(&Value::Text("unknown".into())), "unknown");
        assert_eq!(format_game_date(&Value::Null), "NULL");
    }

    #[test]
    fn test_explore_summarizes_staging() {
        let db = staging();
        let report = explore(&db).unwrap();

        assert_eq!(report.games_without_home_league, 1);
        let nl = report
            .league_date_ranges
            .iter()
            .find(|r| r.league.as_deref() == Some("NL"))
            .unwrap();
        assert_eq!(nl.first_game, "1876-04-22");
        assert_eq!(nl.last_game, "1915-04-12");
        assert_eq!(nl.games, 2);

        assert_eq!(report.multi_team_franchises.len(), 1);
        assert_eq!(
            report.multi_team_franchises[0].team_ids,
            vec!["BAL", "MIL", "MLA"]
        );
        assert!(report.franchise_overlaps.is_empty());
        assert!(report.render_text().contains("No overlapping franchise year ranges"));
    }

    #[test]
    fn test_explore_flags_overlapping_franchise_years() {
        let db = staging();
        db.run_command("INSERT INTO team_codes VALUES ('SLA', 'AL', 1950, 1960, 'BAL')")
            .unwrap();
        let report = explore(&db).unwrap();
        assert_eq!(report.franchise_overlaps.len(), 2);
        assert!(report
            .franchise_overlaps
            .iter()
            .all(|o| o.franch_id == "BAL"));
    }

    #[test]
    fn test_explore_requires_staging() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            explore(&db).unwrap_err(),
            LoaderError::StagingMissing(_)
        ));
    }
}
