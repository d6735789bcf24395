//! Destination schema for the normalized database.
//!
//! Tables are declared leaf-first: a table may only reference tables that
//! appear before it, so every foreign key target already exists when its
//! `CREATE TABLE` runs.

use crate::constants::{APPEARANCE_TYPES, LEAGUES};
use crate::db::Database;
use crate::error::{LoaderError, Result};
use crate::metrics;
use rusqlite::params;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub depends_on: &'static [&'static str],
    pub ddl: &'static str,
}

pub const LEAGUE: TableDef = TableDef {
    name: "league",
    depends_on: &[],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS league (
        league_id TEXT PRIMARY KEY,
        league_name TEXT
    )
    "#,
};

pub const PARK: TableDef = TableDef {
    name: "park",
    depends_on: &[],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS park (
        park_id TEXT PRIMARY KEY,
        name TEXT,
        nickname TEXT,
        city TEXT,
        state TEXT,
        notes TEXT
    )
    "#,
};

pub const PERSON: TableDef = TableDef {
    name: "person",
    depends_on: &[],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS person (
        person_id TEXT PRIMARY KEY,
        first_name TEXT,
        last_name TEXT
    )
    "#,
};

pub const APPEARANCE_TYPE: TableDef = TableDef {
    name: "appearance_type",
    depends_on: &[],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS appearance_type (
        appearance_type_id TEXT PRIMARY KEY,
        name TEXT,
        category TEXT
    )
    "#,
};

pub const TEAM: TableDef = TableDef {
    name: "team",
    depends_on: &["league"],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS team (
        team_id TEXT PRIMARY KEY,
        league_id TEXT,
        city TEXT,
        nickname TEXT,
        franch_id TEXT,
        FOREIGN KEY (league_id) REFERENCES league(league_id)
    )
    "#,
};

pub const GAME: TableDef = TableDef {
    name: "game",
    depends_on: &["park"],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS game (
        game_id TEXT PRIMARY KEY,
        date TEXT,
        number_of_game INTEGER,
        park_id TEXT,
        length_outs INTEGER,
        day BOOLEAN,
        completion TEXT,
        forfeit TEXT,
        protest TEXT,
        attendance INTEGER,
        length_minutes INTEGER,
        additional_info TEXT,
        acquisition TEXT,
        FOREIGN KEY (park_id) REFERENCES park(park_id)
    )
    "#,
};

pub const TEAM_APPEARANCE: TableDef = TableDef {
    name: "team_appearance",
    depends_on: &["team", "game", "league"],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS team_appearance (
        team_id TEXT,
        game_id TEXT,
        home BOOLEAN,
        league_id TEXT,
        score INTEGER,
        line_score TEXT,
        at_bats INTEGER,
        hits INTEGER,
        doubles INTEGER,
        triples INTEGER,
        homeruns INTEGER,
        rbi INTEGER,
        sacrifice_hits INTEGER,
        sacrifice_flies INTEGER,
        hit_by_pitch INTEGER,
        walks INTEGER,
        intentional_walks INTEGER,
        strikeouts INTEGER,
        stolen_bases INTEGER,
        caught_stealing INTEGER,
        grounded_into_double INTEGER,
        first_catcher_interference INTEGER,
        left_on_base INTEGER,
        pitchers_used INTEGER,
        individual_earned_runs INTEGER,
        team_earned_runs INTEGER,
        wild_pitches INTEGER,
        balks INTEGER,
        putouts INTEGER,
        assists INTEGER,
        errors INTEGER,
        passed_balls INTEGER,
        double_plays INTEGER,
        triple_plays INTEGER,
        PRIMARY KEY (team_id, game_id),
        FOREIGN KEY (team_id) REFERENCES team(team_id),
        FOREIGN KEY (game_id) REFERENCES game(game_id),
        FOREIGN KEY (league_id) REFERENCES league(league_id)
    )
    "#,
};

// appearance_id is a rowid alias assigned in insertion order. The unique index
// below is the natural key that makes re-runs a no-op; COALESCE folds the NULL
// umpire team so those rows dedupe too.
pub const PERSON_APPEARANCE: TableDef = TableDef {
    name: "person_appearance",
    depends_on: &["person", "team", "game", "appearance_type"],
    ddl: r#"
    CREATE TABLE IF NOT EXISTS person_appearance (
        appearance_id INTEGER PRIMARY KEY,
        person_id TEXT,
        team_id TEXT,
        game_id TEXT,
        appearance_type_id TEXT,
        FOREIGN KEY (person_id) REFERENCES person(person_id),
        FOREIGN KEY (team_id) REFERENCES team(team_id),
        FOREIGN KEY (game_id) REFERENCES game(game_id),
        FOREIGN KEY (appearance_type_id) REFERENCES appearance_type(appearance_type_id)
    );
    CREATE UNIQUE INDEX IF NOT EXISTS person_appearance_natural_key
        ON person_appearance (game_id, person_id, appearance_type_id, COALESCE(team_id, ''));
    "#,
};

/// Creation order for the normalized tables.
pub const TABLES: &[TableDef] = &[
    LEAGUE,
    PARK,
    PERSON,
    APPEARANCE_TYPE,
    TEAM,
    GAME,
    TEAM_APPEARANCE,
    PERSON_APPEARANCE,
];

/// Check that each table's dependencies are declared before it.
pub fn validate_order(tables: &[TableDef]) -> Result<()> {
    for (idx, table) in tables.iter().enumerate() {
        for dependency in table.depends_on {
            let declared_before = tables[..idx].iter().any(|t| t.name == *dependency);
            if !declared_before {
                return Err(LoaderError::SchemaOrder {
                    table: table.name.to_string(),
                    dependency: dependency.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Create every destination table and seed the fixed enumerations.
#[instrument(skip(db))]
pub fn build(db: &Database) -> Result<()> {
    validate_order(TABLES)?;
    for table in TABLES {
        db.run_batch(table.ddl)?;
        info!(table = table.name, "Ensured table");
    }
    seed_leagues(db)?;
    seed_appearance_types(db)?;
    Ok(())
}

fn seed_leagues(db: &Database) -> Result<()> {
    let mut stmt = db
        .conn()
        .prepare("INSERT OR IGNORE INTO league (league_id, league_name) VALUES (?1, ?2)")?;
    let mut inserted = 0;
    for (id, name) in LEAGUES {
        inserted += stmt.execute(params![id, name])?;
    }
    metrics::rows_inserted(LEAGUE.name, inserted);
    Ok(())
}

fn seed_appearance_types(db: &Database) -> Result<()> {
    let mut stmt = db.conn().prepare(
        "INSERT OR IGNORE INTO appearance_type (appearance_type_id, name, category) VALUES (?1, ?2, ?3)",
    )?;
    let mut inserted = 0;
    for (id, name, category) in APPEARANCE_TYPES {
        inserted += stmt.execute(params![id, name, category])?;
    }
    metrics::rows_inserted(APPEARANCE_TYPE.name, inserted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_order_is_leaf_first() {
        validate_order(TABLES).unwrap();
    }

    #[test]
    fn test_out_of_order_declaration_is_rejected() {
        let err = validate_order(&[TEAM, LEAGUE]).unwrap_err();
        match err {
            LoaderError::SchemaOrder { table, dependency } => {
                assert_eq!(table, "team");
                assert_eq!(dependency, "league");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_is_idempotent_and_seeds_leagues() {
        let db = Database::open_in_memory().unwrap();
        build(&db).unwrap();
        build(&db).unwrap();
        assert_eq!(db.row_count("league").unwrap(), 6);
        assert_eq!(
            db.row_count("appearance_type").unwrap(),
            APPEARANCE_TYPES.len() as i64
        );
        for table in TABLES {
            assert!(db.table_exists(table.name).unwrap(), "{} missing", table.name);
        }
    }

    #[test]
    fn test_league_names() {
        let db = Database::open_in_memory().unwrap();
        build(&db).unwrap();
        let name: String = db
            .conn()
            .query_row(
                "SELECT league_name FROM league WHERE league_id = 'UA'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(name, "Union Association");
    }
}
