use crate::constants::{
    APPEARANCE_TYPE_STAGING, PARK_CODES_STAGING, PERSON_CODES_STAGING, TEAM_CODES_STAGING,
};
use crate::db::{quote_ident, Database};
use crate::error::Result;
use crate::metrics;
use tracing::{debug, info};

pub fn insert_persons(db: &Database) -> Result<usize> {
    let sql = format!(
        r#"
        INSERT OR IGNORE INTO person (person_id, first_name, last_name)
        SELECT id, first, last
        FROM {}
        "#,
        quote_ident(PERSON_CODES_STAGING)
    );
    record("person", db.run_command(&sql)?)
}

pub fn insert_parks(db: &Database) -> Result<usize> {
    let sql = format!(
        r#"
        INSERT OR IGNORE INTO park (park_id, name, nickname, city, state, notes)
        SELECT park_id, name, aka, city, state, notes
        FROM {}
        "#,
        quote_ident(PARK_CODES_STAGING)
    );
    record("park", db.run_command(&sql)?)
}

pub fn insert_teams(db: &Database) -> Result<usize> {
    let sql = format!(
        r#"
        INSERT OR IGNORE INTO team (team_id, league_id, city, nickname, franch_id)
        SELECT team_id, league, city, nickname, franch_id
        FROM {}
        "#,
        quote_ident(TEAM_CODES_STAGING)
    );
    record("team", db.run_command(&sql)?)
}

/// Adds role codes from the optional appearance-type file on top of the
/// built-in seed. Nothing to do when that file was not loaded.
pub fn insert_appearance_types(db: &Database) -> Result<usize> {
    if !db.table_exists(APPEARANCE_TYPE_STAGING)? {
        debug!("No appearance type staging table; using built-in codes only");
        return Ok(0);
    }
    let sql = format!(
        r#"
        INSERT OR IGNORE INTO appearance_type (appearance_type_id, name, category)
        SELECT appearance_type_id, name, category
        FROM {}
        "#,
        quote_ident(APPEARANCE_TYPE_STAGING)
    );
    record("appearance_type", db.run_command(&sql)?)
}

fn record(table: &str, inserted: usize) -> Result<usize> {
    info!(table, inserted, "Inserted rows");
    metrics::rows_inserted(table, inserted);
    Ok(inserted)
}
