use crate::constants::GAME_LOG_STAGING;
use crate::db::{quote_ident, Database};
use crate::error::Result;
use crate::metrics;
use tracing::info;

/// Game-log columns read by the game id synthesis and the game projection.
pub const SOURCE_COLUMNS: &[&str] = &[
    "date",
    "h_name",
    "number_of_game",
    "park_id",
    "length_outs",
    "day_night",
    "completion",
    "forefeit",
    "protest",
    "attendance",
    "length_minutes",
    "additional_info",
    "acquisition_info",
];

/// Add and fill `game_id` on the staging game log: date, home team, game number.
/// Rows that already carry an id keep it.
pub fn synthesize_game_ids(db: &Database) -> Result<usize> {
    if db.ensure_column(GAME_LOG_STAGING, "game_id", "TEXT")? {
        info!("Added game_id column to staging game log");
    }
    let updated = db.run_command(&format!(
        r#"
        UPDATE {}
        SET game_id = date || h_name || number_of_game
        WHERE game_id IS NULL
        "#,
        quote_ident(GAME_LOG_STAGING)
    ))?;
    info!(updated, "Synthesized game ids");
    Ok(updated)
}

pub fn insert_sql() -> String {
    format!(
        r#"
        INSERT OR IGNORE INTO game (
            game_id, date, number_of_game, park_id, length_outs, day,
            completion, forfeit, protest, attendance, length_minutes,
            additional_info, acquisition
        )
        SELECT
            game_id,
            date,
            number_of_game,
            park_id,
            length_outs,
            CASE
                WHEN day_night = 'D' THEN 1
                WHEN day_night = 'N' THEN 0
                ELSE NULL
            END AS day,
            completion,
            forefeit,
            protest,
            attendance,
            length_minutes,
            additional_info,
            acquisition_info
        FROM {}
        "#,
        quote_ident(GAME_LOG_STAGING)
    )
}

pub fn insert_games(db: &Database) -> Result<usize> {
    let inserted = db.run_command(&insert_sql())?;
    info!(table = "game", inserted, "Inserted rows");
    metrics::rows_inserted("game", inserted);
    Ok(inserted)
}
