use super::Side;
use crate::constants::GAME_LOG_STAGING;
use crate::db::{quote_ident, Database};
use crate::error::Result;
use crate::metrics;
use tracing::info;

/// Box-score columns as (team_appearance column, game-log suffix). The source
/// column is the suffix behind the side prefix, e.g. `h_hits`.
pub const BOX_SCORE_COLUMNS: &[(&str, &str)] = &[
    ("league_id", "league"),
    ("score", "score"),
    ("line_score", "line_score"),
    ("at_bats", "at_bats"),
    ("hits", "hits"),
    ("doubles", "doubles"),
    ("triples", "triples"),
    ("homeruns", "homeruns"),
    ("rbi", "rbi"),
    ("sacrifice_hits", "sacrifice_hits"),
    ("sacrifice_flies", "sacrifice_flies"),
    ("hit_by_pitch", "hit_by_pitch"),
    ("walks", "walks"),
    ("intentional_walks", "intentional_walks"),
    ("strikeouts", "strikeouts"),
    ("stolen_bases", "stolen_bases"),
    ("caught_stealing", "caught_stealing"),
    ("grounded_into_double", "grounded_into_double"),
    ("first_catcher_interference", "first_catcher_interference"),
    ("left_on_base", "left_on_base"),
    ("pitchers_used", "pitchers_used"),
    ("individual_earned_runs", "individual_earned_runs"),
    ("team_earned_runs", "team_earned_runs"),
    ("wild_pitches", "wild_pitches"),
    ("balks", "balks"),
    ("putouts", "putouts"),
    ("assists", "assists"),
    ("errors", "errors"),
    ("passed_balls", "passed_balls"),
    ("double_plays", "double_plays"),
    ("triple_plays", "triple_plays"),
];

pub fn source_columns() -> Vec<String> {
    Side::BOTH
        .iter()
        .flat_map(|side| {
            std::iter::once(side.team_column()).chain(
                BOX_SCORE_COLUMNS
                    .iter()
                    .map(move |(_, suffix)| format!("{}{}", side.prefix(), suffix)),
            )
        })
        .collect()
}

/// One team's view of every game: its team id, the game, a literal home flag
/// and its half of the box score.
pub fn projection(side: Side) -> String {
    let stats = BOX_SCORE_COLUMNS
        .iter()
        .map(|(_, suffix)| quote_ident(&format!("{}{}", side.prefix(), suffix)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {}, game_id, {} AS home, {} FROM {}",
        quote_ident(&side.team_column()),
        side.home_flag(),
        stats,
        quote_ident(GAME_LOG_STAGING)
    )
}

/// Wide to long: one source row becomes a home row and a visitor row.
pub fn insert_sql() -> String {
    let columns = BOX_SCORE_COLUMNS
        .iter()
        .map(|(column, _)| *column)
        .collect::<Vec<_>>()
        .join(", ");
    let branches = Side::BOTH
        .iter()
        .map(|side| projection(*side))
        .collect::<Vec<_>>()
        .join("\nUNION ALL\n");
    format!("INSERT OR IGNORE INTO team_appearance (team_id, game_id, home, {columns})\n{branches}")
}

pub fn insert(db: &Database) -> Result<usize> {
    let inserted = db.run_command(&insert_sql())?;
    info!(table = "team_appearance", inserted, "Inserted rows");
    metrics::rows_inserted("team_appearance", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_score_has_every_stat() {
        // league, score and line score plus 28 counting stats
        assert_eq!(BOX_SCORE_COLUMNS.len(), 31);
        assert_eq!(source_columns().len(), 2 * 32);
    }

    #[test]
    fn test_projection_reads_its_own_side() {
        let home = projection(Side::Home);
        assert!(home.starts_with("SELECT \"h_name\", game_id, 1 AS home"));
        assert!(home.contains("\"h_triple_plays\""));
        assert!(!home.contains("\"v_"));

        let visitor = projection(Side::Visitor);
        assert!(visitor.contains("0 AS home"));
        assert!(visitor.contains("\"v_league\""));
        assert!(!visitor.contains("\"h_"));
    }

    #[test]
    fn test_insert_sql_unions_both_sides() {
        let sql = insert_sql();
        assert_eq!(sql.matches("UNION ALL").count(), 1);
        assert!(sql.contains("(team_id, game_id, home, league_id, score, line_score"));
    }
}
