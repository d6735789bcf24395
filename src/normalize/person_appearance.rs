use super::Side;
use crate::constants::GAME_LOG_STAGING;
use crate::db::{quote_ident, Database};
use crate::error::Result;
use crate::metrics;
use tracing::{debug, info};

/// How a role's appearance is attributed to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamRule {
    /// Umpires belong to no team.
    Unaffiliated,
    Home,
    Visitor,
    /// Team with the higher score; the visitor on a tie.
    Winner,
    /// Home only when it scored strictly less; a tie goes to the visitor.
    Loser,
}

impl TeamRule {
    pub fn team_expr(self) -> &'static str {
        match self {
            TeamRule::Unaffiliated => "NULL",
            TeamRule::Home => "h_name",
            TeamRule::Visitor => "v_name",
            TeamRule::Winner => "CASE WHEN h_score > v_score THEN h_name ELSE v_name END",
            TeamRule::Loser => "CASE WHEN h_score < v_score THEN h_name ELSE v_name END",
        }
    }
}

/// One role column of the game log and the appearance it produces.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub column: &'static str,
    pub code: &'static str,
    pub team: TeamRule,
}

const fn rule(column: &'static str, code: &'static str, team: TeamRule) -> RoleRule {
    RoleRule { column, code, team }
}

pub const ROLE_RULES: &[RoleRule] = &[
    rule("hp_umpire_id", "UHP", TeamRule::Unaffiliated),
    rule("1b_umpire_id", "U1B", TeamRule::Unaffiliated),
    rule("2b_umpire_id", "U2B", TeamRule::Unaffiliated),
    rule("3b_umpire_id", "U3B", TeamRule::Unaffiliated),
    rule("lf_umpire_id", "ULF", TeamRule::Unaffiliated),
    rule("rf_umpire_id", "URF", TeamRule::Unaffiliated),
    rule("v_manager_id", "MM", TeamRule::Visitor),
    rule("h_manager_id", "MM", TeamRule::Home),
    rule("winning_pitcher_id", "AWP", TeamRule::Winner),
    rule("losing_pitcher_id", "ALP", TeamRule::Loser),
    rule("saving_pitcher_id", "ASP", TeamRule::Winner),
    rule("winning_rbi_batter_id", "AWB", TeamRule::Winner),
    rule("v_starting_pitcher_id", "PSP", TeamRule::Visitor),
    rule("h_starting_pitcher_id", "PSP", TeamRule::Home),
];

/// Batting-order slots recorded per side in the game log.
pub const LINEUP_SLOTS: std::ops::RangeInclusive<u8> = 1..=9;

/// A single `(game_id, team_id, person_id, appearance_type_id)` projection.
#[derive(Debug, Clone)]
pub struct Branch {
    pub label: String,
    pub select: String,
}

impl RoleRule {
    pub fn branch(&self) -> Branch {
        let column = quote_ident(self.column);
        Branch {
            label: format!("{} ({})", self.code, self.column),
            select: format!(
                "SELECT game_id, {team}, {column}, '{code}' FROM {table} WHERE {column} IS NOT NULL",
                team = self.team.team_expr(),
                code = self.code,
                table = quote_ident(GAME_LOG_STAGING),
            ),
        }
    }
}

fn player_column(side: Side, slot: u8, field: &str) -> String {
    format!("{}player_{}_{}", side.prefix(), slot, field)
}

/// Batting slot (`O1`..`O9`) and fielding position (`D1`..`D10`) rows for every
/// starting player, attributed to the player's own side.
pub fn lineup_branches() -> Vec<Branch> {
    let table = quote_ident(GAME_LOG_STAGING);
    let mut branches = Vec::new();
    for side in [Side::Visitor, Side::Home] {
        let team = quote_ident(&side.team_column());
        for slot in LINEUP_SLOTS {
            let id = quote_ident(&player_column(side, slot, "id"));
            let def_pos = quote_ident(&player_column(side, slot, "def_pos"));
            branches.push(Branch {
                label: format!("O{slot} ({}player_{slot})", side.prefix()),
                select: format!(
                    "SELECT game_id, {team}, {id}, 'O{slot}' FROM {table} WHERE {id} IS NOT NULL"
                ),
            });
            branches.push(Branch {
                label: format!("D ({}player_{slot})", side.prefix()),
                select: format!(
                    "SELECT game_id, {team}, {id}, 'D' || CAST({def_pos} AS INTEGER) FROM {table} \
                     WHERE {id} IS NOT NULL AND {def_pos} IS NOT NULL"
                ),
            });
        }
    }
    branches
}

pub fn branches(include_lineups: bool) -> Vec<Branch> {
    let mut branches: Vec<Branch> = ROLE_RULES.iter().map(RoleRule::branch).collect();
    if include_lineups {
        branches.extend(lineup_branches());
    }
    branches
}

pub fn source_columns(include_lineups: bool) -> Vec<String> {
    let mut columns: Vec<String> = ROLE_RULES.iter().map(|r| r.column.to_string()).collect();
    columns.extend(["h_score", "v_score"].map(String::from));
    if include_lineups {
        for side in Side::BOTH {
            for slot in LINEUP_SLOTS {
                columns.push(player_column(side, slot, "id"));
                columns.push(player_column(side, slot, "def_pos"));
            }
        }
    }
    columns
}

fn insert_sql(branch: &Branch) -> String {
    format!(
        "INSERT OR IGNORE INTO person_appearance (game_id, team_id, person_id, appearance_type_id)\n{}",
        branch.select
    )
}

/// Unpivot the role columns, one statement per branch. Appearance ids follow
/// insertion order; rows already present under the natural key are skipped.
pub fn insert(db: &Database, include_lineups: bool) -> Result<usize> {
    let mut inserted = 0;
    for branch in branches(include_lineups) {
        let rows = db.run_command(&insert_sql(&branch))?;
        debug!(branch = %branch.label, rows, "Inserted person appearances");
        inserted += rows;
    }
    info!(table = "person_appearance", inserted, "Inserted rows");
    metrics::rows_inserted("person_appearance", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourteen_role_columns() {
        assert_eq!(ROLE_RULES.len(), 14);
        let umpires = ROLE_RULES
            .iter()
            .filter(|r| r.team == TeamRule::Unaffiliated)
            .count();
        assert_eq!(umpires, 6);
    }

    #[test]
    fn test_every_role_code_is_seeded() {
        for rule in ROLE_RULES {
            assert!(
                crate::constants::APPEARANCE_TYPES
                    .iter()
                    .any(|(id, _, _)| *id == rule.code),
                "{} not seeded",
                rule.code
            );
        }
    }

    #[test]
    fn test_umpire_branch_quotes_digit_leading_column() {
        let branch = ROLE_RULES[1].branch();
        assert_eq!(
            branch.select,
            "SELECT game_id, NULL, \"1b_umpire_id\", 'U1B' FROM \"game_log\" WHERE \"1b_umpire_id\" IS NOT NULL"
        );
    }

    #[test]
    fn test_loser_rule_uses_strict_comparison() {
        assert_eq!(
            TeamRule::Loser.team_expr(),
            "CASE WHEN h_score < v_score THEN h_name ELSE v_name END"
        );
    }

    #[test]
    fn test_lineup_branches_are_optional() {
        assert_eq!(branches(false).len(), 14);
        // two branches per slot per side
        assert_eq!(branches(true).len(), 14 + 2 * 9 * 2);
        assert_eq!(source_columns(true).len(), 16 + 2 * 9 * 2);
    }
}
