//! Tie-break ranking of standings rows.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::aggregator::StandingsRow;
use crate::outcome::TeamId;

/// Comparison keys, applied in order until one separates two rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankCriteria {
    /// More points first
    Points,
    /// Better goal difference first
    GoalDifference,
    /// More goals scored first
    GoalsScored,
    /// Team name ascending, case-insensitive ordinal comparison
    TeamName,
    /// Team id ascending; only reached when two names differ by case alone
    TeamId,
}

/// The league cascade. No head-to-head or disciplinary keys.
pub const TIE_BREAK_CASCADE: [RankCriteria; 5] = [
    RankCriteria::Points,
    RankCriteria::GoalDifference,
    RankCriteria::GoalsScored,
    RankCriteria::TeamName,
    RankCriteria::TeamId,
];

fn compare_points(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points.cmp(&a.points)
}

fn compare_goal_difference(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.goal_difference().cmp(&a.goal_difference())
}

fn compare_goals_scored(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.goals_for.cmp(&a.goals_for)
}

// Unicode simple lowercasing is locale-independent, and char-by-char
// comparison is ordinal.
fn compare_team_name(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    a.team_name
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.team_name.chars().flat_map(char::to_lowercase))
}

fn compare_team_id(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    a.team_id.cmp(&b.team_id)
}

impl RankCriteria {
    /// Compare two rows under this single key
    pub fn compare(&self, a: &StandingsRow, b: &StandingsRow) -> Ordering {
        match self {
            RankCriteria::Points => compare_points(a, b),
            RankCriteria::GoalDifference => compare_goal_difference(a, b),
            RankCriteria::GoalsScored => compare_goals_scored(a, b),
            RankCriteria::TeamName => compare_team_name(a, b),
            RankCriteria::TeamId => compare_team_id(a, b),
        }
    }
}

/// Compare two rows under the full cascade
pub fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    TIE_BREAK_CASCADE
        .iter()
        .map(|criteria| criteria.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Order rows best-first
pub fn rank(rows: BTreeMap<TeamId, StandingsRow>) -> Vec<StandingsRow> {
    let mut ranked: Vec<StandingsRow> = rows.into_values().collect();
    ranked.sort_by(compare_rows);
    ranked
}
