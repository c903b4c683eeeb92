//! Standings aggregation: folds completed outcomes into per-team rows.
//!
//! Rows are rebuilt from the full outcome set on every call. Nothing is
//! carried between calls, so retries and manual record edits can never leave
//! a running total out of step with the stored results.

use log::error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{StandingsError, StandingsResult};
use crate::outcome::{MatchOutcome, MatchStatus, TeamId};

/// Points awarded for a win
pub const POINTS_FOR_WIN: u32 = 3;

/// Points awarded to each side for a draw
pub const POINTS_FOR_DRAW: u32 = 1;

/// Aggregated record for one team within a scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    /// Denormalized from the team registry at computation time
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl StandingsRow {
    /// Create an all-zero row for a team
    pub fn new(team_id: impl Into<TeamId>) -> Self {
        Self {
            team_id: team_id.into(),
            ..Default::default()
        }
    }

    /// Goals scored minus goals conceded
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Record one result from this team's point of view.
    ///
    /// Returns `None`, leaving the row untouched, if any total would overflow.
    fn record(&mut self, scored: u32, conceded: u32) -> Option<()> {
        let (wins, draws, losses, points) = match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => (1, 0, 0, POINTS_FOR_WIN),
            std::cmp::Ordering::Equal => (0, 1, 0, POINTS_FOR_DRAW),
            std::cmp::Ordering::Less => (0, 0, 1, 0),
        };

        let played = self.played.checked_add(1)?;
        let goals_for = self.goals_for.checked_add(scored)?;
        let goals_against = self.goals_against.checked_add(conceded)?;
        let points = self.points.checked_add(points)?;

        self.played = played;
        self.wins += wins;
        self.draws += draws;
        self.losses += losses;
        self.goals_for = goals_for;
        self.goals_against = goals_against;
        self.points = points;
        Some(())
    }
}

/// Fold completed outcomes into one row per participating team.
///
/// Teams with no completed matches are absent from the result; see
/// [`union_roster`] for callers that want them listed.
///
/// The result does not depend on the order of `outcomes`.
///
/// # Errors
///
/// * `StandingsError::PreconditionViolated` - an outcome is not completed or has no score,
///   or a team's totals would overflow
pub fn aggregate(outcomes: &[MatchOutcome]) -> StandingsResult<BTreeMap<TeamId, StandingsRow>> {
    let mut rows: BTreeMap<TeamId, StandingsRow> = BTreeMap::new();

    for outcome in outcomes {
        if outcome.status != MatchStatus::Completed {
            error!(
                "Outcome {} reached aggregation with status {}",
                outcome.match_id, outcome.status
            );
            return Err(StandingsError::PreconditionViolated(format!(
                "outcome {} is {}, only completed outcomes can be aggregated",
                outcome.match_id, outcome.status
            )));
        }

        let Some(score) = outcome.score else {
            error!("Completed outcome {} reached aggregation without a score", outcome.match_id);
            return Err(StandingsError::PreconditionViolated(format!(
                "completed outcome {} has no score",
                outcome.match_id
            )));
        };

        let sides = [
            (&outcome.home_team_id, score.home, score.away),
            (&outcome.away_team_id, score.away, score.home),
        ];

        for (team_id, scored, conceded) in sides {
            let recorded = rows
                .entry(team_id.clone())
                .or_insert_with(|| StandingsRow::new(team_id.clone()))
                .record(scored, conceded);

            if recorded.is_none() {
                error!(
                    "Totals for team {} overflow when adding outcome {}",
                    team_id, outcome.match_id
                );
                return Err(StandingsError::PreconditionViolated(format!(
                    "totals for team {} overflow at outcome {}",
                    team_id, outcome.match_id
                )));
            }
        }
    }

    Ok(rows)
}

/// Add an all-zero row for every roster team missing from `rows`
pub fn union_roster<I>(rows: &mut BTreeMap<TeamId, StandingsRow>, roster: I)
where
    I: IntoIterator<Item = TeamId>,
{
    for team_id in roster {
        rows.entry(team_id.clone())
            .or_insert_with(|| StandingsRow::new(team_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Stage;

    fn result(id: &str, home: &str, away: &str, home_goals: u32, away_goals: u32) -> MatchOutcome {
        MatchOutcome::completed(id, Stage::RegularSeason, home, away, home_goals, away_goals)
    }

    #[test]
    fn test_single_home_win() {
        let rows = aggregate(&[result("m1", "A", "B", 2, 1)]).unwrap();

        let a = &rows["A"];
        assert_eq!((a.played, a.wins, a.draws, a.losses), (1, 1, 0, 0));
        assert_eq!((a.goals_for, a.goals_against, a.points), (2, 1, 3));
        assert_eq!(a.goal_difference(), 1);

        let b = &rows["B"];
        assert_eq!((b.played, b.wins, b.draws, b.losses), (1, 0, 0, 1));
        assert_eq!((b.goals_for, b.goals_against, b.points), (1, 2, 0));
        assert_eq!(b.goal_difference(), -1);
    }

    #[test]
    fn test_draw_awards_one_point_each() {
        let rows = aggregate(&[result("m1", "A", "B", 1, 1)]).unwrap();

        for team in ["A", "B"] {
            let row = &rows[team];
            assert_eq!(row.played, 1);
            assert_eq!(row.draws, 1);
            assert_eq!(row.points, 1);
            assert_eq!(row.goal_difference(), 0);
        }
    }

    #[test]
    fn test_multiple_matches_accumulate() {
        let rows = aggregate(&[
            result("m1", "A", "B", 3, 0),
            result("m2", "B", "C", 2, 2),
            result("m3", "C", "A", 1, 0),
        ])
        .unwrap();

        let a = &rows["A"];
        assert_eq!((a.played, a.wins, a.losses, a.points), (2, 1, 1, 3));
        assert_eq!((a.goals_for, a.goals_against), (3, 1));

        let c = &rows["C"];
        assert_eq!((c.played, c.wins, c.draws, c.points), (2, 1, 1, 4));
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(aggregate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_scheduled_outcome_is_precondition_violation() {
        let mut scheduled = result("m1", "A", "B", 0, 0);
        scheduled.status = MatchStatus::Scheduled;
        scheduled.score = None;

        let err = aggregate(&[scheduled]).unwrap_err();
        assert!(matches!(err, StandingsError::PreconditionViolated(_)));
    }

    #[test]
    fn test_cancelled_outcome_fails_whole_batch() {
        let mut cancelled = result("m2", "C", "D", 1, 0);
        cancelled.status = MatchStatus::Cancelled;

        let err = aggregate(&[result("m1", "A", "B", 1, 0), cancelled]).unwrap_err();
        assert!(err.to_string().contains("m2"));
    }

    #[test]
    fn test_completed_without_score_is_precondition_violation() {
        let mut missing = result("m1", "A", "B", 0, 0);
        missing.score = None;

        let err = aggregate(&[missing]).unwrap_err();
        assert!(matches!(err, StandingsError::PreconditionViolated(_)));
    }

    #[test]
    fn test_goal_total_overflow_is_precondition_violation() {
        let huge = 3_000_000_000;
        let outcomes = [result("m1", "A", "B", huge, 0), result("m2", "A", "B", huge, 0)];

        let err = aggregate(&outcomes).unwrap_err();
        assert!(matches!(err, StandingsError::PreconditionViolated(_)));
        assert!(err.to_string().contains("m2"));
    }

    #[test]
    fn test_overflowing_result_leaves_row_untouched() {
        let mut row = StandingsRow::new("A");
        row.record(u32::MAX, 0).unwrap();

        assert!(row.record(1, 0).is_none());
        assert_eq!((row.played, row.wins, row.goals_for, row.points), (1, 1, u32::MAX, 3));
    }

    #[test]
    fn test_union_roster_adds_zero_rows_only_for_missing_teams() {
        let mut rows = aggregate(&[result("m1", "A", "B", 1, 0)]).unwrap();
        union_roster(&mut rows, ["A".to_string(), "Z".to_string()]);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows["A"].points, 3);
        assert_eq!(rows["Z"], StandingsRow::new("Z"));
    }
}
