//! Canonical match outcome models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::StandingsError;

/// Team ID type
pub type TeamId = String;

/// Match ID type
pub type MatchId = String;

/// Tournament stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Regular season league phase
    RegularSeason,
    /// Mini-league group phase, always scoped by a group key
    MiniLeague,
    /// Finals fixtures, gated by publication
    Final,
}

impl Stage {
    /// Storage/wire name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RegularSeason => "regular_season",
            Stage::MiniLeague => "mini_league",
            Stage::Final => "final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StandingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "regular_season" => Ok(Stage::RegularSeason),
            "mini_league" => Ok(Stage::MiniLeague),
            "final" | "finals" => Ok(Stage::Final),
            other => Err(StandingsError::InvalidQuery(format!(
                "unknown stage '{other}'"
            ))),
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl MatchStatus {
    /// Parse a stored status value, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(MatchStatus::Scheduled),
            "completed" => Some(MatchStatus::Completed),
            "cancelled" | "canceled" => Some(MatchStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Final score of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }
}

/// Publication state of a finals fixture.
///
/// The only legal transition is `Unpublished -> Published`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    #[default]
    Unpublished,
    Published,
}

impl PublicationState {
    /// Apply the publish transition.
    ///
    /// Returns `true` if the state changed, `false` if it was already published.
    pub fn publish(&mut self) -> bool {
        match self {
            PublicationState::Unpublished => {
                *self = PublicationState::Published;
                true
            }
            PublicationState::Published => false,
        }
    }

    pub fn is_published(&self) -> bool {
        *self == PublicationState::Published
    }
}

impl From<bool> for PublicationState {
    fn from(is_published: bool) -> Self {
        if is_published {
            PublicationState::Published
        } else {
            PublicationState::Unpublished
        }
    }
}

/// Publication record carried by every finals outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalsPublication {
    /// Current publication state
    pub state: PublicationState,
    /// Rehearsal fixture, never shown to end users
    pub is_test: bool,
}

/// A normalized match outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub match_id: MatchId,
    pub stage: Stage,
    /// Mini-league bracket name (absent for the regular season)
    pub group_key: Option<String>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    /// Present for every completed outcome
    pub score: Option<Score>,
    pub status: MatchStatus,
    /// Present iff `stage == Stage::Final`
    pub publication: Option<FinalsPublication>,
    /// Display ordering only, never used for ranking
    pub played_at: Option<DateTime<Utc>>,
}

impl MatchOutcome {
    /// Create a completed outcome with a final score
    pub fn completed(
        match_id: impl Into<MatchId>,
        stage: Stage,
        home_team_id: impl Into<TeamId>,
        away_team_id: impl Into<TeamId>,
        home_score: u32,
        away_score: u32,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            stage,
            group_key: None,
            home_team_id: home_team_id.into(),
            away_team_id: away_team_id.into(),
            score: Some(Score::new(home_score, away_score)),
            status: MatchStatus::Completed,
            publication: (stage == Stage::Final).then(|| FinalsPublication {
                state: PublicationState::Unpublished,
                is_test: false,
            }),
            played_at: None,
        }
    }

    /// Set the mini-league group key
    pub fn in_group(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = Some(group_key.into());
        self
    }

    /// Whether this outcome belongs to the finals stage
    pub fn is_final(&self) -> bool {
        self.stage == Stage::Final
    }

    /// Whether this is a finals outcome that has been published
    pub fn is_published(&self) -> bool {
        self.publication
            .is_some_and(|publication| publication.state.is_published())
    }

    /// Whether this is a finals rehearsal fixture
    pub fn is_test(&self) -> bool {
        self.publication.is_some_and(|publication| publication.is_test)
    }
}
