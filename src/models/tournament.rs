//! Tournament, TournamentStatus, and the crate-wide error type.

use crate::models::game::{MatchId, Zone};
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Fewer than 2 distinct participants after deduplication.
    NotEnoughParticipants { found: usize },
    TournamentNotFound(TournamentId),
    MatchNotFound(MatchId),
    ParticipantNotFound(ParticipantId),
    /// Reported winner is neither participant of the match.
    WinnerNotInMatch { match_id: MatchId, winner_id: ParticipantId },
    /// Match does not have both participants yet.
    MatchNotReady(MatchId),
    /// Match already has a winner.
    MatchAlreadyDecided(MatchId),
    /// A participant with this name already exists (names are unique, case-insensitive).
    DuplicateParticipantName(String),
    /// An earlier round of the same ladder still has an open match.
    EarlierRoundIncomplete { zone: Zone },
    /// A round feeding this match (winners dropouts or both brackets for the final) is unresolved.
    FeederRoundIncomplete { zone: Zone },
    /// Status may only move draft -> active -> completed.
    InvalidStatusTransition { from: TournamentStatus, to: TournamentStatus },
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// A slot already holds a different participant.
    SlotOccupied { match_id: MatchId },
    /// The bye sweep did not reach a fixed point within the configured number of steps.
    SweepLimitExceeded(usize),
    /// Participant CSV could not be read.
    Import(String),
    /// Persistence layer failure.
    Store(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::NotEnoughParticipants { found } => {
                write!(f, "Need at least 2 distinct participants to generate a bracket (found {})", found)
            }
            TournamentError::TournamentNotFound(id) => write!(f, "Tournament {} not found", id),
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::ParticipantNotFound(id) => write!(f, "Participant {} not found", id),
            TournamentError::WinnerNotInMatch { match_id, winner_id } => {
                write!(f, "Participant {} is not playing in match {}", winner_id, match_id)
            }
            TournamentError::MatchNotReady(id) => write!(f, "Match {} does not have both participants yet", id),
            TournamentError::MatchAlreadyDecided(id) => write!(f, "Match {} already has a winner", id),
            TournamentError::DuplicateParticipantName(name) => {
                write!(f, "A participant named {:?} already exists", name)
            }
            TournamentError::EarlierRoundIncomplete { zone } => {
                write!(f, "Complete earlier round first: {} has unfinished matches", zone)
            }
            TournamentError::FeederRoundIncomplete { zone } => {
                write!(f, "Complete feeding round first: {} is not fully resolved", zone)
            }
            TournamentError::InvalidStatusTransition { from, to } => {
                write!(f, "Cannot move tournament from {:?} to {:?}", from, to)
            }
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::SlotOccupied { match_id } => {
                write!(f, "Match {} already has a different participant in that slot", match_id)
            }
            TournamentError::SweepLimitExceeded(limit) => {
                write!(f, "Bye sweep did not settle after {} steps", limit)
            }
            TournamentError::Import(msg) => write!(f, "Import failed: {}", msg),
            TournamentError::Store(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Elimination format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    #[default]
    Single,
    Double,
}

/// Lifecycle of a tournament. Never moves backward.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Adding participants; no bracket yet.
    #[default]
    Draft,
    /// Bracket generated; results are being reported.
    Active,
    /// Terminal match decided.
    Completed,
}

impl TournamentStatus {
    /// Check a status change. Active -> Active is allowed so an active bracket can be regenerated.
    pub fn transition(self, to: TournamentStatus) -> Result<TournamentStatus, TournamentError> {
        use TournamentStatus::*;
        match (self, to) {
            (Draft, Active) | (Active, Active) | (Active, Completed) => Ok(to),
            (from, to) => Err(TournamentError::InvalidStatusTransition { from, to }),
        }
    }
}

/// A bracket competition.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub bracket_type: BracketType,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Draft status.
    pub fn new(name: impl Into<String>, bracket_type: BracketType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            bracket_type,
            status: TournamentStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}
