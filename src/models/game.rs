//! Match (game), Slot, and Zone for bracket play.

use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// First persisted round number of the losers bracket.
pub const LOSERS_ROUND_BASE: u32 = 100;
/// Persisted round number of the grand final.
pub const GRAND_FINAL_ROUND: u32 = 1000;
/// Persisted round number of the bracket-reset final.
pub const BRACKET_RESET_ROUND: u32 = 1001;

/// Which part of the bracket a match belongs to, with its round inside that part.
///
/// The derived ordering is the same as the persisted round number, so sorting
/// by zone sorts winners rounds, then losers rounds, then the finals.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Zone {
    /// Winners bracket round, 1 = first round.
    Winners(u32),
    /// Losers bracket round, 1 = first round.
    Losers(u32),
    GrandFinal,
    BracketReset,
}

impl Zone {
    /// Round number as stored in the `round` column.
    pub fn round_number(self) -> u32 {
        match self {
            Zone::Winners(round) => round,
            Zone::Losers(round) => LOSERS_ROUND_BASE + round - 1,
            Zone::GrandFinal => GRAND_FINAL_ROUND,
            Zone::BracketReset => BRACKET_RESET_ROUND,
        }
    }

    /// Decode a stored round number. Returns `None` for 0 and for 1002 and above.
    pub fn from_round_number(round: u32) -> Option<Self> {
        match round {
            0 => None,
            1..LOSERS_ROUND_BASE => Some(Zone::Winners(round)),
            LOSERS_ROUND_BASE..GRAND_FINAL_ROUND => Some(Zone::Losers(round - LOSERS_ROUND_BASE + 1)),
            GRAND_FINAL_ROUND => Some(Zone::GrandFinal),
            BRACKET_RESET_ROUND => Some(Zone::BracketReset),
            _ => None,
        }
    }

    /// The next round in the same ladder. Finals have no next round.
    pub fn next(self) -> Option<Self> {
        match self {
            Zone::Winners(round) => Some(Zone::Winners(round + 1)),
            Zone::Losers(round) => Some(Zone::Losers(round + 1)),
            Zone::GrandFinal | Zone::BracketReset => None,
        }
    }

    pub fn is_winners(self) -> bool {
        matches!(self, Zone::Winners(_))
    }

    pub fn is_losers(self) -> bool {
        matches!(self, Zone::Losers(_))
    }

    /// True for both the grand final and the bracket reset.
    pub fn is_final(self) -> bool {
        matches!(self, Zone::GrandFinal | Zone::BracketReset)
    }
}

impl From<Zone> for u32 {
    fn from(zone: Zone) -> u32 {
        zone.round_number()
    }
}

impl TryFrom<u32> for Zone {
    type Error = String;

    fn try_from(round: u32) -> Result<Self, Self::Error> {
        Zone::from_round_number(round).ok_or_else(|| format!("invalid round number {round}"))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Winners(round) => write!(f, "winners round {round}"),
            Zone::Losers(round) => write!(f, "losers round {round}"),
            Zone::GrandFinal => write!(f, "grand final"),
            Zone::BracketReset => write!(f, "bracket reset"),
        }
    }
}

/// One of the two participant slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Slot fed by a match at `position` when two matches collapse into one:
    /// odd positions fill slot one, even positions slot two.
    pub fn for_position(position: u32) -> Self {
        if position % 2 == 1 {
            Slot::One
        } else {
            Slot::Two
        }
    }

    pub fn other(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// A single match between two participants. Empty slots are "to be determined" or byes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    #[serde(rename = "round")]
    pub zone: Zone,
    /// 1-based index within the round.
    pub position: u32,
    pub participant1_id: Option<ParticipantId>,
    pub participant2_id: Option<ParticipantId>,
    /// None if not yet played.
    pub winner_participant_id: Option<ParticipantId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        zone: Zone,
        position: u32,
        participant1_id: Option<ParticipantId>,
        participant2_id: Option<ParticipantId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            zone,
            position,
            participant1_id,
            participant2_id,
            winner_participant_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn participant(&self, slot: Slot) -> Option<ParticipantId> {
        match slot {
            Slot::One => self.participant1_id,
            Slot::Two => self.participant2_id,
        }
    }

    pub fn participant_mut(&mut self, slot: Slot) -> &mut Option<ParticipantId> {
        match slot {
            Slot::One => &mut self.participant1_id,
            Slot::Two => &mut self.participant2_id,
        }
    }

    /// Number of filled participant slots (0, 1 or 2).
    pub fn participant_count(&self) -> usize {
        usize::from(self.participant1_id.is_some()) + usize::from(self.participant2_id.is_some())
    }

    /// Both slots are filled, so a result can be reported.
    pub fn is_ready(&self) -> bool {
        self.participant_count() == 2
    }

    pub fn is_decided(&self) -> bool {
        self.winner_participant_id.is_some()
    }

    /// Ready to report but no winner yet.
    pub fn is_open(&self) -> bool {
        self.is_ready() && !self.is_decided()
    }

    pub fn has_participant(&self, id: ParticipantId) -> bool {
        self.participant1_id == Some(id) || self.participant2_id == Some(id)
    }

    /// The participant that did not win. None for undecided matches and byes.
    pub fn loser(&self) -> Option<ParticipantId> {
        let winner = self.winner_participant_id?;
        if self.participant1_id == Some(winner) {
            self.participant2_id
        } else {
            self.participant1_id
        }
    }

    /// The only filled slot, if exactly one is filled.
    pub fn lone_participant(&self) -> Option<(Slot, ParticipantId)> {
        match (self.participant1_id, self.participant2_id) {
            (Some(id), None) => Some((Slot::One, id)),
            (None, Some(id)) => Some((Slot::Two, id)),
            _ => None,
        }
    }
}
