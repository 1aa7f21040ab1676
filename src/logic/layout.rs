//! Bracket sizing: bracket size, round counts, and where every slot is fed from.
//!
//! Losers round `k` receives winners-bracket dropouts when `k` is even (and in
//! round 1, which is built entirely from winners round 1 losers). Odd rounds
//! after the first only advance losers-bracket winners, halving the field.

use crate::models::{BracketType, ParticipantId, Slot, TournamentError, Zone};

/// Where a match slot gets its participant from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotSource {
    /// Filled at generation (winners round 1). Empty means bye.
    Entry,
    WinnerOf(Zone, u32),
    LoserOf(Zone, u32),
    /// Bracket reset: filled only if the losers champion takes the grand final.
    Conditional,
}

/// Shape of a bracket for a given participant count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BracketLayout {
    pub bracket_type: BracketType,
    /// Participant slots in winners round 1, always a power of two.
    pub bracket_size: u32,
    pub winners_rounds: u32,
}

impl BracketLayout {
    /// Layout for `participant_count` entrants. Needs at least 2.
    pub fn new(bracket_type: BracketType, participant_count: usize) -> Result<Self, TournamentError> {
        if participant_count < 2 {
            return Err(TournamentError::NotEnoughParticipants {
                found: participant_count,
            });
        }
        let bracket_size = u32::try_from(participant_count)
            .ok()
            .and_then(u32::checked_next_power_of_two)
            .ok_or(TournamentError::InvalidState)?;
        Ok(Self::from_size(bracket_type, bracket_size))
    }

    /// Layout for a known power-of-two bracket size.
    pub fn from_size(bracket_type: BracketType, bracket_size: u32) -> Self {
        Self {
            bracket_type,
            bracket_size,
            winners_rounds: bracket_size.trailing_zeros(),
        }
    }

    pub fn losers_rounds(&self) -> u32 {
        match self.bracket_type {
            BracketType::Single => 0,
            BracketType::Double => 2 * self.winners_rounds.saturating_sub(1),
        }
    }

    /// Number of matches in a round; 0 for rounds this bracket does not have.
    pub fn matches_in(&self, zone: Zone) -> u32 {
        match zone {
            Zone::Winners(round) if (1..=self.winners_rounds).contains(&round) => self.bracket_size >> round,
            Zone::Losers(round) if (1..=self.losers_rounds()).contains(&round) => {
                self.bracket_size >> (round.div_ceil(2) + 1)
            }
            Zone::GrandFinal | Zone::BracketReset if self.bracket_type == BracketType::Double => 1,
            _ => 0,
        }
    }

    /// Every round of the bracket, in play order.
    pub fn zones(&self) -> Vec<Zone> {
        let mut zones: Vec<Zone> = (1..=self.winners_rounds).map(Zone::Winners).collect();
        zones.extend((1..=self.losers_rounds()).map(Zone::Losers));
        if self.bracket_type == BracketType::Double {
            zones.push(Zone::GrandFinal);
            zones.push(Zone::BracketReset);
        }
        zones
    }

    pub fn total_matches(&self) -> u32 {
        self.zones().into_iter().map(|zone| self.matches_in(zone)).sum()
    }

    pub fn winners_final(&self) -> Zone {
        Zone::Winners(self.winners_rounds)
    }

    /// None when there is no losers bracket (single elimination, or a 2-slot double bracket).
    pub fn losers_final(&self) -> Option<Zone> {
        match self.losers_rounds() {
            0 => None,
            rounds => Some(Zone::Losers(rounds)),
        }
    }

    /// Winners round 1 slot array: participants in order, byes (None) after them.
    pub fn slots(&self, ordered: &[ParticipantId]) -> Vec<Option<ParticipantId>> {
        let mut slots: Vec<Option<ParticipantId>> = ordered.iter().copied().map(Some).collect();
        slots.resize(self.bracket_size as usize, None);
        slots
    }

    /// Feeders of both slots of the match at `zone`/`position`.
    pub fn sources(&self, zone: Zone, position: u32) -> [SlotSource; 2] {
        use SlotSource::*;
        match zone {
            Zone::Winners(0 | 1) => [Entry, Entry],
            Zone::Winners(round) => {
                let prev = Zone::Winners(round - 1);
                [WinnerOf(prev, 2 * position - 1), WinnerOf(prev, 2 * position)]
            }
            Zone::Losers(0 | 1) => {
                let first = Zone::Winners(1);
                [LoserOf(first, 2 * position - 1), LoserOf(first, 2 * position)]
            }
            Zone::Losers(round) if round % 2 == 0 => [
                WinnerOf(Zone::Losers(round - 1), position),
                LoserOf(Zone::Winners(round / 2 + 1), position),
            ],
            Zone::Losers(round) => {
                let prev = Zone::Losers(round - 1);
                [WinnerOf(prev, 2 * position - 1), WinnerOf(prev, 2 * position)]
            }
            Zone::GrandFinal => {
                let winners_champion = WinnerOf(self.winners_final(), 1);
                match self.losers_final() {
                    Some(losers_final) => [winners_champion, WinnerOf(losers_final, 1)],
                    None => [winners_champion, LoserOf(self.winners_final(), 1)],
                }
            }
            Zone::BracketReset => [Conditional, Conditional],
        }
    }

    /// Where the loser of a winners-bracket match drops to. None in single elimination.
    pub fn loser_drop(&self, round: u32, position: u32) -> Option<(Zone, u32, Slot)> {
        if self.bracket_type == BracketType::Single {
            return None;
        }
        if self.losers_rounds() == 0 {
            return Some((Zone::GrandFinal, 1, Slot::Two));
        }
        if round == 1 {
            Some((Zone::Losers(1), position.div_ceil(2), Slot::for_position(position)))
        } else {
            Some((Zone::Losers(2 * (round - 1)), position, Slot::Two))
        }
    }
}
