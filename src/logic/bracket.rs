//! In-memory bracket: every match of a tournament indexed by zone and position.
//!
//! Results are applied here and swept to a fixed point; the caller then
//! persists `changed_matches()` and, if it moved, the tournament status.

use crate::logic::layout::{BracketLayout, SlotSource};
use crate::models::{
    BracketType, GameMatch, MatchId, ParticipantId, Slot, Tournament, TournamentError,
    TournamentStatus, Zone,
};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug)]
pub struct Bracket {
    pub(super) tournament: Tournament,
    pub(super) layout: BracketLayout,
    /// Sorted by (zone, position).
    pub(super) matches: Vec<GameMatch>,
    index: HashMap<(Zone, u32), usize>,
    by_id: HashMap<MatchId, usize>,
    dirty: BTreeSet<usize>,
    status_changed: bool,
}

impl Bracket {
    /// Build from a tournament and its full persisted match set.
    pub fn new(tournament: Tournament, mut matches: Vec<GameMatch>) -> Result<Self, TournamentError> {
        matches.sort_by_key(|m| (m.zone, m.position));
        let first_round = matches.iter().filter(|m| m.zone == Zone::Winners(1)).count();
        let bracket_size = u32::try_from(first_round * 2).map_err(|_| TournamentError::InvalidState)?;
        if !bracket_size.is_power_of_two() || bracket_size < 2 {
            log::error!(
                "Tournament {} has {} first-round matches; not a valid bracket",
                tournament.id,
                first_round
            );
            return Err(TournamentError::InvalidState);
        }
        let layout = BracketLayout::from_size(tournament.bracket_type, bracket_size);

        let mut index = HashMap::with_capacity(matches.len());
        let mut by_id = HashMap::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            if m.position == 0 {
                log::error!("Tournament {}: match {} has position 0", tournament.id, m.id);
                return Err(TournamentError::InvalidState);
            }
            if m.tournament_id != tournament.id || index.insert((m.zone, m.position), i).is_some() {
                return Err(TournamentError::InvalidState);
            }
            by_id.insert(m.id, i);
        }

        Ok(Self {
            tournament,
            layout,
            matches,
            index,
            by_id,
            dirty: BTreeSet::new(),
            status_changed: false,
        })
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn layout(&self) -> &BracketLayout {
        &self.layout
    }

    pub fn matches(&self) -> &[GameMatch] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<GameMatch> {
        self.matches
    }

    pub fn get(&self, zone: Zone, position: u32) -> Option<&GameMatch> {
        self.index.get(&(zone, position)).map(|&i| &self.matches[i])
    }

    pub fn get_by_id(&self, id: MatchId) -> Option<&GameMatch> {
        self.by_id.get(&id).map(|&i| &self.matches[i])
    }

    /// Matches of one round, by position.
    pub fn round(&self, zone: Zone) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.zone == zone)
    }

    pub fn round_len(&self, zone: Zone) -> usize {
        self.round(zone).count()
    }

    /// Matches modified since the bracket was loaded.
    pub fn changed_matches(&self) -> Vec<GameMatch> {
        self.dirty.iter().map(|&i| self.matches[i].clone()).collect()
    }

    /// True once the tournament status moved during this session.
    pub fn status_changed(&self) -> bool {
        self.status_changed
    }

    pub fn is_completed(&self) -> bool {
        self.tournament.status == TournamentStatus::Completed
    }

    /// Winner of the terminal match, once there is one.
    pub fn champion(&self) -> Option<ParticipantId> {
        match self.tournament.bracket_type {
            BracketType::Single => self.get(self.layout.winners_final(), 1)?.winner_participant_id,
            BracketType::Double => {
                if let Some(reset) = self.get(Zone::BracketReset, 1).and_then(|m| m.winner_participant_id) {
                    return Some(reset);
                }
                let final_match = self.get(Zone::GrandFinal, 1)?;
                final_match
                    .winner_participant_id
                    .filter(|&w| final_match.participant1_id == Some(w))
            }
        }
    }

    pub(super) fn index_of(&self, id: MatchId) -> Result<usize, TournamentError> {
        self.by_id.get(&id).copied().ok_or(TournamentError::MatchNotFound(id))
    }

    pub(super) fn set_winner(&mut self, i: usize, winner: ParticipantId) {
        let m = &mut self.matches[i];
        m.winner_participant_id = Some(winner);
        m.updated_at = Utc::now();
        self.dirty.insert(i);
    }

    /// Put `participant` into an empty slot. Writing the same participant again is a no-op.
    pub(super) fn fill_slot(
        &mut self,
        zone: Zone,
        position: u32,
        slot: Slot,
        participant: ParticipantId,
    ) -> Result<(), TournamentError> {
        let i = *self.index.get(&(zone, position)).ok_or_else(|| {
            log::error!("Tournament {} has no match at {} position {}", self.tournament.id, zone, position);
            TournamentError::InvalidState
        })?;
        let m = &mut self.matches[i];
        match m.participant(slot) {
            Some(existing) if existing == participant => return Ok(()),
            Some(_) => return Err(TournamentError::SlotOccupied { match_id: m.id }),
            None => {}
        }
        *m.participant_mut(slot) = Some(participant);
        m.updated_at = Utc::now();
        self.dirty.insert(i);
        Ok(())
    }

    pub(super) fn complete(&mut self) -> Result<(), TournamentError> {
        self.tournament.status = self.tournament.status.transition(TournamentStatus::Completed)?;
        self.tournament.updated_at = Utc::now();
        self.status_changed = true;
        log::info!(
            "Tournament {} completed, champion {:?}",
            self.tournament.id,
            self.champion()
        );
        Ok(())
    }

    /// Decided, or structurally unable to ever hold a participant.
    pub fn is_settled(&self, m: &GameMatch) -> bool {
        m.is_decided() || self.is_void_match(m.zone, m.position)
    }

    /// A slot that is empty and can never be filled, because its feeder produced
    /// (or will produce) nobody.
    pub fn is_void_slot(&self, zone: Zone, position: u32, slot: Slot) -> bool {
        let Some(m) = self.get(zone, position) else {
            return true;
        };
        if m.participant(slot).is_some() {
            return false;
        }
        let [first, second] = self.layout.sources(zone, position);
        let source = match slot {
            Slot::One => first,
            Slot::Two => second,
        };
        match source {
            SlotSource::Entry => true,
            SlotSource::WinnerOf(zone, position) => self.is_void_match(zone, position),
            SlotSource::LoserOf(zone, position) => self.yields_no_loser(zone, position),
            SlotSource::Conditional => false,
        }
    }

    /// A match both of whose slots are void. It never gets played and sends nobody onward.
    pub fn is_void_match(&self, zone: Zone, position: u32) -> bool {
        match self.get(zone, position) {
            None => true,
            Some(m) if m.is_decided() => false,
            Some(_) => {
                self.is_void_slot(zone, position, Slot::One) && self.is_void_slot(zone, position, Slot::Two)
            }
        }
    }

    fn yields_no_loser(&self, zone: Zone, position: u32) -> bool {
        match self.get(zone, position) {
            None => true,
            Some(m) if m.is_decided() => m.loser().is_none(),
            Some(_) => {
                self.is_void_slot(zone, position, Slot::One) || self.is_void_slot(zone, position, Slot::Two)
            }
        }
    }
}
