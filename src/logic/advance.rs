//! Match advancement: record a winner and route both participants onward.

use crate::logic::bracket::Bracket;
use crate::models::{BracketType, MatchId, ParticipantId, Slot, TournamentError, TournamentStatus, Zone};

impl Bracket {
    /// Report the winner of a match, checking turn order first.
    ///
    /// Nothing is changed when an error is returned before routing starts; a
    /// routing error leaves this in-memory copy partially updated, so callers
    /// discard it instead of persisting.
    pub fn report_winner(&mut self, match_id: MatchId, winner_id: ParticipantId) -> Result<(), TournamentError> {
        if self.tournament.status != TournamentStatus::Active {
            return Err(TournamentError::InvalidState);
        }
        let i = self.index_of(match_id)?;
        let m = &self.matches[i];
        if m.is_decided() {
            return Err(TournamentError::MatchAlreadyDecided(match_id));
        }
        if !m.has_participant(winner_id) {
            return Err(TournamentError::WinnerNotInMatch { match_id, winner_id });
        }
        if !m.is_ready() {
            return Err(TournamentError::MatchNotReady(match_id));
        }
        self.check_can_report(m)?;

        log::info!(
            "Tournament {}: {} position {} won by {}",
            self.tournament.id,
            m.zone,
            m.position,
            winner_id
        );
        self.advance(i, winner_id)
    }

    /// Record `winner` for the match at index `i` and route the outcome. No turn-order checks.
    pub(super) fn advance(&mut self, i: usize, winner: ParticipantId) -> Result<(), TournamentError> {
        self.set_winner(i, winner);
        let m = &self.matches[i];
        let (zone, position, loser) = (m.zone, m.position, m.loser());

        match zone {
            Zone::Winners(round) => {
                self.route_winners_winner(round, position, winner)?;
                if let Some(loser) = loser {
                    self.route_winners_loser(round, position, loser)?;
                }
                Ok(())
            }
            Zone::Losers(round) => self.route_losers_winner(round, position, winner),
            Zone::GrandFinal => self.settle_grand_final(i, winner),
            Zone::BracketReset => self.complete(),
        }
    }

    fn route_winners_winner(&mut self, round: u32, position: u32, winner: ParticipantId) -> Result<(), TournamentError> {
        let next = Zone::Winners(round + 1);
        let target = position.div_ceil(2);
        if self.get(next, target).is_some() {
            return self.fill_slot(next, target, Slot::for_position(position), winner);
        }
        // No next winners round: this was the winners final.
        match self.tournament.bracket_type {
            BracketType::Single => self.complete(),
            BracketType::Double => self.fill_slot(Zone::GrandFinal, 1, Slot::One, winner),
        }
    }

    fn route_winners_loser(&mut self, round: u32, position: u32, loser: ParticipantId) -> Result<(), TournamentError> {
        let Some((zone, target, slot)) = self.layout.loser_drop(round, position) else {
            return Ok(());
        };
        if self.get(zone, target).is_some() {
            self.fill_slot(zone, target, slot, loser)
        } else {
            self.fill_slot(Zone::GrandFinal, 1, Slot::Two, loser)
        }
    }

    fn route_losers_winner(&mut self, round: u32, position: u32, winner: ParticipantId) -> Result<(), TournamentError> {
        let here = Zone::Losers(round);
        let next = Zone::Losers(round + 1);
        let next_len = self.round_len(next);
        if next_len == 0 {
            return self.fill_slot(Zone::GrandFinal, 1, Slot::Two, winner);
        }
        // Fewer matches ahead means two feeders collapse into one match;
        // otherwise the next round pairs this winner with a winners-bracket dropout.
        if next_len < self.round_len(here) {
            self.fill_slot(next, position.div_ceil(2), Slot::for_position(position), winner)
        } else {
            self.fill_slot(next, position, Slot::One, winner)
        }
    }

    /// Winners champion (slot one) taking the grand final ends the tournament.
    /// A losers champion win sends both finalists to the bracket reset.
    fn settle_grand_final(&mut self, i: usize, winner: ParticipantId) -> Result<(), TournamentError> {
        let m = &self.matches[i];
        let (winners_champion, losers_champion) = (m.participant1_id, m.participant2_id);
        if winners_champion == Some(winner) {
            return self.complete();
        }
        let (Some(first), Some(second)) = (winners_champion, losers_champion) else {
            return Err(TournamentError::MatchNotReady(m.id));
        };
        log::info!("Tournament {}: grand final upset, bracket reset", self.tournament.id);
        self.fill_slot(Zone::BracketReset, 1, Slot::One, first)?;
        self.fill_slot(Zone::BracketReset, 1, Slot::Two, second)
    }
}
