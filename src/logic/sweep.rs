//! Auto-advance of byes: single-participant matches whose other slot can never fill.

use crate::logic::bracket::Bracket;
use crate::models::{ParticipantId, TournamentError, Zone};

impl Bracket {
    /// Advance every bye to a fixed point. Returns how many matches were auto-decided.
    ///
    /// Each step can create new byes further along, so the scan repeats until
    /// none are left. More than `limit` steps means the match set is malformed.
    pub fn sweep_byes(&mut self, limit: usize) -> Result<usize, TournamentError> {
        let mut advanced = 0;
        while let Some((i, participant)) = self.next_bye() {
            if advanced >= limit {
                log::error!(
                    "Tournament {}: bye sweep still running after {} steps",
                    self.tournament.id,
                    limit
                );
                return Err(TournamentError::SweepLimitExceeded(limit));
            }
            let m = &self.matches[i];
            log::info!(
                "Tournament {}: {} position {} auto-advanced {} (bye)",
                self.tournament.id,
                m.zone,
                m.position,
                participant
            );
            self.advance(i, participant)?;
            advanced += 1;
        }
        Ok(advanced)
    }

    fn next_bye(&self) -> Option<(usize, ParticipantId)> {
        if self.is_completed() {
            return None;
        }
        self.matches.iter().enumerate().find_map(|(i, m)| {
            if m.is_decided() || m.zone == Zone::BracketReset {
                return None;
            }
            let (slot, participant) = m.lone_participant()?;
            self.is_void_slot(m.zone, m.position, slot.other())
                .then_some((i, participant))
        })
    }
}
