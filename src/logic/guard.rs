//! Turn-order checks run before a reported result is accepted.

use crate::logic::bracket::Bracket;
use crate::models::{GameMatch, TournamentError, Zone};

impl Bracket {
    /// Reject a report for `m` while matches it depends on are unfinished.
    ///
    /// - Earlier rounds of the same ladder must have no open (ready, undecided) match.
    /// - Even losers rounds also need the winners round that drops into them settled.
    /// - The grand final and bracket reset need both brackets settled.
    pub fn check_can_report(&self, m: &GameMatch) -> Result<(), TournamentError> {
        match m.zone {
            Zone::Winners(round) => self.require_no_open_before(Zone::Winners, round),
            Zone::Losers(round) => {
                self.require_no_open_before(Zone::Losers, round)?;
                if round % 2 == 0 {
                    self.require_settled(Zone::Winners(round / 2 + 1))?;
                }
                Ok(())
            }
            Zone::GrandFinal | Zone::BracketReset => {
                let ladders = (1..=self.layout.winners_rounds)
                    .map(Zone::Winners)
                    .chain((1..=self.layout.losers_rounds()).map(Zone::Losers));
                for zone in ladders {
                    self.require_settled(zone)?;
                }
                Ok(())
            }
        }
    }

    fn require_no_open_before(&self, ladder: fn(u32) -> Zone, round: u32) -> Result<(), TournamentError> {
        for earlier in (1..round).map(ladder) {
            if self.round(earlier).any(GameMatch::is_open) {
                return Err(TournamentError::EarlierRoundIncomplete { zone: earlier });
            }
        }
        Ok(())
    }

    fn require_settled(&self, zone: Zone) -> Result<(), TournamentError> {
        if self.round(zone).all(|m| self.is_settled(m)) {
            Ok(())
        } else {
            Err(TournamentError::FeederRoundIncomplete { zone })
        }
    }
}
