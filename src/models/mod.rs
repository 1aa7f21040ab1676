//! Data structures for the bracket engine: tournaments, participants, matches.

mod game;
mod participant;
mod tournament;

pub use game::{
    GameMatch, MatchId, Slot, Zone, BRACKET_RESET_ROUND, GRAND_FINAL_ROUND, LOSERS_ROUND_BASE,
};
pub(crate) use participant::name_key;
pub use participant::{Participant, ParticipantId};
pub use tournament::{BracketType, Tournament, TournamentError, TournamentId, TournamentStatus};
