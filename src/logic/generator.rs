//! Bracket generation: the full match skeleton for a tournament.

use crate::logic::layout::BracketLayout;
use crate::models::{GameMatch, ParticipantId, Tournament, TournamentError, Zone};

/// Build every match of the bracket for `ordered` participants.
///
/// Winners round 1 pairs adjacent slots (`slot[2i]` vs `slot[2i+1]`) at position `i+1`.
/// All later rounds, the losers bracket, the grand final and the bracket reset start empty.
pub fn generate_matches(
    tournament: &Tournament,
    ordered: &[ParticipantId],
) -> Result<Vec<GameMatch>, TournamentError> {
    let layout = BracketLayout::new(tournament.bracket_type, ordered.len())?;
    let slots = layout.slots(ordered);

    let mut matches = Vec::with_capacity(layout.total_matches() as usize);
    for (position, pair) in (1..).zip(slots.chunks_exact(2)) {
        matches.push(GameMatch::new(
            tournament.id,
            Zone::Winners(1),
            position,
            pair[0],
            pair[1],
        ));
    }
    for zone in layout.zones().into_iter().skip(1) {
        for position in 1..=layout.matches_in(zone) {
            matches.push(GameMatch::new(tournament.id, zone, position, None, None));
        }
    }

    log::info!(
        "Generated {:?} bracket for tournament {}: {} participants, size {}, {} winners rounds, {} losers rounds, {} matches",
        tournament.bracket_type,
        tournament.id,
        ordered.len(),
        layout.bracket_size,
        layout.winners_rounds,
        layout.losers_rounds(),
        matches.len()
    );
    Ok(matches)
}
