//! Shared setup for the integration tests.
#![allow(dead_code)]

use arcade_bracket::{
    BracketService, BracketType, GameMatch, MemoryStore, ParticipantId, SeedingPolicy,
    TournamentId, TournamentStatus, Zone,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn service() -> BracketService<MemoryStore> {
    BracketService::new(MemoryStore::new())
}

/// Draft tournament with participants P0..P{n-1}, returned in creation order.
pub fn tournament_with_players(
    service: &BracketService<MemoryStore>,
    bracket_type: BracketType,
    n: usize,
) -> (TournamentId, Vec<ParticipantId>) {
    let t = service.create_tournament("Arcade Night", bracket_type).unwrap();
    let ids = (0..n)
        .map(|i| service.add_participant(t.id, &format!("P{i}"), None).unwrap().id)
        .collect();
    (t.id, ids)
}

/// Generate with seeded (creation) order, so slot i holds P{i}.
pub fn generate(service: &BracketService<MemoryStore>, id: TournamentId) -> Vec<GameMatch> {
    service
        .generate_bracket(id, &SeedingPolicy::Seeded, &mut StdRng::seed_from_u64(7))
        .unwrap()
}

pub fn match_at(service: &BracketService<MemoryStore>, id: TournamentId, zone: Zone, position: u32) -> GameMatch {
    service.find_match(id, zone, position).unwrap().unwrap()
}

/// Report `zone`/`position` as won by `winner`.
pub fn report(
    service: &BracketService<MemoryStore>,
    id: TournamentId,
    zone: Zone,
    position: u32,
    winner: ParticipantId,
) {
    let m = match_at(service, id, zone, position);
    service.report_winner(m.id, winner).unwrap();
}

/// Play every open match in (round, position) order until the tournament completes.
/// Returns the number of reported matches.
pub fn play_out(
    service: &BracketService<MemoryStore>,
    id: TournamentId,
    mut pick: impl FnMut(&GameMatch) -> ParticipantId,
) -> usize {
    let mut reported = 0;
    loop {
        let data = service.get_tournament_data(id).unwrap();
        if data.tournament.status == TournamentStatus::Completed {
            return reported;
        }
        let next = data
            .matches
            .iter()
            .find(|m| m.is_open())
            .unwrap_or_else(|| panic!("bracket stalled after {reported} reports: {:#?}", data.matches));
        service.report_winner(next.id, pick(next)).unwrap();
        reported += 1;
        assert!(reported < 1000, "play_out did not finish");
    }
}

/// Participant in slot one.
pub fn first(m: &GameMatch) -> ParticipantId {
    m.participant1_id.unwrap()
}

/// How many played matches (both slots filled, decided) each participant lost.
pub fn losses(matches: &[GameMatch], participant: ParticipantId) -> usize {
    matches
        .iter()
        .filter(|m| m.is_ready() && m.is_decided())
        .filter(|m| m.loser() == Some(participant))
        .count()
}
