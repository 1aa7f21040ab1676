//! Storage failures part-way through an operation leave the stored state as it was.

mod common;

use arcade_bracket::{
    BracketService, BracketType, GameMatch, MatchId, MemoryStore, Participant, ParticipantId,
    SeedingPolicy, Store, Tournament, TournamentError, TournamentId, TournamentStatus, Zone,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};

/// Memory store whose status writes fail while `status_down` is set.
/// Uses the trait's default composite operations.
#[derive(Default)]
struct StatusOutageStore {
    inner: MemoryStore,
    status_down: AtomicBool,
}

impl StatusOutageStore {
    fn set_status_down(&self, down: bool) {
        self.status_down.store(down, Ordering::SeqCst);
    }
}

impl Store for StatusOutageStore {
    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        self.inner.insert_tournament(tournament)
    }

    fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, TournamentError> {
        self.inner.get_tournament(id)
    }

    fn update_tournament_status(&self, id: TournamentId, status: TournamentStatus) -> Result<(), TournamentError> {
        if self.status_down.load(Ordering::SeqCst) {
            return Err(TournamentError::Store("down".to_string()));
        }
        self.inner.update_tournament_status(id, status)
    }

    fn participants_for_tournament(&self, id: TournamentId) -> Result<Vec<Participant>, TournamentError> {
        self.inner.participants_for_tournament(id)
    }

    fn insert_participants(&self, participants: &[Participant]) -> Result<(), TournamentError> {
        self.inner.insert_participants(participants)
    }

    fn delete_participants(&self, ids: &[ParticipantId]) -> Result<(), TournamentError> {
        self.inner.delete_participants(ids)
    }

    fn insert_matches(&self, matches: &[GameMatch]) -> Result<(), TournamentError> {
        self.inner.insert_matches(matches)
    }

    fn delete_matches_for_tournament(&self, id: TournamentId) -> Result<(), TournamentError> {
        self.inner.delete_matches_for_tournament(id)
    }

    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, TournamentError> {
        self.inner.get_match(id)
    }

    fn matches_for_tournament(&self, id: TournamentId) -> Result<Vec<GameMatch>, TournamentError> {
        self.inner.matches_for_tournament(id)
    }

    fn update_match(&self, m: &GameMatch) -> Result<(), TournamentError> {
        self.inner.update_match(m)
    }

    fn find_match(&self, id: TournamentId, zone: Zone, position: u32) -> Result<Option<GameMatch>, TournamentError> {
        self.inner.find_match(id, zone, position)
    }
}

fn two_player_final(svc: &BracketService<StatusOutageStore>) -> (TournamentId, Vec<ParticipantId>) {
    let t = svc.create_tournament("Outage Cup", BracketType::Single).unwrap();
    let players = ["Ada", "Bea"]
        .iter()
        .map(|name| svc.add_participant(t.id, name, None).unwrap().id)
        .collect();
    (t.id, players)
}

#[test]
fn status_failure_rolls_back_the_deciding_result() {
    let svc = BracketService::new(StatusOutageStore::default());
    let (id, players) = two_player_final(&svc);
    svc.generate_bracket(id, &SeedingPolicy::Seeded, &mut StdRng::seed_from_u64(3))
        .unwrap();
    let final_match = svc.find_match(id, Zone::Winners(1), 1).unwrap().unwrap();

    svc.store().set_status_down(true);
    assert_eq!(
        svc.report_winner(final_match.id, players[0]).unwrap_err(),
        TournamentError::Store("down".to_string())
    );
    let data = svc.get_tournament_data(id).unwrap();
    assert_eq!(data.tournament.status, TournamentStatus::Active);
    assert_eq!(data.matches[0].winner_participant_id, None);
    assert_eq!(data.champion_id, None);

    svc.store().set_status_down(false);
    svc.report_winner(final_match.id, players[0]).unwrap();
    let data = svc.get_tournament_data(id).unwrap();
    assert_eq!(data.tournament.status, TournamentStatus::Completed);
    assert_eq!(data.champion_id, Some(players[0]));
}

#[test]
fn status_failure_during_generation_changes_nothing() {
    let svc = BracketService::new(StatusOutageStore::default());
    let (id, _) = two_player_final(&svc);
    svc.store()
        .insert_participants(&[Participant::new(id, "ADA")])
        .unwrap();

    svc.store().set_status_down(true);
    assert_eq!(
        svc.generate_bracket(id, &SeedingPolicy::Seeded, &mut StdRng::seed_from_u64(3))
            .unwrap_err(),
        TournamentError::Store("down".to_string())
    );
    let data = svc.get_tournament_data(id).unwrap();
    assert_eq!(data.tournament.status, TournamentStatus::Draft);
    assert!(data.matches.is_empty());
    assert_eq!(data.participants.len(), 3);
}

#[test]
fn memory_commit_applies_nothing_when_a_match_is_missing() {
    let svc = common::service();
    let (id, players) = common::tournament_with_players(&svc, BracketType::Single, 2);
    common::generate(&svc, id);

    let mut decided = common::match_at(&svc, id, Zone::Winners(1), 1);
    decided.winner_participant_id = Some(players[0]);
    let stray = GameMatch::new(id, Zone::Winners(2), 1, None, None);

    assert_eq!(
        svc.store()
            .commit_results(id, &[decided, stray.clone()], Some(TournamentStatus::Completed))
            .unwrap_err(),
        TournamentError::MatchNotFound(stray.id)
    );
    let data = svc.get_tournament_data(id).unwrap();
    assert_eq!(data.tournament.status, TournamentStatus::Active);
    assert!(!data.matches[0].is_decided());
}
