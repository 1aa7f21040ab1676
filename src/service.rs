//! Engine operations over a store: generate, report, read, sweep, and participant management.

use crate::config::DEFAULT_SWEEP_LIMIT;
use crate::logic::{
    dedupe_participants, generate_matches, order_participants, read_participants_csv, Bracket,
    SeedingPolicy,
};
use crate::models::{
    name_key, BracketType, GameMatch, MatchId, Participant, ParticipantId, Tournament,
    TournamentError, TournamentId, TournamentStatus, Zone,
};
use crate::store::Store;
use rand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything a client needs to draw a bracket.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentData {
    pub tournament: Tournament,
    pub participants: Vec<Participant>,
    /// Ordered by (round, position).
    pub matches: Vec<GameMatch>,
    pub champion_id: Option<ParticipantId>,
}

/// Bracket engine bound to a store.
///
/// Every mutating operation holds a per-tournament lock from first read to
/// last write, so two reports can never race for the same slot.
pub struct BracketService<S> {
    store: S,
    sweep_limit: usize,
    /// One entry per tournament ever touched. Tournaments are never deleted
    /// here, so entries live as long as the service.
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl<S: Store> BracketService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            sweep_limit: DEFAULT_SWEEP_LIMIT,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_sweep_limit(mut self, sweep_limit: usize) -> Self {
        self.sweep_limit = sweep_limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn tournament_lock(&self, id: TournamentId) -> Result<Arc<Mutex<()>>, TournamentError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| TournamentError::Store("lock error".to_string()))?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    fn hold(lock: &Mutex<()>) -> Result<MutexGuard<'_, ()>, TournamentError> {
        lock.lock()
            .map_err(|_| TournamentError::Store("lock error".to_string()))
    }

    fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.store
            .get_tournament(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn draft_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let tournament = self.tournament(id)?;
        if tournament.status != TournamentStatus::Draft {
            return Err(TournamentError::InvalidState);
        }
        Ok(tournament)
    }

    /// Create a tournament in Draft status.
    pub fn create_tournament(&self, name: &str, bracket_type: BracketType) -> Result<Tournament, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidState);
        }
        let tournament = Tournament::new(name, bracket_type);
        self.store.insert_tournament(&tournament)?;
        log::info!("Created {:?} tournament {} ({})", bracket_type, tournament.id, tournament.name);
        Ok(tournament)
    }

    /// Add a participant (Draft only). Names must be unique (case-insensitive).
    pub fn add_participant(
        &self,
        tournament_id: TournamentId,
        name: &str,
        seed: Option<u32>,
    ) -> Result<Participant, TournamentError> {
        let lock = self.tournament_lock(tournament_id)?;
        let _guard = Self::hold(&lock)?;
        self.draft_tournament(tournament_id)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidState);
        }
        let key = name_key(name);
        let existing = self.store.participants_for_tournament(tournament_id)?;
        if existing.iter().any(|p| p.name_key() == key) {
            return Err(TournamentError::DuplicateParticipantName(name.to_string()));
        }

        let mut participant = Participant::new(tournament_id, name);
        participant.seed = seed;
        self.store.insert_participants(std::slice::from_ref(&participant))?;
        Ok(participant)
    }

    /// Remove a participant by id (Draft only).
    pub fn remove_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> Result<(), TournamentError> {
        let lock = self.tournament_lock(tournament_id)?;
        let _guard = Self::hold(&lock)?;
        self.draft_tournament(tournament_id)?;

        let existing = self.store.participants_for_tournament(tournament_id)?;
        if !existing.iter().any(|p| p.id == participant_id) {
            return Err(TournamentError::ParticipantNotFound(participant_id));
        }
        self.store.delete_participants(&[participant_id])
    }

    /// Add participants from CSV (Draft only). Names already in the tournament are skipped.
    pub fn import_participants<R: Read>(
        &self,
        tournament_id: TournamentId,
        reader: R,
    ) -> Result<Vec<Participant>, TournamentError> {
        let lock = self.tournament_lock(tournament_id)?;
        let _guard = Self::hold(&lock)?;
        self.draft_tournament(tournament_id)?;

        let rows = read_participants_csv(reader)?;
        let existing: HashSet<String> = self
            .store
            .participants_for_tournament(tournament_id)?
            .iter()
            .map(Participant::name_key)
            .collect();

        let mut added = Vec::with_capacity(rows.len());
        for row in rows {
            if existing.contains(&name_key(&row.name)) {
                log::warn!("Skipping {:?}: already in tournament {}", row.name, tournament_id);
                continue;
            }
            let mut participant = Participant::new(tournament_id, row.name);
            participant.seed = row.seed;
            added.push(participant);
        }
        self.store.insert_participants(&added)?;
        log::info!("Imported {} participants into tournament {}", added.len(), tournament_id);
        Ok(added)
    }

    /// (Re)generate the full bracket and mark the tournament active.
    ///
    /// Duplicate names are collapsed (earliest-created kept) and byes created by
    /// the placement are swept before anything is written. The match set, the
    /// status and the duplicate removal are committed together; on failure
    /// nothing changes.
    pub fn generate_bracket<R: Rng + ?Sized>(
        &self,
        tournament_id: TournamentId,
        seeding: &SeedingPolicy,
        rng: &mut R,
    ) -> Result<Vec<GameMatch>, TournamentError> {
        let lock = self.tournament_lock(tournament_id)?;
        let _guard = Self::hold(&lock)?;

        let mut tournament = self.tournament(tournament_id)?;
        let previous_status = tournament.status;
        tournament.status = previous_status.transition(TournamentStatus::Active)?;

        let (participants, duplicates) =
            dedupe_participants(self.store.participants_for_tournament(tournament_id)?);
        if participants.len() < 2 {
            return Err(TournamentError::NotEnoughParticipants {
                found: participants.len(),
            });
        }

        let ordered = order_participants(&participants, seeding, rng);
        let matches = generate_matches(&tournament, &ordered)?;
        let mut bracket = Bracket::new(tournament, matches)?;
        bracket.sweep_byes(self.sweep_limit)?;
        let matches = bracket.into_matches();

        self.store
            .commit_bracket(tournament_id, &matches, TournamentStatus::Active, &duplicates)?;
        if !duplicates.is_empty() {
            log::info!(
                "Removed {} duplicate participants from tournament {}",
                duplicates.len(),
                tournament_id
            );
        }
        Ok(matches)
    }

    /// Report the winner of a match, route the outcome, and sweep byes.
    ///
    /// Returns the reported match as stored.
    pub fn report_winner(&self, match_id: MatchId, winner_id: ParticipantId) -> Result<GameMatch, TournamentError> {
        let m = self
            .store
            .get_match(match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let lock = self.tournament_lock(m.tournament_id)?;
        let _guard = Self::hold(&lock)?;

        let mut bracket = self.load_bracket(m.tournament_id)?;
        bracket.report_winner(match_id, winner_id)?;
        bracket.sweep_byes(self.sweep_limit)?;
        self.flush(&bracket)?;
        bracket
            .get_by_id(match_id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    /// Tournament, participants and ordered matches, plus the champion once decided.
    pub fn get_tournament_data(&self, tournament_id: TournamentId) -> Result<TournamentData, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        let participants = self.store.participants_for_tournament(tournament_id)?;
        let matches = self.store.matches_for_tournament(tournament_id)?;
        let champion_id = if matches.is_empty() {
            None
        } else {
            Bracket::new(tournament.clone(), matches.clone())?.champion()
        };
        Ok(TournamentData {
            tournament,
            participants,
            matches,
            champion_id,
        })
    }

    /// Sweep byes to a fixed point. Returns how many matches were auto-decided.
    pub fn auto_advance(&self, tournament_id: TournamentId) -> Result<usize, TournamentError> {
        let lock = self.tournament_lock(tournament_id)?;
        let _guard = Self::hold(&lock)?;

        let tournament = self.tournament(tournament_id)?;
        let matches = self.store.matches_for_tournament(tournament_id)?;
        if matches.is_empty() {
            return Ok(0);
        }
        let mut bracket = Bracket::new(tournament, matches)?;
        let advanced = bracket.sweep_byes(self.sweep_limit)?;
        self.flush(&bracket)?;
        Ok(advanced)
    }

    /// Look up one match by its place in the bracket.
    pub fn find_match(
        &self,
        tournament_id: TournamentId,
        zone: Zone,
        position: u32,
    ) -> Result<Option<GameMatch>, TournamentError> {
        self.tournament(tournament_id)?;
        self.store.find_match(tournament_id, zone, position)
    }

    fn load_bracket(&self, tournament_id: TournamentId) -> Result<Bracket, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        let matches = self.store.matches_for_tournament(tournament_id)?;
        Bracket::new(tournament, matches)
    }

    fn flush(&self, bracket: &Bracket) -> Result<(), TournamentError> {
        let changed = bracket.changed_matches();
        let tournament = bracket.tournament();
        let status = bracket.status_changed().then_some(tournament.status);
        if changed.is_empty() && status.is_none() {
            return Ok(());
        }
        self.store.commit_results(tournament.id, &changed, status)
    }
}
