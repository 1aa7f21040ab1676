//! Persistence collaborator: the record operations the engine needs, and an in-memory store.

use crate::models::{
    GameMatch, MatchId, Participant, ParticipantId, Tournament, TournamentError, TournamentId,
    TournamentStatus, Zone,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Record storage for tournaments, participants and matches.
///
/// The composite operations have default implementations built from the
/// primitive ones; stores that can make them atomic should override them.
pub trait Store: Send + Sync {
    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError>;
    fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, TournamentError>;
    fn update_tournament_status(&self, id: TournamentId, status: TournamentStatus) -> Result<(), TournamentError>;

    /// All participants of a tournament, in creation order.
    fn participants_for_tournament(&self, id: TournamentId) -> Result<Vec<Participant>, TournamentError>;
    fn insert_participants(&self, participants: &[Participant]) -> Result<(), TournamentError>;
    fn delete_participants(&self, ids: &[ParticipantId]) -> Result<(), TournamentError>;

    fn insert_matches(&self, matches: &[GameMatch]) -> Result<(), TournamentError>;
    fn delete_matches_for_tournament(&self, id: TournamentId) -> Result<(), TournamentError>;
    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, TournamentError>;
    /// All matches of a tournament ordered by (round, position).
    fn matches_for_tournament(&self, id: TournamentId) -> Result<Vec<GameMatch>, TournamentError>;
    fn update_match(&self, m: &GameMatch) -> Result<(), TournamentError>;
    fn find_match(&self, id: TournamentId, zone: Zone, position: u32) -> Result<Option<GameMatch>, TournamentError>;

    /// Replace a tournament's whole match set.
    fn replace_matches(&self, id: TournamentId, matches: &[GameMatch]) -> Result<(), TournamentError> {
        self.delete_matches_for_tournament(id)?;
        self.insert_matches(matches)
    }

    fn update_matches(&self, matches: &[GameMatch]) -> Result<(), TournamentError> {
        for m in matches {
            self.update_match(m)?;
        }
        Ok(())
    }

    /// Store a generated bracket: replace the match set, set `status` and drop
    /// the `discarded` participants. Earlier steps are undone if a later one fails.
    fn commit_bracket(
        &self,
        id: TournamentId,
        matches: &[GameMatch],
        status: TournamentStatus,
        discarded: &[ParticipantId],
    ) -> Result<(), TournamentError> {
        let tournament = self.get_tournament(id)?.ok_or(TournamentError::TournamentNotFound(id))?;
        let previous = self.matches_for_tournament(id)?;
        self.replace_matches(id, matches)?;
        let result = self
            .update_tournament_status(id, status)
            .and_then(|()| self.delete_participants(discarded));
        if let Err(e) = result {
            log::error!("Restoring previous bracket of tournament {}: {}", id, e);
            self.replace_matches(id, &previous)?;
            if let Err(restore) = self.update_tournament_status(id, tournament.status) {
                log::error!("Could not restore status of tournament {}: {}", id, restore);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Store reported and swept results, plus the new status if it moved.
    /// The match writes are undone if the status write fails.
    fn commit_results(
        &self,
        id: TournamentId,
        matches: &[GameMatch],
        status: Option<TournamentStatus>,
    ) -> Result<(), TournamentError> {
        let mut previous = Vec::with_capacity(matches.len());
        for m in matches {
            previous.push(self.get_match(m.id)?.ok_or(TournamentError::MatchNotFound(m.id))?);
        }
        self.update_matches(matches)?;
        if let Some(status) = status {
            if let Err(e) = self.update_tournament_status(id, status) {
                log::error!("Rolling back results of tournament {}: {}", id, e);
                self.update_matches(&previous)?;
                return Err(e);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Tables {
    tournaments: HashMap<TournamentId, Tournament>,
    /// Insertion order is creation order.
    participants: Vec<Participant>,
    matches: HashMap<MatchId, GameMatch>,
}

/// Store kept in process memory. Composite operations run under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, TournamentError> {
        self.tables
            .read()
            .map_err(|_| TournamentError::Store("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, TournamentError> {
        self.tables
            .write()
            .map_err(|_| TournamentError::Store("lock error".to_string()))
    }
}

fn check_new_matches(tables: &Tables, matches: &[GameMatch]) -> Result<(), TournamentError> {
    let mut ids = HashSet::with_capacity(matches.len());
    for m in matches {
        if tables.matches.contains_key(&m.id) || !ids.insert(m.id) {
            return Err(TournamentError::Store(format!("duplicate match id {}", m.id)));
        }
    }
    Ok(())
}

impl Store for MemoryStore {
    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        if g.tournaments.contains_key(&tournament.id) {
            return Err(TournamentError::Store(format!("duplicate tournament id {}", tournament.id)));
        }
        g.tournaments.insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, TournamentError> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn update_tournament_status(&self, id: TournamentId, status: TournamentStatus) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        let t = g
            .tournaments
            .get_mut(&id)
            .ok_or(TournamentError::TournamentNotFound(id))?;
        t.status = status;
        t.updated_at = Utc::now();
        Ok(())
    }

    fn participants_for_tournament(&self, id: TournamentId) -> Result<Vec<Participant>, TournamentError> {
        let g = self.read()?;
        let mut participants: Vec<Participant> = g
            .participants
            .iter()
            .filter(|p| p.tournament_id == id)
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.created_at);
        Ok(participants)
    }

    fn insert_participants(&self, participants: &[Participant]) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        for p in participants {
            if g.participants.iter().any(|existing| existing.id == p.id) {
                return Err(TournamentError::Store(format!("duplicate participant id {}", p.id)));
            }
        }
        g.participants.extend_from_slice(participants);
        Ok(())
    }

    fn delete_participants(&self, ids: &[ParticipantId]) -> Result<(), TournamentError> {
        let ids: HashSet<&ParticipantId> = ids.iter().collect();
        self.write()?.participants.retain(|p| !ids.contains(&p.id));
        Ok(())
    }

    fn insert_matches(&self, matches: &[GameMatch]) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        check_new_matches(&g, matches)?;
        g.matches.extend(matches.iter().map(|m| (m.id, m.clone())));
        Ok(())
    }

    fn delete_matches_for_tournament(&self, id: TournamentId) -> Result<(), TournamentError> {
        self.write()?.matches.retain(|_, m| m.tournament_id != id);
        Ok(())
    }

    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, TournamentError> {
        Ok(self.read()?.matches.get(&id).cloned())
    }

    fn matches_for_tournament(&self, id: TournamentId) -> Result<Vec<GameMatch>, TournamentError> {
        let g = self.read()?;
        let mut matches: Vec<GameMatch> = g
            .matches
            .values()
            .filter(|m| m.tournament_id == id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.zone, m.position));
        Ok(matches)
    }

    fn update_match(&self, m: &GameMatch) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        let stored = g.matches.get_mut(&m.id).ok_or(TournamentError::MatchNotFound(m.id))?;
        *stored = m.clone();
        Ok(())
    }

    fn find_match(&self, id: TournamentId, zone: Zone, position: u32) -> Result<Option<GameMatch>, TournamentError> {
        Ok(self
            .read()?
            .matches
            .values()
            .find(|m| m.tournament_id == id && m.zone == zone && m.position == position)
            .cloned())
    }

    fn replace_matches(&self, id: TournamentId, matches: &[GameMatch]) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        check_replacement(&g, id, matches)?;
        replace_tournament_matches(&mut g, id, matches);
        Ok(())
    }

    fn update_matches(&self, matches: &[GameMatch]) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        check_existing_matches(&g, matches)?;
        for m in matches {
            g.matches.insert(m.id, m.clone());
        }
        Ok(())
    }

    fn commit_bracket(
        &self,
        id: TournamentId,
        matches: &[GameMatch],
        status: TournamentStatus,
        discarded: &[ParticipantId],
    ) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        if !g.tournaments.contains_key(&id) {
            return Err(TournamentError::TournamentNotFound(id));
        }
        check_replacement(&g, id, matches)?;

        replace_tournament_matches(&mut g, id, matches);
        set_status(&mut g, id, status);
        let discarded: HashSet<&ParticipantId> = discarded.iter().collect();
        g.participants.retain(|p| !discarded.contains(&p.id));
        Ok(())
    }

    fn commit_results(
        &self,
        id: TournamentId,
        matches: &[GameMatch],
        status: Option<TournamentStatus>,
    ) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        if status.is_some() && !g.tournaments.contains_key(&id) {
            return Err(TournamentError::TournamentNotFound(id));
        }
        check_existing_matches(&g, matches)?;

        for m in matches {
            g.matches.insert(m.id, m.clone());
        }
        if let Some(status) = status {
            set_status(&mut g, id, status);
        }
        Ok(())
    }
}

/// New match set for `id` may only reuse ids the tournament already owns, each once.
fn check_replacement(tables: &Tables, id: TournamentId, matches: &[GameMatch]) -> Result<(), TournamentError> {
    let mut ids = HashSet::with_capacity(matches.len());
    for m in matches {
        let taken = tables.matches.get(&m.id).is_some_and(|old| old.tournament_id != id);
        if taken || !ids.insert(m.id) {
            return Err(TournamentError::Store(format!("duplicate match id {}", m.id)));
        }
    }
    Ok(())
}

fn check_existing_matches(tables: &Tables, matches: &[GameMatch]) -> Result<(), TournamentError> {
    match matches.iter().find(|m| !tables.matches.contains_key(&m.id)) {
        Some(missing) => Err(TournamentError::MatchNotFound(missing.id)),
        None => Ok(()),
    }
}

fn replace_tournament_matches(tables: &mut Tables, id: TournamentId, matches: &[GameMatch]) {
    tables.matches.retain(|_, m| m.tournament_id != id);
    tables.matches.extend(matches.iter().map(|m| (m.id, m.clone())));
}

/// Caller has checked that the tournament exists.
fn set_status(tables: &mut Tables, id: TournamentId, status: TournamentStatus) {
    if let Some(t) = tables.tournaments.get_mut(&id) {
        t.status = status;
        t.updated_at = Utc::now();
    }
}
