//! Seeding: duplicate-name cleanup and participant ordering before placement.

use crate::models::{Participant, ParticipantId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How participants are ordered into the winners round 1 slot array.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "order", rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Explicit seeds ascending, then unseeded participants in creation order.
    #[default]
    Seeded,
    /// Uniform random permutation.
    Shuffle,
    /// Caller-supplied order; participants left out are appended in their original order.
    Explicit(Vec<ParticipantId>),
}

/// Collapse participants whose names match case-insensitively, keeping the earliest-created.
///
/// Returns the kept participants in creation order and the ids of the discarded ones.
pub fn dedupe_participants(mut participants: Vec<Participant>) -> (Vec<Participant>, Vec<ParticipantId>) {
    participants.sort_by_key(|p| p.created_at);
    let mut seen = HashSet::new();
    let mut discarded = Vec::new();
    participants.retain(|p| {
        if seen.insert(p.name_key()) {
            true
        } else {
            discarded.push(p.id);
            false
        }
    });
    (participants, discarded)
}

/// Explicit seeds ascending, then the unseeded; ties keep input order.
fn seeded_order(participants: &[Participant]) -> Vec<ParticipantId> {
    let mut seeded: Vec<&Participant> = participants.iter().collect();
    seeded.sort_by_key(|p| (p.seed.is_none(), p.seed));
    seeded.into_iter().map(|p| p.id).collect()
}

/// Order participant ids for placement according to `policy`.
///
/// `participants` is expected in creation order; `rng` is only used by `Shuffle`.
pub fn order_participants<R: Rng + ?Sized>(
    participants: &[Participant],
    policy: &SeedingPolicy,
    rng: &mut R,
) -> Vec<ParticipantId> {
    match policy {
        SeedingPolicy::Seeded => seeded_order(participants),
        SeedingPolicy::Shuffle => {
            let mut ids: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
            ids.shuffle(rng);
            ids
        }
        SeedingPolicy::Explicit(order) => {
            let known: HashSet<ParticipantId> = participants.iter().map(|p| p.id).collect();
            let mut placed = HashSet::new();
            let mut ids = Vec::with_capacity(participants.len());
            for &id in order {
                if !known.contains(&id) {
                    log::warn!("Ignoring unknown participant {} in explicit order", id);
                    continue;
                }
                if placed.insert(id) {
                    ids.push(id);
                }
            }
            ids.extend(participants.iter().map(|p| p.id).filter(|id| !placed.contains(id)));
            ids
        }
    }
}
