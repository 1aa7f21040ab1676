//! Ordering policies and duplicate-name cleanup.

use arcade_bracket::{dedupe_participants, order_participants, Participant, SeedingPolicy};
use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn participant(name: &str, seed: Option<u32>, created_offset_secs: i64) -> Participant {
    let mut p = Participant::new(Uuid::nil(), name);
    p.seed = seed;
    p.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap() + Duration::seconds(created_offset_secs);
    p
}

#[test]
fn seeded_places_explicit_seeds_first() {
    let a = participant("Ana", None, 0);
    let b = participant("Ben", Some(2), 1);
    let c = participant("Cy", Some(1), 2);
    let d = participant("Dee", None, 3);
    let ordered = order_participants(
        &[a.clone(), b.clone(), c.clone(), d.clone()],
        &SeedingPolicy::Seeded,
        &mut StdRng::seed_from_u64(1),
    );
    assert_eq!(ordered, vec![c.id, b.id, a.id, d.id]);
}

#[test]
fn shuffle_is_a_reproducible_permutation() {
    let players: Vec<Participant> = (0..12).map(|i| participant(&format!("P{i}"), None, i)).collect();
    let first = order_participants(&players, &SeedingPolicy::Shuffle, &mut StdRng::seed_from_u64(42));
    let second = order_participants(&players, &SeedingPolicy::Shuffle, &mut StdRng::seed_from_u64(42));
    assert_eq!(first, second);

    let mut sorted = first.clone();
    sorted.sort();
    let mut expected: Vec<_> = players.iter().map(|p| p.id).collect();
    expected.sort();
    assert_eq!(sorted, expected);
}

#[test]
fn explicit_order_appends_missing_in_original_order() {
    let players = vec![
        participant("A", None, 0),
        participant("B", None, 1),
        participant("C", None, 2),
        participant("D", Some(1), 3),
        participant("E", None, 4),
    ];
    let ids: Vec<_> = players.iter().map(|p| p.id).collect();
    let policy = SeedingPolicy::Explicit(vec![ids[2], Uuid::new_v4(), ids[0], ids[2]]);

    let ordered = order_participants(&players, &policy, &mut StdRng::seed_from_u64(1));
    // Seeds play no part once an explicit order is given.
    assert_eq!(ordered, vec![ids[2], ids[0], ids[1], ids[3], ids[4]]);
}

#[test]
fn dedupe_keeps_earliest_created_case_insensitive() {
    let late = participant("Alice", None, 2);
    let early = participant("alice ", None, 1);
    let bob = participant("Bob", None, 3);
    let shout = participant("ALICE", None, 4);

    let (kept, discarded) = dedupe_participants(vec![late.clone(), early.clone(), bob.clone(), shout.clone()]);
    let kept_ids: Vec<_> = kept.iter().map(|p| p.id).collect();
    assert_eq!(kept_ids, vec![early.id, bob.id]);
    assert_eq!(discarded.len(), 2);
    assert!(discarded.contains(&late.id));
    assert!(discarded.contains(&shout.id));
}

#[test]
fn seeding_policy_json_shape() {
    let policy: SeedingPolicy = serde_json::from_str(r#"{"mode":"shuffle"}"#).unwrap();
    assert_eq!(policy, SeedingPolicy::Shuffle);

    let id = Uuid::new_v4();
    let policy: SeedingPolicy =
        serde_json::from_value(serde_json::json!({ "mode": "explicit", "order": [id] })).unwrap();
    assert_eq!(policy, SeedingPolicy::Explicit(vec![id]));
}
