//! Bracket sizing, losers-bracket shape, and round-number encoding.

use arcade_bracket::{BracketLayout, BracketType, Slot, SlotSource, TournamentError, Zone};

#[test]
fn bracket_size_rounds_up_to_power_of_two() {
    for (n, size, rounds) in [(2, 2, 1), (3, 4, 2), (4, 4, 2), (5, 8, 3), (8, 8, 3), (9, 16, 4), (17, 32, 5), (32, 32, 5)] {
        let layout = BracketLayout::new(BracketType::Single, n).unwrap();
        assert_eq!(layout.bracket_size, size, "n = {n}");
        assert_eq!(layout.winners_rounds, rounds, "n = {n}");
    }
}

#[test]
fn fewer_than_two_participants_is_rejected() {
    assert_eq!(
        BracketLayout::new(BracketType::Double, 1),
        Err(TournamentError::NotEnoughParticipants { found: 1 })
    );
    assert_eq!(
        BracketLayout::new(BracketType::Single, 0),
        Err(TournamentError::NotEnoughParticipants { found: 0 })
    );
}

#[test]
fn single_elimination_has_size_minus_one_matches() {
    for n in 2..=40 {
        let layout = BracketLayout::new(BracketType::Single, n).unwrap();
        let winners: u32 = (1..=layout.winners_rounds)
            .map(|r| layout.matches_in(Zone::Winners(r)))
            .sum();
        assert_eq!(winners, layout.bracket_size - 1, "n = {n}");
        assert_eq!(layout.total_matches(), layout.bracket_size - 1, "n = {n}");
        assert_eq!(layout.losers_rounds(), 0);
        assert_eq!(layout.matches_in(Zone::GrandFinal), 0);
    }
}

#[test]
fn losers_bracket_round_tables() {
    let tables: [(u32, &[u32]); 4] = [
        (4, &[1, 1]),
        (8, &[2, 2, 1, 1]),
        (16, &[4, 4, 2, 2, 1, 1]),
        (32, &[8, 8, 4, 4, 2, 2, 1, 1]),
    ];
    for (size, expected) in tables {
        let layout = BracketLayout::from_size(BracketType::Double, size);
        assert_eq!(layout.losers_rounds(), 2 * (layout.winners_rounds - 1));
        let counts: Vec<u32> = (1..=layout.losers_rounds())
            .map(|k| layout.matches_in(Zone::Losers(k)))
            .collect();
        assert_eq!(counts, expected, "size {size}");
        assert_eq!(counts.iter().sum::<u32>(), size - 2, "size {size}");
        assert_eq!(layout.matches_in(Zone::GrandFinal), 1);
        assert_eq!(layout.matches_in(Zone::BracketReset), 1);
        assert_eq!(layout.total_matches(), (size - 1) + (size - 2) + 2);
    }
}

#[test]
fn two_slot_double_bracket_has_no_losers_rounds() {
    let layout = BracketLayout::from_size(BracketType::Double, 2);
    assert_eq!(layout.losers_rounds(), 0);
    assert_eq!(layout.losers_final(), None);
    assert_eq!(layout.loser_drop(1, 1), Some((Zone::GrandFinal, 1, Slot::Two)));
    assert_eq!(
        layout.sources(Zone::GrandFinal, 1),
        [
            SlotSource::WinnerOf(Zone::Winners(1), 1),
            SlotSource::LoserOf(Zone::Winners(1), 1)
        ]
    );
}

#[test]
fn loser_drops_in_an_eight_slot_bracket() {
    let layout = BracketLayout::from_size(BracketType::Double, 8);
    assert_eq!(layout.loser_drop(1, 1), Some((Zone::Losers(1), 1, Slot::One)));
    assert_eq!(layout.loser_drop(1, 2), Some((Zone::Losers(1), 1, Slot::Two)));
    assert_eq!(layout.loser_drop(1, 3), Some((Zone::Losers(1), 2, Slot::One)));
    assert_eq!(layout.loser_drop(2, 2), Some((Zone::Losers(2), 2, Slot::Two)));
    assert_eq!(layout.loser_drop(3, 1), Some((Zone::Losers(4), 1, Slot::Two)));

    let single = BracketLayout::from_size(BracketType::Single, 8);
    assert_eq!(single.loser_drop(1, 1), None);
}

#[test]
fn every_loser_drop_is_a_declared_source() {
    for size in [4, 8, 16, 32, 64] {
        let layout = BracketLayout::from_size(BracketType::Double, size);
        for round in 1..=layout.winners_rounds {
            for position in 1..=layout.matches_in(Zone::Winners(round)) {
                let (zone, target, slot) = layout.loser_drop(round, position).unwrap();
                assert!(target <= layout.matches_in(zone), "size {size}: {zone} has no position {target}");
                let sources = layout.sources(zone, target);
                let source = match slot {
                    Slot::One => sources[0],
                    Slot::Two => sources[1],
                };
                assert_eq!(source, SlotSource::LoserOf(Zone::Winners(round), position));
            }
        }
    }
}

#[test]
fn zone_round_numbers() {
    let cases = [
        (Zone::Winners(1), 1),
        (Zone::Winners(99), 99),
        (Zone::Losers(1), 100),
        (Zone::Losers(4), 103),
        (Zone::GrandFinal, 1000),
        (Zone::BracketReset, 1001),
    ];
    for (zone, round) in cases {
        assert_eq!(zone.round_number(), round);
        assert_eq!(Zone::from_round_number(round), Some(zone));
    }
    assert_eq!(Zone::from_round_number(0), None);
    assert_eq!(Zone::from_round_number(1002), None);

    assert!(Zone::Winners(5) < Zone::Losers(1));
    assert!(Zone::Losers(900) < Zone::GrandFinal);
    assert!(Zone::GrandFinal < Zone::BracketReset);
}

#[test]
fn zone_serializes_as_round_number() {
    assert_eq!(serde_json::to_value(Zone::Losers(2)).unwrap(), serde_json::json!(101));
    assert_eq!(serde_json::from_str::<Zone>("1000").unwrap(), Zone::GrandFinal);
    assert!(serde_json::from_str::<Zone>("0").is_err());
}
