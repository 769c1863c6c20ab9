use coterie_engine::content::standard_discipline;
use coterie_engine::{
    begin_edit, diff, recalculate, Character, DamageState, DamageTrack, PowerId,
};
use proptest::prelude::*;

fn damage_state() -> impl Strategy<Value = DamageState> {
    prop_oneof![
        Just(DamageState::Ok),
        Just(DamageState::Superficial),
        Just(DamageState::Aggravated),
    ]
}

fn fortitude_powers() -> Vec<(PowerId, u8)> {
    let fortitude = standard_discipline("Fortitude").unwrap();
    (1..=5u8)
        .flat_map(|level| fortitude.powers(level).iter().map(move |p| (p.id, level)))
        .collect()
}

fn vampire_with_fortitude() -> Character {
    let mut c = Character::new_vampire("Prop");
    c.learn_discipline(standard_discipline("Fortitude").unwrap())
        .unwrap();
    c
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn recalculation_is_a_fixed_point(
        stamina in 0i32..=5,
        resolve in 0i32..=5,
        composure in 0i32..=5,
        picks in proptest::collection::vec(0usize..9, 0..12),
    ) {
        let powers = fortitude_powers();
        let mut c = vampire_with_fortitude();
        c.set_attribute("Stamina", stamina).unwrap();
        c.set_attribute("Resolve", resolve).unwrap();
        c.set_attribute("Composure", composure).unwrap();
        for pick in picks {
            let (id, level) = powers[pick % powers.len()];
            c.toggle_power(id, "Fortitude", level).unwrap();
        }

        let first = c.clone();
        let again = recalculate(&mut c);
        prop_assert!(!again.changed());
        prop_assert_eq!(&c, &first);
        prop_assert_eq!(c.sheet.health_track.len() as i32, c.sheet.health);
        prop_assert_eq!(c.sheet.willpower_track.len() as i32, c.sheet.willpower);
    }

    #[test]
    fn growing_a_track_keeps_its_prefix(
        boxes in proptest::collection::vec(damage_state(), 0..12),
        grow in 0usize..8,
    ) {
        let mut track = DamageTrack::new(boxes.len());
        for (i, state) in boxes.iter().enumerate() {
            track.set(i, *state).unwrap();
        }
        let before = track.clone();

        let resize = track.resize(boxes.len() + grow);

        prop_assert_eq!(resize.dropped_marks, 0);
        prop_assert_eq!(track.len(), boxes.len() + grow);
        prop_assert_eq!(&track.boxes()[..boxes.len()], before.boxes());
        prop_assert!(track.boxes()[boxes.len()..].iter().all(|s| *s == DamageState::Ok));
    }

    #[test]
    fn current_level_counts_every_selection(
        picks in proptest::collection::vec(0usize..9, 0..24),
    ) {
        let powers = fortitude_powers();
        let mut c = vampire_with_fortitude();
        for pick in picks {
            let (id, level) = powers[pick % powers.len()];
            c.toggle_power(id, "Fortitude", level).unwrap();
            let fortitude = c.disciplines().unwrap().get("Fortitude").unwrap();
            let total: i32 = (1..=5u8).map(|l| fortitude.selected_at(l).len() as i32).sum();
            prop_assert_eq!(fortitude.current_level(), total);
        }
    }

    #[test]
    fn self_diff_is_always_empty(
        name in "[A-Za-z ]{0,12}",
        concept in "[A-Za-z ]{0,12}",
        strength in 0i32..=5,
        brawl in 0i32..=5,
        convictions in proptest::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let mut c = Character::new_ghoul(name);
        c.sheet.concept = concept;
        c.sheet.convictions = convictions;
        c.set_attribute("Strength", strength).unwrap();
        c.set_skill("Brawl", brawl).unwrap();

        prop_assert!(diff(&c, &c).unwrap().is_empty());
        prop_assert!(diff(&c, &c.clone()).unwrap().is_empty());
    }

    #[test]
    fn draft_mutation_never_leaks(
        name in "[A-Za-z]{1,10}",
        stamina in 0i32..=5,
        note in "[a-z ]{0,20}",
        picks in proptest::collection::vec(0usize..9, 0..6),
    ) {
        let powers = fortitude_powers();
        let original = vampire_with_fortitude();
        let snapshot = original.clone();

        let mut session = begin_edit(&original);
        let draft = session.draft_mut();
        draft.sheet.name = name.clone();
        draft.sheet.notes = note;
        draft.set_attribute("Stamina", stamina).unwrap();
        for pick in picks {
            let (id, level) = powers[pick % powers.len()];
            draft.toggle_power(id, "Fortitude", level).unwrap();
        }

        prop_assert_eq!(&original, &snapshot);
        let changed = session.pending_changes().unwrap();
        prop_assert_eq!(changed.is_empty(), session.draft() == &original);
    }
}
