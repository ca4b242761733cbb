//! Full routines driven against the headless engine

use card_table::consts::*;
use card_table::table::{
    Arrangement, Corner, PhysicsMode, ProceduralTextures, TableEngine, Velocity, WearLevel,
    heading, is_face_up, physics_mode,
};
use card_table::{CardTable, DealMode, HeadlessEngine, Settings, Side};
use glam::Vec3;

fn table_with(settings: Settings) -> CardTable<HeadlessEngine> {
    CardTable::new(
        HeadlessEngine::new(),
        settings,
        Box::new(ProceduralTextures::default()),
    )
}

fn table() -> CardTable<HeadlessEngine> {
    table_with(Settings::default())
}

fn finish(table: &mut CardTable<HeadlessEngine>, ticket: card_table::Ticket) {
    assert!(table.run_until(ticket, 20.0), "routine did not finish");
    // one extra tick so tweens that end on the same instant have landed
    table.tick();
}

#[test]
fn standard_deal_cycles_sides_from_the_top() {
    let mut t = table();
    let total = t.session().card_count();
    let dealt: Vec<_> = (0..10)
        .map(|k| t.session().card_at(total - 1 - k).unwrap().id)
        .collect();

    t.deal(DealMode::Cards(10));

    let expected = [2, 3, 4, 1, 2, 3, 4, 1, 2, 3];
    for (k, id) in dealt.iter().enumerate() {
        let side = t.session().sides.side_of(*id).expect("dealt card has a side");
        assert_eq!(side.number(), expected[k], "deal order {}", k);
    }
    assert_eq!(t.session().sides.len(), 10);
    // The rest of the deck stays unassigned
    assert!(t.session().sides.side_of(t.session().cards()[0].id).is_none());
}

#[test]
fn standard_deal_ends_stacked_and_at_rest() {
    let mut t = table();
    let ticket = t.deal(DealMode::Cards(8));
    finish(&mut t, ticket);

    assert_eq!(t.session().arrangement(), Arrangement::Stacked);
    for side in Side::ALL {
        let pile = t.session().sides.cards_on(side);
        assert_eq!(pile.len(), 2);
        for id in pile {
            let transform = t.engine().transform(id).unwrap();
            assert!(is_face_up(transform.rotation));
            assert!((transform.position - side.stack_point()).length() < 0.01);
            assert_eq!(t.engine().physics_mode(id), Some(PhysicsMode::Kinematic));
            assert!(t.engine().velocity(id).unwrap().is_zero());
        }
    }
}

#[test]
fn euchre_deal_partitions_twenty_cards_in_bundles() {
    let mut t = table();
    let total = t.session().card_count();
    let ids: Vec<_> = t.session().cards().iter().map(|c| c.id).collect();

    t.deal(DealMode::Euchre);

    let mut top = total;
    for (&size, &side) in EUCHRE_BUNDLE_SIZES.iter().zip(EUCHRE_BUNDLE_SIDES.iter()) {
        for _ in 0..size {
            top -= 1;
            let got = t.session().sides.side_of(ids[top]).map(|s| s.number());
            assert_eq!(got, Some(side), "card at stack index {}", top);
        }
    }
    assert_eq!(t.session().sides.len(), 20);
    for id in &ids[..total - 20] {
        assert!(t.session().sides.side_of(*id).is_none(), "kitty card was dealt");
    }
    for side in Side::ALL {
        assert_eq!(t.session().sides.cards_on(side).len(), 5);
    }
}

#[test]
fn in_hands_deal_fans_without_physics() {
    let mut t = table();
    let ticket = t.deal(DealMode::InHands(12));
    finish(&mut t, ticket);

    assert_eq!(t.session().arrangement(), Arrangement::InHands);
    assert_eq!(t.session().hands().len(), 4);
    for side in Side::ALL {
        let cards = t.session().sides.cards_on(side);
        assert_eq!(cards.len(), 3);
        for id in cards {
            assert_eq!(t.engine().physics_mode(id), Some(PhysicsMode::Kinematic));
            let pos = t.engine().transform(id).unwrap().position;
            let radius = t.settings().side(side).arc_radius;
            assert!(card_table::planar_distance(pos, side.hand_center()) <= radius + 1e-4);
        }
    }
}

#[test]
fn refan_moves_held_cards_to_fixed_arc() {
    let mut t = table();
    let ticket = t.deal(DealMode::InHands(8));
    finish(&mut t, ticket);
    let ticket = t.fan_in_hands();
    finish(&mut t, ticket);

    assert_eq!(t.session().arrangement(), Arrangement::Fanned);
    for side in Side::ALL {
        let cards = t.session().sides.cards_on(side);
        let count = cards.len();
        for (i, id) in cards.into_iter().enumerate() {
            let expected = card_table::table::layout::refan_transform(side, i, count);
            let got = t.engine().transform(id).unwrap();
            assert!((got.position - expected.position).length() < 1e-5);
        }
    }

    // Not held in hands any more: a settings change must not snap them back
    let id = t.session().sides.cards_on(Side::Left)[0];
    let before = t.engine().transform(id).unwrap();
    t.update_settings(|s| s.side_mut(Side::Left).fan_angle = 10.0);
    t.run_for(0.1);
    assert_eq!(t.engine().transform(id).unwrap(), before);
}

#[test]
fn gather_leaves_an_empty_table() {
    let mut t = table();
    let ticket = t.deal(DealMode::Euchre);
    finish(&mut t, ticket);

    let ticket = t.gather_and_pick_up(Corner::FarLeft);
    assert_eq!(t.session().arrangement(), Arrangement::Gathering);
    finish(&mut t, ticket);

    assert_eq!(t.session().card_count(), 0);
    assert!(t.session().sides.is_empty());
    assert_eq!(t.session().arrangement(), Arrangement::Empty);

    // Again with nothing on the table
    let ticket = t.gather_and_pick_up(Corner::NearLeft);
    assert!(ticket.is_done(t.now()));
    assert_eq!(t.session().card_count(), 0);
    assert!(t.session().sides.is_empty());
}

#[test]
fn deal_after_gather_lays_a_fresh_deck() {
    let mut t = table();
    let ticket = t.gather_and_pick_up(Corner::NearRight);
    finish(&mut t, ticket);
    assert_eq!(t.session().card_count(), 0);

    let ticket = t.deal(DealMode::Cards(4));
    assert_eq!(t.session().card_count(), card_table::card::DECK_SIZE);
    assert_eq!(t.session().sides.len(), 4);
    finish(&mut t, ticket);
    assert_eq!(t.session().arrangement(), Arrangement::Stacked);
}

#[test]
fn flip_twice_restores_orientation_and_dynamic_mode() {
    let mut t = table();
    let card = t.session().cards()[0].id;
    t.engine_mut().set_physics_mode(card, PhysicsMode::Dynamic);
    t.run_for(0.2);
    let originally_up = is_face_up(t.engine().transform(card).unwrap().rotation);

    let ticket = t.flip(card);
    assert_eq!(t.engine().physics_mode(card), Some(PhysicsMode::Kinematic));
    finish(&mut t, ticket);
    assert_ne!(
        is_face_up(t.engine().transform(card).unwrap().rotation),
        originally_up
    );
    assert_eq!(t.engine().physics_mode(card), Some(PhysicsMode::Dynamic));

    let ticket = t.flip(card);
    finish(&mut t, ticket);
    assert_eq!(
        is_face_up(t.engine().transform(card).unwrap().rotation),
        originally_up
    );
    assert_eq!(t.engine().physics_mode(card), Some(PhysicsMode::Dynamic));
}

#[test]
fn flip_of_kinematic_card_stays_kinematic() {
    let mut t = table();
    let card = t.session().cards()[5].id;
    let ticket = t.flip(card);
    finish(&mut t, ticket);
    assert!(is_face_up(t.engine().transform(card).unwrap().rotation));
    assert_eq!(t.engine().physics_mode(card), Some(PhysicsMode::Kinematic));
    assert!(t.choreographer().is_idle());
}

fn lies_flat(t: &CardTable<HeadlessEngine>, card: card_table::table::EntityId) -> bool {
    let up = t.engine().transform(card).unwrap().rotation * Vec3::Y;
    up.y.abs() > 0.999
}

fn same_heading(a: f32, b: f32) -> bool {
    (a - b).cos() > 1.0 - 1e-5
}

#[test]
fn flip_during_flip_lands_flat() {
    let mut t = table();
    let card = t.session().cards()[0].id;
    let start = heading(t.engine().transform(card).unwrap().rotation);

    t.flip(card);
    t.run_for(timing::FLIP * 0.5);
    let ticket = t.flip(card);
    finish(&mut t, ticket);

    assert!(lies_flat(&t, card));
    let rotation = t.engine().transform(card).unwrap().rotation;
    assert!(same_heading(heading(rotation), start));

    // And a clean flip from there still turns it over
    let was_up = is_face_up(rotation);
    let ticket = t.flip(card);
    finish(&mut t, ticket);
    assert!(lies_flat(&t, card));
    assert_ne!(is_face_up(t.engine().transform(card).unwrap().rotation), was_up);
}

#[test]
fn flip_of_tilted_hand_card_lands_flat() {
    let mut t = table();
    let ticket = t.deal(DealMode::InHands(8));
    finish(&mut t, ticket);

    let card = t.session().sides.cards_on(Side::Right)[0];
    let before = t.engine().transform(card).unwrap();
    assert!(!lies_flat(&t, card));

    let ticket = t.flip(card);
    finish(&mut t, ticket);
    let after = t.engine().transform(card).unwrap();
    assert!(lies_flat(&t, card));
    assert_ne!(is_face_up(after.rotation), is_face_up(before.rotation));
    assert!(same_heading(heading(after.rotation), heading(before.rotation)));
    assert!((after.position - before.position).length() < 1e-5);
}

#[test]
fn kinematic_switch_clears_velocity() {
    let mut t = table();
    let entity = t.session().cards()[0];
    let engine = t.engine_mut();
    physics_mode::launch(
        engine,
        entity.id,
        entity.body,
        Velocity::new(Vec3::new(0.4, 1.0, 0.0), Vec3::new(0.0, 4.0, 0.0)),
    );
    assert!(!engine.velocity(entity.id).unwrap().is_zero());

    physics_mode::set_mode(engine, entity.id, entity.body, PhysicsMode::Kinematic);
    assert!(engine.velocity(entity.id).unwrap().is_zero());
}

#[test]
fn felt_disturbances_never_exceed_cap() {
    let mut t = table();
    let ticket = t.deal(DealMode::Cards(24));

    let mut peak = 0;
    while !ticket.is_done(t.now()) {
        t.tick();
        let active = t.choreographer().reactor().active_disturbances();
        assert!(active <= MAX_FELT_DISTURBANCES);
        assert!(t.engine().particle_count() <= MAX_FELT_DISTURBANCES);
        peak = peak.max(active);
    }
    assert!(peak > 0, "landing cards should disturb the felt");

    t.run_for(FELT_DISTURBANCE_LIFETIME + 0.1);
    assert_eq!(t.engine().particle_count(), 0);
}

#[test]
fn reduced_motion_suppresses_felt_effects() {
    let mut t = table_with(Settings {
        reduced_motion: true,
        ..Default::default()
    });
    let ticket = t.deal(DealMode::Cards(8));
    while !ticket.is_done(t.now()) {
        t.tick();
        assert_eq!(t.engine().particle_count(), 0);
    }
}

#[test]
fn wear_from_landing_flip_and_gather_share_one_counter() {
    let mut t = table();
    let ticket = t.deal(DealMode::Cards(4));
    finish(&mut t, ticket);

    let tossed = t.session().sides.cards_on(Side::Left)[0];
    let tossed_card = t.session().card(tossed).unwrap().card_id();
    let untouched_card = t.session().cards()[0].card_id();

    let landed = t.session().wear.state(tossed_card).unwrap().count();
    assert!(landed >= 1, "landing should count as an interaction");
    assert_eq!(t.session().wear.state(untouched_card).unwrap().count(), 0);

    let ticket = t.flip(tossed);
    finish(&mut t, ticket);
    assert_eq!(t.session().wear.state(tossed_card).unwrap().count(), landed + 1);

    let ticket = t.gather_and_pick_up(Corner::FarRight);
    finish(&mut t, ticket);
    assert_eq!(t.session().wear.state(tossed_card).unwrap().count(), landed + 2);
    assert_eq!(t.session().wear.state(untouched_card).unwrap().count(), 1);
}

#[test]
fn wear_level_change_refreshes_texture_and_reset_restores_it() {
    let mut t = table();
    let entity = t.session().cards()[2];
    let fresh = t.engine().appearance(entity.id);

    for _ in 0..3 {
        let ticket = t.flip(entity.id);
        finish(&mut t, ticket);
    }
    assert_eq!(t.session().wear.level(entity.card_id()), WearLevel::Light);
    assert_ne!(t.engine().appearance(entity.id), fresh);

    t.reset();
    assert_eq!(t.session().wear.level(entity.card_id()), WearLevel::None);
    let respawned = t
        .session()
        .cards()
        .iter()
        .find(|c| c.card_id() == entity.card_id())
        .unwrap()
        .id;
    assert_eq!(t.engine().appearance(respawned), fresh);
}

#[test]
fn wear_tracking_off_records_nothing() {
    let mut t = table_with(Settings {
        wear_tracking: false,
        ..Default::default()
    });
    let ticket = t.deal(DealMode::Cards(4));
    finish(&mut t, ticket);
    let ticket = t.gather_and_pick_up(Corner::NearLeft);
    finish(&mut t, ticket);
    assert!(t.session().wear.is_empty());
}

#[test]
fn visual_only_card_is_skipped_but_deal_completes() {
    let mut engine = HeadlessEngine::new();
    let settings = Settings::default();
    // Find which card will be on top so we can refuse its body
    let preview = table_with(settings.clone());
    let top = *preview.session().deck().last().unwrap();
    engine.refuse_bodies_for(&top.label());

    let mut t = CardTable::new(engine, settings, Box::new(ProceduralTextures::default()));
    let top_id = t.session().cards().last().unwrap().id;
    assert_eq!(t.engine().physics_mode(top_id), None);

    let ticket = t.deal(DealMode::Cards(4));
    finish(&mut t, ticket);
    assert_eq!(t.session().arrangement(), Arrangement::Stacked);
    // Still animated onto its pile even though it never flew
    let side = t.session().sides.side_of(top_id).unwrap();
    let pos = t.engine().transform(top_id).unwrap().position;
    assert!((pos - side.stack_point()).length() < 0.01);
}

#[test]
fn reset_mid_routine_is_safe() {
    let mut t = table();
    t.deal(DealMode::Euchre);
    t.run_for(0.5);
    t.reset();
    assert!(t.is_idle());
    assert_eq!(t.session().arrangement(), Arrangement::InDeck);
    t.run_for(4.0);
    assert_eq!(t.session().arrangement(), Arrangement::InDeck);
    assert_eq!(t.engine().particle_count(), 0);
    assert!(t.session().sides.is_empty());
}
