//! Card Table - headless native demo
//!
//! Drives one full session against the in-memory engine and logs what
//! happens. Run with `RUST_LOG=debug` to see every phase.

use std::path::PathBuf;

use card_table::table::{Corner, ProceduralTextures, is_face_up};
use card_table::{CardTable, DealMode, HeadlessEngine, Settings, Side, TableEngine};

/// Simulated display refresh for the demo loop
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on a command after this long
const COMMAND_LIMIT: f32 = 15.0;

fn main() {
    env_logger::init();
    log::info!("Card Table (native) starting...");

    let settings = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Settings::load(&path),
        None => Settings::default(),
    };

    let mut table = CardTable::new(
        HeadlessEngine::new(),
        settings,
        Box::new(ProceduralTextures::default()),
    );

    let ticket = table.deal_default();
    play(&mut table, ticket.done_at);
    report_sides(&table);

    let ticket = table.fan_in_hands();
    play(&mut table, ticket.done_at);

    if let Some(card) = table.session().cards().last().map(|c| c.id) {
        let before = table.engine().transform(card).map(|t| is_face_up(t.rotation));
        let ticket = table.flip(card);
        play(&mut table, ticket.done_at);
        let after = table.engine().transform(card).map(|t| is_face_up(t.rotation));
        log::info!("Flipped {:?}: face up {:?} -> {:?}", card, before, after);
    }

    let ticket = table.gather_and_pick_up(Corner::NearRight);
    play(&mut table, ticket.done_at);
    log::info!(
        "Gathered: {} cards left, {} assignments",
        table.session().card_count(),
        table.session().sides.len()
    );

    let ticket = table.deal(DealMode::InHands(12));
    play(&mut table, ticket.done_at);
    report_sides(&table);

    table.reset();
    log::info!(
        "Reset at t={:.2}s, {} cards in the deck",
        table.now(),
        table.session().card_count()
    );
}

/// Feed frames until the scheduler passes `done_at`
fn play(table: &mut CardTable<HeadlessEngine>, done_at: f32) {
    let deadline = table.now() + COMMAND_LIMIT;
    while table.now() < done_at && table.now() < deadline {
        table.frame(FRAME_DT);
    }
    if !table.is_idle() {
        log::warn!("Command still running at t={:.2}s", table.now());
    }
}

fn report_sides(table: &CardTable<HeadlessEngine>) {
    for side in Side::ALL {
        let cards = table.session().sides.cards_on(side);
        let labels: Vec<String> = cards
            .iter()
            .filter_map(|&id| table.session().card(id))
            .map(|c| c.card.label())
            .collect();
        log::info!("Side {}: {}", side.number(), labels.join(", "));
    }
}
