//! Choreography engine
//!
//! Turns UI commands into time-ordered steps on the [`Timeline`]:
//! - Deal: standard side cycle, euchre bundles, or straight into hands
//! - Stack by side after the tossed cards settle
//! - Re-fan held cards, gather to a corner and pick up
//! - Flip a single card
//!
//! Commands return at once with a [`Ticket`]. Steps that are due immediately
//! run inside the command; the rest run from [`Choreographer::update`], which
//! the host calls once per fixed tick after stepping the engine. Every step
//! re-checks that its cards still exist, so a reset in the middle of a routine
//! leaves nothing half-applied.

use glam::Vec3;

use super::engine::TableEngine;
use super::entity::{
    CardEntity, Easing, EntityId, PhysicsMode, Transform, flip_rotation, heading, is_face_up,
    resting_rotation,
};
use super::layout::{self, Corner, Side};
use super::physics_mode;
use super::reactor::WearReactor;
use super::session::{Arrangement, SceneSession};
use super::timeline::Timeline;
use super::toss;
use crate::consts::timing::*;
use crate::consts::*;
use crate::settings::{DealMode, LiveSettings, Settings};
use crate::yaw;

/// How far a card rises off the deck while turning face up
const TOSS_LIFT: f32 = 0.03;
/// How high the gathered pile is lifted before it leaves the table
const PICKUP_HEIGHT: f32 = 0.3;

/// Completion handle for one command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticket {
    pub id: u64,
    /// Scheduler time at which the command's last animation has finished
    pub done_at: f32,
}

impl Ticket {
    pub fn is_done(&self, now: f32) -> bool {
        now >= self.done_at
    }
}

#[derive(Debug, Clone)]
enum Step {
    /// Kinematic pre-roll: turn face up above the deck
    PreRoll {
        card: EntityId,
        side: Side,
        jitter: f32,
    },
    /// Hand the card to physics with a toss velocity
    Launch {
        card: EntityId,
        side: Side,
        jitter: f32,
        from: Transform,
    },
    /// Kinematic move to a fixed pose
    Animate {
        card: EntityId,
        target: Transform,
        duration: f32,
        easing: Easing,
    },
    StackBySide,
    SlideToCorner(Corner),
    PickUp(Corner),
    RestoreDynamic(EntityId),
    ClearTable,
}

pub struct Choreographer {
    timeline: Timeline<Step>,
    reactor: WearReactor,
    next_ticket: u64,
    busy_until: f32,
    seen_revision: u64,
}

impl Default for Choreographer {
    fn default() -> Self {
        Self::new()
    }
}

impl Choreographer {
    pub fn new() -> Self {
        Self {
            timeline: Timeline::new(),
            reactor: WearReactor::new(),
            next_ticket: 0,
            busy_until: 0.0,
            seen_revision: 0,
        }
    }

    /// Scheduler time
    pub fn now(&self) -> f32 {
        self.timeline.now()
    }

    /// No pending steps and every issued animation has had time to finish
    pub fn is_idle(&self) -> bool {
        self.timeline.is_empty() && self.now() >= self.busy_until
    }

    pub fn pending_steps(&self) -> usize {
        self.timeline.len()
    }

    pub fn reactor(&self) -> &WearReactor {
        &self.reactor
    }

    /// One scheduler tick: run due steps, react to collisions, pick up
    /// settings changes.
    pub fn update(
        &mut self,
        dt: f32,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        live: &LiveSettings,
    ) {
        self.timeline.advance(dt);
        let settings = live.get();
        self.run_due(engine, session, settings);
        self.reactor
            .process(engine, session, settings, self.timeline.now());

        if live.revision() != self.seen_revision {
            self.seen_revision = live.revision();
            log::debug!("Settings revision {}", self.seen_revision);
            session.refresh_all_appearances(engine, settings);
            if self.is_idle() {
                self.update_in_hands_positions(engine, session, settings);
            }
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn deal(
        &mut self,
        mode: DealMode,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        self.begin("deal");
        log::info!("Dealing {:?} ({} cards)", mode, mode.card_count());
        let ticket = match mode {
            DealMode::Cards(n) => self.deal_standard(n, engine, session, settings),
            DealMode::Euchre => self.deal_euchre(engine, session, settings),
            DealMode::InHands(n) => self.deal_in_hands(n, engine, session, settings),
        };
        self.run_due(engine, session, settings);
        ticket
    }

    /// Slide every card to `corner`, pause, lift the pile and remove it
    pub fn gather_and_pick_up(
        &mut self,
        corner: Corner,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        self.begin("gather");
        if session.card_count() == 0 {
            session.remove_cards(engine);
            return self.ticket(self.now());
        }
        log::info!("Gathering {} cards to {:?}", session.card_count(), corner);
        session.set_arrangement(Arrangement::Gathering);

        self.timeline.schedule(0.0, Step::SlideToCorner(corner));
        self.timeline
            .schedule(GATHER_SLIDE + GATHER_PAUSE, Step::PickUp(corner));
        let done_at = self
            .timeline
            .schedule(GATHER_SLIDE + GATHER_PAUSE + PICKUP_LIFT, Step::ClearTable);

        let ticket = self.ticket(done_at);
        self.run_due(engine, session, settings);
        ticket
    }

    /// Re-fan the cards already assigned to sides, using the fixed arc
    pub fn fan_in_hands(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        self.begin("fan");
        if session.sides.is_empty() {
            log::debug!("Nothing dealt, nothing to fan");
            return self.ticket(self.now());
        }
        session.spawn_hands(engine);

        for side in Side::ALL {
            let cards = session.sides.cards_on(side);
            let count = cards.len();
            for (i, card) in cards.into_iter().enumerate() {
                self.timeline.schedule(
                    0.0,
                    Step::Animate {
                        card,
                        target: layout::refan_transform(side, i, count),
                        duration: REFAN_MOVE,
                        easing: Easing::EaseInOut,
                    },
                );
            }
        }
        session.set_arrangement(Arrangement::Fanned);

        let ticket = self.ticket(self.now() + REFAN_MOVE);
        self.run_due(engine, session, settings);
        ticket
    }

    /// Snap held cards to their fan slots using the current per-side tuning.
    /// Only acts while the cards are held in hands.
    pub fn update_in_hands_positions(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &SceneSession,
        settings: &Settings,
    ) {
        if session.arrangement() != Arrangement::InHands {
            return;
        }
        for side in Side::ALL {
            let cards = session.sides.cards_on(side);
            let count = cards.len();
            for (i, id) in cards.into_iter().enumerate() {
                let Some(entity) = live_card(engine, session, id) else {
                    continue;
                };
                physics_mode::set_mode(engine, id, entity.body, PhysicsMode::Kinematic);
                engine.set_transform(
                    id,
                    layout::fan_transform(side, i, count, settings.side(side)),
                );
            }
        }
    }

    /// Turn one card over. Unknown ids are ignored.
    pub fn flip(
        &mut self,
        card: EntityId,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        let Some(entity) = live_card(engine, session, card) else {
            log::debug!("Flip ignored, no card {:?}", card);
            return self.ticket(self.now());
        };
        let Some(current) = engine.transform(card) else {
            return self.ticket(self.now());
        };
        self.begin("flip");

        let was_dynamic = engine.physics_mode(card) == Some(PhysicsMode::Dynamic);
        physics_mode::set_mode(engine, card, entity.body, PhysicsMode::Kinematic);
        // Always land flat, whatever pose a tween or the solver left behind
        let face_up = !is_face_up(current.rotation);
        let target = Transform {
            rotation: resting_rotation(heading(current.rotation), face_up),
            ..current
        };
        engine.animate_to(card, target, FLIP, Easing::EaseInOut);
        session.record_wear(engine, card, settings);

        let done_at = self.now() + FLIP;
        if was_dynamic {
            self.timeline.schedule(FLIP, Step::RestoreDynamic(card));
        }
        self.ticket(done_at)
    }

    /// Flip the card at stack `index`; out of range is a no-op
    pub fn flip_at(
        &mut self,
        index: usize,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        match session.card_at(index).map(|c| c.id) {
            Some(id) => self.flip(id, engine, session, settings),
            None => {
                log::debug!("Flip ignored, index {} out of range", index);
                self.ticket(self.now())
            }
        }
    }

    /// Abort everything, lay a fresh deck and zero wear
    pub fn reset(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        log::info!("Resetting table");
        self.timeline.clear();
        self.reactor.clear(engine);
        session.reset(engine, settings);
        self.busy_until = self.now();
        self.ticket(self.now())
    }

    // ========================================================================
    // Deal routines
    // ========================================================================

    /// Make sure a full, undealt deck is on the table
    fn prepare_deck(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) {
        if session.arrangement() != Arrangement::InDeck {
            session.redeal_deck(engine, settings);
        }
    }

    fn deal_standard(
        &mut self,
        n: usize,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        self.prepare_deck(engine, session, settings);
        let n = n.min(session.card_count());
        if n == 0 {
            return self.ticket(self.now());
        }

        let total = session.card_count();
        for k in 0..n {
            let Some(card) = session.card_at(total - 1 - k).map(|c| c.id) else {
                continue;
            };
            let side = pattern_side(&STANDARD_SIDE_PATTERN, k);
            session.sides.assign(card, side);
            self.timeline.schedule(
                k as f32 * DEAL_INTERVAL,
                Step::PreRoll {
                    card,
                    side,
                    jitter: toss::STANDARD_JITTER,
                },
            );
        }
        session.set_arrangement(Arrangement::Tossed);

        let last_launch = (n - 1) as f32 * DEAL_INTERVAL + TOSS_FLIP;
        self.finish_with_stack(last_launch)
    }

    fn deal_euchre(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        self.prepare_deck(engine, session, settings);

        let mut top = session.card_count();
        let mut delay = 0.0;
        let mut last_launch = None;
        for (&size, &side_n) in EUCHRE_BUNDLE_SIZES.iter().zip(EUCHRE_BUNDLE_SIDES.iter()) {
            let Some(side) = Side::from_number(side_n) else {
                continue;
            };
            for j in 0..size {
                if top == 0 {
                    log::warn!("Deck ran out during euchre deal");
                    break;
                }
                top -= 1;
                let Some(card) = session.card_at(top).map(|c| c.id) else {
                    continue;
                };
                session.sides.assign(card, side);
                let at = delay + j as f32 * BUNDLE_CARD_INTERVAL;
                self.timeline.schedule(
                    at,
                    Step::PreRoll {
                        card,
                        side,
                        jitter: toss::BUNDLE_JITTER,
                    },
                );
                last_launch = Some(at + TOSS_FLIP);
            }
            log::debug!("Bundle of {} to side {}", size, side_n);
            delay += size.saturating_sub(1) as f32 * BUNDLE_CARD_INTERVAL + BUNDLE_PAUSE;
        }

        let Some(last_launch) = last_launch else {
            return self.ticket(self.now());
        };
        session.set_arrangement(Arrangement::Tossed);
        self.finish_with_stack(last_launch)
    }

    fn deal_in_hands(
        &mut self,
        n: usize,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) -> Ticket {
        self.prepare_deck(engine, session, settings);
        let n = n.min(session.card_count());
        if n == 0 {
            return self.ticket(self.now());
        }
        session.spawn_hands(engine);

        let total = session.card_count();
        for k in 0..n {
            if let Some(card) = session.card_at(total - 1 - k).map(|c| c.id) {
                session
                    .sides
                    .assign(card, pattern_side(&STANDARD_SIDE_PATTERN, k));
            }
        }

        let mut order: usize = 0;
        for side in Side::ALL {
            let cards = session.sides.cards_on(side);
            let count = cards.len();
            for (i, card) in cards.into_iter().enumerate() {
                self.timeline.schedule(
                    order as f32 * HAND_FAN_STAGGER,
                    Step::Animate {
                        card,
                        target: layout::fan_transform(side, i, count, settings.side(side)),
                        duration: HAND_FAN_MOVE,
                        easing: Easing::EaseOut,
                    },
                );
                order += 1;
            }
        }
        session.set_arrangement(Arrangement::InHands);

        let last = order.saturating_sub(1) as f32 * HAND_FAN_STAGGER;
        self.ticket(self.now() + last + HAND_FAN_MOVE)
    }

    /// Settle, then pile the tossed cards by side
    fn finish_with_stack(&mut self, last_launch: f32) -> Ticket {
        let stack_at = self
            .timeline
            .schedule(last_launch + SETTLE_TIME, Step::StackBySide);
        self.ticket(stack_at + STACK_MOVE)
    }

    // ========================================================================
    // Step execution
    // ========================================================================

    fn run_due(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) {
        while let Some(step) = self.timeline.pop_due() {
            self.run_step(step, engine, session, settings);
        }
    }

    fn run_step(
        &mut self,
        step: Step,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
    ) {
        match step {
            Step::PreRoll { card, side, jitter } => {
                let Some(entity) = live_card(engine, session, card) else {
                    return;
                };
                let Some(current) = engine.transform(card) else {
                    return;
                };
                let from = Transform {
                    position: current.position + Vec3::Y * TOSS_LIFT,
                    rotation: yaw(side.facing()) * flip_rotation(),
                    ..current
                };
                physics_mode::set_mode(engine, card, entity.body, PhysicsMode::Kinematic);
                engine.animate_to(card, from, TOSS_FLIP, Easing::EaseOut);
                self.timeline.schedule(
                    TOSS_FLIP,
                    Step::Launch {
                        card,
                        side,
                        jitter,
                        from,
                    },
                );
            }
            Step::Launch {
                card,
                side,
                jitter,
                from,
            } => {
                let Some(entity) = live_card(engine, session, card) else {
                    return;
                };
                engine.set_transform(card, from);
                let target = toss::jitter_target(side.stack_point(), jitter, session.rng());
                let velocity = toss::velocity_for_toss(from.position, target, side, session.rng());
                physics_mode::launch(engine, card, entity.body, velocity);
            }
            Step::Animate {
                card,
                target,
                duration,
                easing,
            } => {
                let Some(entity) = live_card(engine, session, card) else {
                    return;
                };
                physics_mode::set_mode(engine, card, entity.body, PhysicsMode::Kinematic);
                engine.animate_to(card, target, duration, easing);
            }
            Step::StackBySide => {
                log::debug!("Stacking by side");
                for side in Side::ALL {
                    for (i, id) in session.sides.cards_on(side).into_iter().enumerate() {
                        let Some(entity) = live_card(engine, session, id) else {
                            continue;
                        };
                        physics_mode::set_mode(engine, id, entity.body, PhysicsMode::Kinematic);
                        engine.animate_to(
                            id,
                            layout::stack_transform(side, i),
                            STACK_MOVE,
                            Easing::EaseOut,
                        );
                    }
                }
                session.set_arrangement(Arrangement::Stacked);
            }
            Step::SlideToCorner(corner) => {
                log::debug!("Sliding cards to {:?}", corner);
                let cards = session.cards().to_vec();
                for (i, entity) in cards.iter().enumerate() {
                    if !engine.contains(entity.id) {
                        continue;
                    }
                    physics_mode::set_mode(engine, entity.id, entity.body, PhysicsMode::Kinematic);
                    engine.animate_to(
                        entity.id,
                        layout::corner_transform(corner, i),
                        GATHER_SLIDE,
                        Easing::EaseInOut,
                    );
                    session.record_wear(engine, entity.id, settings);
                }
            }
            Step::PickUp(corner) => {
                log::debug!("Picking up pile at {:?}", corner);
                for (i, entity) in session.cards().iter().enumerate() {
                    let mut target = layout::corner_transform(corner, i);
                    target.position.y += PICKUP_HEIGHT;
                    engine.animate_to(entity.id, target, PICKUP_LIFT, Easing::EaseIn);
                }
            }
            Step::RestoreDynamic(card) => {
                if let Some(entity) = live_card(engine, session, card) {
                    // Hand back at rest; the solver takes it from the flat pose
                    physics_mode::clear_velocity(engine, card, entity.body);
                    physics_mode::set_mode(engine, card, entity.body, PhysicsMode::Dynamic);
                }
            }
            Step::ClearTable => {
                session.remove_cards(engine);
                log::info!("Table cleared");
            }
        }
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    fn begin(&self, command: &str) {
        if !self.is_idle() {
            log::warn!(
                "'{}' issued while a routine is still running ({} steps pending)",
                command,
                self.timeline.len()
            );
        }
    }

    fn ticket(&mut self, done_at: f32) -> Ticket {
        self.next_ticket += 1;
        self.busy_until = self.busy_until.max(done_at);
        Ticket {
            id: self.next_ticket,
            done_at,
        }
    }
}

/// Side for the `k`th card of a cyclic deal pattern
fn pattern_side(pattern: &[u8], k: usize) -> Side {
    Side::from_number(pattern[k % pattern.len()]).unwrap_or(Side::Bottom)
}

/// The card behind `id`, if it is still part of the session and the scene
fn live_card(engine: &dyn TableEngine, session: &SceneSession, id: EntityId) -> Option<CardEntity> {
    if !engine.contains(id) {
        return None;
    }
    session.card(id).copied()
}
