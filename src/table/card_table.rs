//! One table session bundled with its engine
//!
//! Owns the engine, the session state, the choreographer and the live
//! settings, and drives them with a fixed-step accumulator so a variable
//! frame time still produces the same sequence of ticks.

use super::choreography::{Choreographer, Ticket};
use super::engine::TableEngine;
use super::entity::EntityId;
use super::layout::Corner;
use super::session::SceneSession;
use super::texture::TextureProvider;
use crate::consts::*;
use crate::settings::{DealMode, LiveSettings, Settings};

/// Longest frame fed into the accumulator (seconds)
const MAX_FRAME: f32 = 0.1;

pub struct CardTable<E: TableEngine> {
    engine: E,
    session: SceneSession,
    choreographer: Choreographer,
    settings: LiveSettings,
    accumulator: f32,
}

impl<E: TableEngine> CardTable<E> {
    /// Build the fixtures and lay a face-down deck
    pub fn new(mut engine: E, settings: Settings, provider: Box<dyn TextureProvider>) -> Self {
        let mut session = SceneSession::new(&mut engine, &settings, provider);
        session.spawn_deck(&mut engine, &settings);
        Self {
            engine,
            session,
            choreographer: Choreographer::new(),
            settings: LiveSettings::new(settings),
            accumulator: 0.0,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn session(&self) -> &SceneSession {
        &self.session
    }

    pub fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    /// Change settings; picked up on the next tick
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        self.settings.update(f);
    }

    pub fn now(&self) -> f32 {
        self.choreographer.now()
    }

    pub fn is_idle(&self) -> bool {
        self.choreographer.is_idle()
    }

    /// Deal with the configured default mode
    pub fn deal_default(&mut self) -> Ticket {
        let mode = self.settings.get().deal_mode;
        self.deal(mode)
    }

    pub fn deal(&mut self, mode: DealMode) -> Ticket {
        let settings = self.settings.get();
        self.choreographer
            .deal(mode, &mut self.engine, &mut self.session, settings)
    }

    pub fn gather_and_pick_up(&mut self, corner: Corner) -> Ticket {
        let settings = self.settings.get();
        self.choreographer
            .gather_and_pick_up(corner, &mut self.engine, &mut self.session, settings)
    }

    pub fn fan_in_hands(&mut self) -> Ticket {
        let settings = self.settings.get();
        self.choreographer
            .fan_in_hands(&mut self.engine, &mut self.session, settings)
    }

    pub fn update_in_hands_positions(&mut self) {
        let settings = self.settings.get();
        self.choreographer
            .update_in_hands_positions(&mut self.engine, &self.session, settings);
    }

    pub fn flip(&mut self, card: EntityId) -> Ticket {
        let settings = self.settings.get();
        self.choreographer
            .flip(card, &mut self.engine, &mut self.session, settings)
    }

    pub fn flip_at(&mut self, index: usize) -> Ticket {
        let settings = self.settings.get();
        self.choreographer
            .flip_at(index, &mut self.engine, &mut self.session, settings)
    }

    pub fn reset(&mut self) -> Ticket {
        self.accumulator = 0.0;
        let settings = self.settings.get();
        self.choreographer
            .reset(&mut self.engine, &mut self.session, settings)
    }

    /// One fixed tick: engine first, then scheduled steps and collisions
    pub fn tick(&mut self) {
        self.engine.step(SIM_DT);
        self.choreographer
            .update(SIM_DT, &mut self.engine, &mut self.session, &self.settings);
    }

    /// Feed a variable frame time; runs as many fixed ticks as fit
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Tick until `ticket` completes (or `limit` seconds pass). Returns
    /// whether the ticket finished.
    pub fn run_until(&mut self, ticket: Ticket, limit: f32) -> bool {
        let deadline = self.now() + limit;
        while !ticket.is_done(self.now()) && self.now() < deadline {
            self.tick();
        }
        ticket.is_done(self.now())
    }

    /// Tick for `seconds`
    pub fn run_for(&mut self, seconds: f32) {
        let ticks = (seconds / SIM_DT).ceil() as u32;
        for _ in 0..ticks {
            self.tick();
        }
    }
}
