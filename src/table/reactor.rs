//! Wear & collision reactor
//!
//! Turns the engine's collision-begin events into wear and felt disturbance
//! bursts. Bursts are capped so a whole deck landing at once cannot flood the
//! frame with particle entities.

use super::engine::{CollisionEvent, ParticleEffect, TableEngine};
use super::entity::EntityId;
use super::session::SceneSession;
use crate::consts::*;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy)]
struct Disturbance {
    id: EntityId,
    expires_at: f32,
}

#[derive(Debug, Default)]
pub struct WearReactor {
    disturbances: Vec<Disturbance>,
}

impl WearReactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Felt disturbances still alive
    pub fn active_disturbances(&self) -> usize {
        self.disturbances.len()
    }

    /// Drain the engine's collision events, then retire expired bursts
    pub fn process(
        &mut self,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
        now: f32,
    ) {
        for event in engine.drain_collisions() {
            self.on_collision(event, engine, session, settings, now);
        }
        self.expire(engine, now);
    }

    pub fn on_collision(
        &mut self,
        event: CollisionEvent,
        engine: &mut dyn TableEngine,
        session: &mut SceneSession,
        settings: &Settings,
        now: f32,
    ) {
        for id in [event.a, event.b] {
            session.record_wear(engine, id, settings);
        }

        if !settings.effective_felt_effects() {
            return;
        }
        let Some(card) = [event.a, event.b]
            .into_iter()
            .find(|&id| session.card(id).is_some())
        else {
            return;
        };
        let hit_felt = event
            .other(card)
            .and_then(|other| engine.name(other))
            .is_some_and(|name| name == FELT_NAME);
        if !hit_felt {
            return;
        }
        if self.disturbances.len() >= MAX_FELT_DISTURBANCES {
            log::debug!("Felt disturbance cap reached, skipping burst");
            return;
        }
        let Some(transform) = engine.transform(card) else {
            return;
        };

        let speed = engine
            .velocity(card)
            .map(|v| v.linear.length())
            .unwrap_or(0.0);
        let id = engine.spawn_particles(ParticleEffect {
            position: transform.position,
            lifetime: FELT_DISTURBANCE_LIFETIME,
            intensity: (speed / 2.0).clamp(0.2, 1.0),
        });
        self.disturbances.push(Disturbance {
            id,
            expires_at: now + FELT_DISTURBANCE_LIFETIME,
        });
    }

    /// Remove bursts whose lifetime has elapsed
    pub fn expire(&mut self, engine: &mut dyn TableEngine, now: f32) {
        self.disturbances.retain(|d| {
            if d.expires_at <= now {
                engine.despawn(d.id);
                false
            } else {
                true
            }
        });
    }

    /// Remove every burst immediately
    pub fn clear(&mut self, engine: &mut dyn TableEngine) {
        for d in self.disturbances.drain(..) {
            engine.despawn(d.id);
        }
    }
}
