//! Physics mode controller
//!
//! Hands a card back and forth between scripted animation (kinematic) and the
//! physics simulation (dynamic). A kinematic card never keeps a velocity: the
//! tweener and the solver would fight over its transform.

use super::engine::{TableEngine, Velocity};
use super::entity::{BodyKind, EntityId, PhysicsMode};

/// Switch mode. Entering kinematic or static clears any stale velocity.
/// No-op for visual-only entities.
pub fn set_mode(engine: &mut dyn TableEngine, id: EntityId, body: BodyKind, mode: PhysicsMode) {
    if !body.has_physics() {
        log::debug!("Skipping mode switch for visual-only entity {:?}", id);
        return;
    }
    if mode != PhysicsMode::Dynamic {
        engine.set_velocity(id, Velocity::ZERO);
    }
    engine.set_physics_mode(id, mode);
}

/// Set velocity on a dynamic body. A kinematic or static body is zeroed instead.
pub fn set_velocity(engine: &mut dyn TableEngine, id: EntityId, body: BodyKind, velocity: Velocity) {
    if !body.has_physics() {
        return;
    }
    match engine.physics_mode(id) {
        Some(PhysicsMode::Dynamic) => engine.set_velocity(id, velocity),
        Some(_) => {
            log::debug!("Refusing velocity on non-dynamic entity {:?}", id);
            engine.set_velocity(id, Velocity::ZERO);
        }
        None => {}
    }
}

pub fn clear_velocity(engine: &mut dyn TableEngine, id: EntityId, body: BodyKind) {
    if body.has_physics() {
        engine.set_velocity(id, Velocity::ZERO);
    }
}

/// Hand the card to the simulation and throw it
pub fn launch(engine: &mut dyn TableEngine, id: EntityId, body: BodyKind, velocity: Velocity) {
    set_mode(engine, id, body, PhysicsMode::Dynamic);
    set_velocity(engine, id, body, velocity);
}
