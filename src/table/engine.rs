//! The seam to the host physics/render engine
//!
//! The choreography core only ever talks to the engine through [`TableEngine`].
//! Everything here is fire-and-forget: tweens report no completion, the core
//! waits on its own clock instead.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{BodyKind, Easing, EntityId, PhysicsMode, Transform};
use super::texture::TextureHandle;

/// Linear and angular velocity of a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity {
        linear: Vec3::ZERO,
        angular: Vec3::ZERO,
    };

    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == Vec3::ZERO && self.angular == Vec3::ZERO
    }
}

/// Rigid body parameters requested at spawn time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub mode: PhysicsMode,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Continuous collision detection (thin, fast cards)
    pub ccd: bool,
}

impl BodyDesc {
    pub fn fixture() -> Self {
        Self {
            mode: PhysicsMode::Static,
            mass: 0.0,
            friction: 0.8,
            restitution: 0.1,
            ccd: false,
        }
    }

    pub fn card() -> Self {
        use crate::consts::*;
        Self {
            mode: PhysicsMode::Kinematic,
            mass: CARD_MASS,
            friction: CARD_FRICTION,
            restitution: CARD_RESTITUTION,
            ccd: true,
        }
    }
}

/// What to create
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnDesc {
    pub name: String,
    pub transform: Transform,
    /// `None` creates a visual-only entity
    pub body: Option<BodyDesc>,
}

/// What was created. The engine may decline to build a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
    pub id: EntityId,
    pub body: BodyKind,
}

/// Short-lived particle burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleEffect {
    pub position: Vec3,
    pub lifetime: f32,
    /// 0-1
    pub intensity: f32,
}

/// Surface look of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Appearance {
    Textured(TextureHandle),
    /// Fallback when no texture could be produced
    FlatTint([f32; 4]),
}

/// Two bodies started touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: EntityId,
    pub b: EntityId,
}

impl CollisionEvent {
    /// The participant that is not `id`
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Operations the choreography core needs from the host engine.
///
/// Calls naming an unknown entity are ignored; getters return `None`.
pub trait TableEngine {
    fn spawn(&mut self, desc: SpawnDesc) -> Spawned;
    fn despawn(&mut self, id: EntityId);
    fn contains(&self, id: EntityId) -> bool;
    fn name(&self, id: EntityId) -> Option<&str>;

    fn transform(&self, id: EntityId) -> Option<Transform>;
    fn set_transform(&mut self, id: EntityId, transform: Transform);

    /// `None` when the entity has no physics body
    fn physics_mode(&self, id: EntityId) -> Option<PhysicsMode>;
    fn set_physics_mode(&mut self, id: EntityId, mode: PhysicsMode);
    fn velocity(&self, id: EntityId) -> Option<Velocity>;
    fn set_velocity(&mut self, id: EntityId, velocity: Velocity);

    /// Tween the transform toward `target`; replaces any running tween
    fn animate_to(&mut self, id: EntityId, target: Transform, duration: f32, easing: Easing);

    fn spawn_particles(&mut self, effect: ParticleEffect) -> EntityId;
    fn set_appearance(&mut self, id: EntityId, appearance: Appearance);

    /// Collision-begin events since the last call
    fn drain_collisions(&mut self) -> Vec<CollisionEvent>;

    /// Advance the engine's own simulation. Hosts that step themselves keep
    /// the default.
    fn step(&mut self, _dt: f32) {}
}
