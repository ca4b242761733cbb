//! In-memory engine for tests and the native demo
//!
//! Deterministic fixed-step stand-in for the host engine:
//! - Tweens with the four easing curves
//! - Gravity, restitution and friction against the felt plane
//! - Collision-begin events between cards and the felt
//!
//! Card-on-card contacts are not simulated.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::engine::{
    Appearance, BodyDesc, CollisionEvent, ParticleEffect, SpawnDesc, Spawned, TableEngine,
    Velocity,
};
use super::entity::{BodyKind, Easing, EntityId, PhysicsMode, Transform};
use crate::consts::*;

/// Vertical speed below which a landing card stops bouncing
const BOUNCE_CUTOFF: f32 = 0.05;
/// Spin below which a grounded card stops turning
const SPIN_CUTOFF: f32 = 0.05;
/// Height above rest at which a card counts as airborne again
const CONTACT_SLOP: f32 = 0.01;

#[derive(Debug, Clone)]
struct Tween {
    from: Transform,
    to: Transform,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

#[derive(Debug, Clone)]
struct Body {
    desc: BodyDesc,
    mode: PhysicsMode,
    velocity: Velocity,
    /// Touching the felt (collision already reported)
    in_contact: bool,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    transform: Transform,
    body: Option<Body>,
    tween: Option<Tween>,
    appearance: Option<Appearance>,
    particle: Option<ParticleEffect>,
}

/// Headless [`TableEngine`]
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    nodes: BTreeMap<EntityId, Node>,
    next_id: u32,
    felt: Option<EntityId>,
    collisions: Vec<CollisionEvent>,
    /// Names whose bodies are refused at spawn (simulates a failed collider build)
    refuse_bodies: Vec<String>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Spawn entities with this name without a physics body
    pub fn refuse_bodies_for(&mut self, name: &str) {
        self.refuse_bodies.push(name.to_string());
    }

    pub fn particle_count(&self) -> usize {
        self.nodes.values().filter(|n| n.particle.is_some()).count()
    }

    pub fn is_animating(&self, id: EntityId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.tween.is_some())
    }

    pub fn appearance(&self, id: EntityId) -> Option<Appearance> {
        self.nodes.get(&id).and_then(|n| n.appearance)
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    /// Advance by one fixed step
    pub fn integrate(&mut self, dt: f32) {
        let felt = self.felt;
        let rest = FELT_HEIGHT + CARD_HALF_THICKNESS;

        for (&id, node) in self.nodes.iter_mut() {
            if let Some(tween) = node.tween.as_mut() {
                tween.elapsed += dt;
                let t = if tween.duration > 0.0 {
                    tween.easing.apply(tween.elapsed / tween.duration)
                } else {
                    1.0
                };
                node.transform = tween.from.lerp(&tween.to, t);
                if tween.elapsed >= tween.duration {
                    node.transform = tween.to;
                    node.tween = None;
                }
                continue;
            }

            let Some(body) = node.body.as_mut() else {
                continue;
            };
            if body.mode != PhysicsMode::Dynamic {
                continue;
            }

            let t = &mut node.transform;
            let v = &mut body.velocity;
            v.linear += GRAVITY * dt;
            t.position += v.linear * dt;
            if v.angular != Vec3::ZERO {
                t.rotation = (Quat::from_scaled_axis(v.angular * dt) * t.rotation).normalize();
            }

            if t.position.y <= rest {
                t.position.y = rest;
                if v.linear.y < 0.0 {
                    if !body.in_contact {
                        if let Some(felt) = felt {
                            self.collisions.push(CollisionEvent { a: id, b: felt });
                        }
                        body.in_contact = true;
                        v.angular *= 0.6;
                    }
                    v.linear.y = -v.linear.y * body.desc.restitution;
                    if v.linear.y < BOUNCE_CUTOFF {
                        v.linear.y = 0.0;
                    }
                }

                // Coulomb-style sliding friction
                let planar = Vec3::new(v.linear.x, 0.0, v.linear.z);
                let speed = planar.length();
                let decel = body.desc.friction * -GRAVITY.y * dt;
                let slowed = if speed > decel {
                    planar * ((speed - decel) / speed)
                } else {
                    Vec3::ZERO
                };
                v.linear.x = slowed.x;
                v.linear.z = slowed.z;

                v.angular *= 0.9;
                if v.angular.length() < SPIN_CUTOFF {
                    v.angular = Vec3::ZERO;
                }
            } else if t.position.y > rest + CONTACT_SLOP {
                body.in_contact = false;
            }
        }
    }

    /// Advance by `seconds` in fixed steps
    pub fn run(&mut self, seconds: f32) {
        let steps = (seconds / SIM_DT).round() as u32;
        for _ in 0..steps {
            self.integrate(SIM_DT);
        }
    }
}

impl TableEngine for HeadlessEngine {
    fn spawn(&mut self, desc: SpawnDesc) -> Spawned {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let refused = self.refuse_bodies.iter().any(|n| *n == desc.name);
        let body = desc.body.filter(|_| !refused).map(|d| Body {
            desc: d,
            mode: d.mode,
            velocity: Velocity::ZERO,
            in_contact: false,
        });
        let kind = if body.is_some() {
            BodyKind::Physics
        } else {
            BodyKind::VisualOnly
        };

        if desc.name == FELT_NAME {
            self.felt = Some(id);
        }
        self.nodes.insert(
            id,
            Node {
                name: desc.name,
                transform: desc.transform,
                body,
                tween: None,
                appearance: None,
                particle: None,
            },
        );
        Spawned { id, body: kind }
    }

    fn despawn(&mut self, id: EntityId) {
        if self.nodes.remove(&id).is_some() && self.felt == Some(id) {
            self.felt = None;
        }
    }

    fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn name(&self, id: EntityId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.name.as_str())
    }

    fn transform(&self, id: EntityId) -> Option<Transform> {
        self.nodes.get(&id).map(|n| n.transform)
    }

    fn set_transform(&mut self, id: EntityId, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
            node.tween = None;
        }
    }

    fn physics_mode(&self, id: EntityId) -> Option<PhysicsMode> {
        self.nodes.get(&id)?.body.as_ref().map(|b| b.mode)
    }

    fn set_physics_mode(&mut self, id: EntityId, mode: PhysicsMode) {
        if let Some(body) = self.nodes.get_mut(&id).and_then(|n| n.body.as_mut()) {
            body.mode = mode;
            body.in_contact = false;
        }
    }

    fn velocity(&self, id: EntityId) -> Option<Velocity> {
        self.nodes.get(&id)?.body.as_ref().map(|b| b.velocity)
    }

    fn set_velocity(&mut self, id: EntityId, velocity: Velocity) {
        if let Some(body) = self.nodes.get_mut(&id).and_then(|n| n.body.as_mut()) {
            body.velocity = velocity;
        }
    }

    fn animate_to(&mut self, id: EntityId, target: Transform, duration: f32, easing: Easing) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.tween = Some(Tween {
                from: node.transform,
                to: target,
                elapsed: 0.0,
                duration: duration.max(0.0),
                easing,
            });
        }
    }

    fn spawn_particles(&mut self, effect: ParticleEffect) -> EntityId {
        let spawned = self.spawn(SpawnDesc {
            name: "felt-disturbance".to_string(),
            transform: Transform::from_position(effect.position),
            body: None,
        });
        if let Some(node) = self.nodes.get_mut(&spawned.id) {
            node.particle = Some(effect);
        }
        spawned.id
    }

    fn set_appearance(&mut self, id: EntityId, appearance: Appearance) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.appearance = Some(appearance);
        }
    }

    fn drain_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.collisions)
    }

    fn step(&mut self, dt: f32) {
        self.integrate(dt);
    }
}
