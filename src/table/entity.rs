//! Entity handles and the values that flow through the engine seam

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId};

/// Engine-issued handle, stable for the lifetime of the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Who drives an entity's transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsMode {
    /// Immovable (table, rails, felt)
    Static,
    /// Scripted animation only
    Kinematic,
    /// Physics simulation
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Interpolate toward `to` (position lerp, rotation slerp)
    pub fn lerp(&self, to: &Transform, t: f32) -> Transform {
        Transform {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t),
            scale: self.scale.lerp(to.scale, t),
        }
    }
}

/// Easing curves understood by the engine's tweener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map normalized time (0-1) to eased progress (0-1)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Capabilities an entity was created with. Decided once at spawn time so
/// routines never check for a physics body again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Has a rigid body and collider
    Physics,
    /// Rendered only; mode and velocity calls are no-ops
    VisualOnly,
}

impl BodyKind {
    pub fn has_physics(&self) -> bool {
        matches!(self, BodyKind::Physics)
    }
}

/// A card as the session sees it: logical card plus its live entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardEntity {
    pub id: EntityId,
    pub card: Card,
    pub body: BodyKind,
}

impl CardEntity {
    pub fn card_id(&self) -> CardId {
        self.card.id
    }
}

/// Card meshes are authored face-down: the face is on local -Y. A card is
/// face-up when its local up axis points down in world space.
pub fn is_face_up(rotation: Quat) -> bool {
    (rotation * Vec3::Y).y < 0.0
}

/// Half turn about the card's long axis
pub fn flip_rotation() -> Quat {
    Quat::from_rotation_z(std::f32::consts::PI)
}

/// Yaw of the card's top edge (local -Z) on the table plane. A card standing
/// on its end falls back to its local up axis.
pub fn heading(rotation: Quat) -> f32 {
    let mut forward = crate::flatten(rotation * Vec3::NEG_Z);
    if forward.length_squared() < 1e-6 {
        forward = crate::flatten(rotation * Vec3::Y);
    }
    (-forward.x).atan2(-forward.z)
}

/// Flat pose on the table with the given heading
pub fn resting_rotation(heading: f32, face_up: bool) -> Quat {
    if face_up {
        crate::yaw(heading) * flip_rotation()
    } else {
        crate::yaw(heading)
    }
}
