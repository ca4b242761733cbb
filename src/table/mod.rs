//! Table core
//!
//! The choreography engine and everything it leans on. Pure calculators
//! (layout, toss, wear buckets) never touch the engine; the session, reactor
//! and choreographer reach it only through [`TableEngine`].

pub mod card_table;
pub mod choreography;
pub mod engine;
pub mod entity;
pub mod headless;
pub mod layout;
pub mod physics_mode;
pub mod reactor;
pub mod session;
pub mod texture;
pub mod timeline;
pub mod toss;
pub mod wear;

pub use card_table::CardTable;
pub use choreography::{Choreographer, Ticket};
pub use engine::{
    Appearance, BodyDesc, CollisionEvent, ParticleEffect, SpawnDesc, Spawned, TableEngine,
    Velocity,
};
pub use entity::{
    BodyKind, CardEntity, Easing, EntityId, PhysicsMode, Transform, flip_rotation, heading,
    is_face_up, resting_rotation,
};
pub use headless::HeadlessEngine;
pub use layout::{Corner, Side};
pub use reactor::WearReactor;
pub use session::{Arrangement, SceneSession, SideAssignments};
pub use texture::{ProceduralTextures, TextureCache, TextureHandle, TextureProvider};
pub use timeline::Timeline;
pub use wear::{WearLevel, WearState, WearTracker};
