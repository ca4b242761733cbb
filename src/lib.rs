//! Card Table - physically simulated card choreography
//!
//! Core modules:
//! - `card`: Logical cards and deck construction
//! - `settings`: Tunable per-side layout and effect toggles
//! - `table`: Choreography engine, layout/toss calculators, wear reactor
//!
//! Rendering, rigid-body simulation and texture generation belong to the host
//! engine and are reached through [`table::TableEngine`].

pub mod card;
pub mod settings;
pub mod table;

pub use card::{Card, CardId, Rank, Suit};
pub use settings::{DealMode, FaceStyle, LiveSettings, Settings, SideLayout};
pub use table::{
    CardTable, Choreographer, Corner, HeadlessEngine, SceneSession, Side, TableEngine, Ticket,
};

use glam::{Quat, Vec3};

/// Table configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed step used by the headless engine (120 Hz, same as the scheduler tick)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity applied to dynamic bodies (m/s²)
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    /// Height of the felt surface
    pub const FELT_HEIGHT: f32 = 0.0;
    /// Card half thickness; resting cards sit this far above the felt
    pub const CARD_HALF_THICKNESS: f32 = 0.0004;
    /// Vertical offset between stacked cards (avoids z-fighting)
    pub const STACK_STEP: f32 = 0.0008;

    /// Card body material
    pub const CARD_MASS: f32 = 0.0018;
    pub const CARD_FRICTION: f32 = 0.6;
    pub const CARD_RESTITUTION: f32 = 0.15;

    /// Where the undealt deck sits, in front of the dealer (side 1)
    pub const DECK_POINT: Vec3 = Vec3::new(0.0, FELT_HEIGHT + CARD_HALF_THICKNESS, 0.22);

    /// Reserved entity names
    pub const FELT_NAME: &str = "felt";
    pub const TABLE_NAME: &str = "table";
    pub const RAIL_NAME: &str = "rail";

    /// Felt disturbance effects
    pub const MAX_FELT_DISTURBANCES: usize = 15;
    pub const FELT_DISTURBANCE_LIFETIME: f32 = 1.2;

    /// Euchre deal: 8 bundles, consumed from the top of the deck
    pub const EUCHRE_BUNDLE_SIZES: [usize; 8] = [2, 3, 2, 3, 3, 2, 3, 2];
    pub const EUCHRE_BUNDLE_SIDES: [u8; 8] = [2, 3, 4, 1, 2, 3, 4, 1];
    /// Standard deal side cycle, by deal order
    pub const STANDARD_SIDE_PATTERN: [u8; 4] = [2, 3, 4, 1];

    /// Animation durations and the waits that follow them.
    ///
    /// Every routine reads both its tween duration and its phase wait from here,
    /// so a change to one cannot leave the other behind.
    pub mod timing {
        /// Delay between consecutive cards in a standard deal
        pub const DEAL_INTERVAL: f32 = 0.12;
        /// Delay between cards inside one euchre bundle
        pub const BUNDLE_CARD_INTERVAL: f32 = 0.03;
        /// Pause between euchre bundles
        pub const BUNDLE_PAUSE: f32 = 0.45;
        /// Time tossed cards get to come to rest before stacking
        pub const SETTLE_TIME: f32 = 1.5;

        /// Face-up flip just before a toss
        pub const TOSS_FLIP: f32 = 0.08;
        /// Stack-by-side slide
        pub const STACK_MOVE: f32 = 0.4;
        /// In-hands fan slide and stagger
        pub const HAND_FAN_MOVE: f32 = 0.45;
        pub const HAND_FAN_STAGGER: f32 = 0.04;
        /// Re-fan of cards already assigned to sides
        pub const REFAN_MOVE: f32 = 0.5;

        /// Gather-and-pick-up phases
        pub const GATHER_SLIDE: f32 = 0.6;
        pub const GATHER_PAUSE: f32 = 0.3;
        pub const PICKUP_LIFT: f32 = 0.5;

        /// Single-card flip
        pub const FLIP: f32 = 0.35;
    }
}

/// Rotation about the world up axis
#[inline]
pub fn yaw(angle: f32) -> Quat {
    Quat::from_rotation_y(angle)
}

/// Project onto the table plane (drop the vertical component)
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal (XZ) distance between two points
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(a - b).length()
}
