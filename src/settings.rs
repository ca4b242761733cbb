//! Table settings and preferences
//!
//! Per-side fan layout is tuned live from the UI; the calculators only ever see
//! a snapshot passed in by reference.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::card::DECK_SIZE;

/// Card face art style (part of the texture cache key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FaceStyle {
    #[default]
    Classic,
    Minimal,
    Custom,
}

impl FaceStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceStyle::Classic => "Classic",
            FaceStyle::Minimal => "Minimal",
            FaceStyle::Custom => "Custom",
        }
    }
}

/// Which dealing routine runs, and for how many cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DealMode {
    /// Standard side cycle, then stack by side
    Cards(usize),
    /// Two rounds of 2/3 bundles, 20 cards, the rest stays as the kitty
    #[default]
    Euchre,
    /// Straight into fanned hands, no toss
    InHands(usize),
}

impl DealMode {
    /// Total cards this mode deals
    pub fn card_count(&self) -> usize {
        match self {
            DealMode::Cards(n) | DealMode::InHands(n) => (*n).min(DECK_SIZE),
            DealMode::Euchre => crate::consts::EUCHRE_BUNDLE_SIZES.iter().sum(),
        }
    }
}

/// Fan parameters for one side. Angles are in degrees (slider units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideLayout {
    /// Total spread of the fan
    pub fan_angle: f32,
    /// How far the cards lean back toward their player
    pub tilt_angle: f32,
    /// Distance from the hand pivot to each card
    pub arc_radius: f32,
    /// Lift per card index
    pub vertical_spacing: f32,
    /// Extra yaw applied to the whole hand
    pub rotation_offset: f32,
}

impl Default for SideLayout {
    fn default() -> Self {
        Self {
            fan_angle: 40.0,
            tilt_angle: 55.0,
            arc_radius: 0.16,
            vertical_spacing: 0.0015,
            rotation_offset: 0.0,
        }
    }
}

impl SideLayout {
    /// The viewer's own hand sits a little wider and more upright
    pub fn near_viewer() -> Self {
        Self {
            fan_angle: 50.0,
            tilt_angle: 65.0,
            arc_radius: 0.2,
            ..Self::default()
        }
    }
}

/// Table settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fan layout, indexed by side - 1
    pub sides: [SideLayout; 4],

    // === Cosmetics ===
    /// Accumulate wear from collisions and handling
    pub wear_tracking: bool,
    /// Felt disturbance particles where cards land
    pub felt_effects: bool,
    /// Face art style
    pub face_style: FaceStyle,

    // === Dealing ===
    /// Mode used by the deal button
    pub deal_mode: DealMode,
    /// Seed for shuffle and toss jitter
    pub seed: u64,

    // === Accessibility ===
    /// Reduced motion (no particle bursts)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sides: [
                SideLayout::near_viewer(),
                SideLayout::default(),
                SideLayout::default(),
                SideLayout::default(),
            ],
            wear_tracking: true,
            felt_effects: true,
            face_style: FaceStyle::Classic,
            deal_mode: DealMode::Euchre,
            seed: 0x5eed_cafe,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Layout for a side index 1-4
    pub fn side(&self, side: crate::table::Side) -> &SideLayout {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: crate::table::Side) -> &mut SideLayout {
        &mut self.sides[side.index()]
    }

    /// Effective felt effects (respects reduced_motion)
    pub fn effective_felt_effects(&self) -> bool {
        self.felt_effects && !self.reduced_motion
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to a file. Failures are logged, never fatal.
    pub fn save(&self, path: &Path) {
        match self.to_json() {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings to {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}

/// Settings plus a change counter polled once per update tick
#[derive(Debug, Clone, Default)]
pub struct LiveSettings {
    settings: Settings,
    revision: u64,
}

impl LiveSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            revision: 0,
        }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Bumped on every `update`
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mutate the settings and mark them changed
    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.revision += 1;
    }
}
