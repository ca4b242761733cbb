//! Card wear
//!
//! Every collision or handling step bumps a per-card counter; the visible wear
//! level is always derived from the counter, never stored on its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::card::CardId;

/// Counter value at which each level starts
pub const WEAR_THRESHOLDS: [u32; 5] = [0, 3, 8, 15, 25];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum WearLevel {
    #[default]
    None,
    Light,
    Moderate,
    Heavy,
    Extreme,
}

impl WearLevel {
    pub const ALL: [WearLevel; 5] = [
        WearLevel::None,
        WearLevel::Light,
        WearLevel::Moderate,
        WearLevel::Heavy,
        WearLevel::Extreme,
    ];

    /// Bucket for an interaction count
    pub fn from_count(count: u32) -> Self {
        let bucket = WEAR_THRESHOLDS
            .iter()
            .rposition(|&t| count >= t)
            .unwrap_or(0);
        Self::ALL[bucket]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WearLevel::None => "none",
            WearLevel::Light => "light",
            WearLevel::Moderate => "moderate",
            WearLevel::Heavy => "heavy",
            WearLevel::Extreme => "extreme",
        }
    }
}

/// Per-card wear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WearState {
    count: u32,
}

impl WearState {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn level(&self) -> WearLevel {
        WearLevel::from_count(self.count)
    }
}

/// A level change that needs a texture refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WearChange {
    pub card: CardId,
    pub from: WearLevel,
    pub to: WearLevel,
}

/// Wear for every tracked card
#[derive(Debug, Clone, Default)]
pub struct WearTracker {
    states: HashMap<CardId, WearState>,
}

impl WearTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a card (fresh state if not already tracked)
    pub fn track(&mut self, card: CardId) {
        self.states.entry(card).or_default();
    }

    pub fn state(&self, card: CardId) -> Option<WearState> {
        self.states.get(&card).copied()
    }

    pub fn level(&self, card: CardId) -> WearLevel {
        self.state(card).map(|s| s.level()).unwrap_or_default()
    }

    /// Bump the counter of a tracked card. Returns the level change, if any.
    /// Collisions and choreography handling both come through here.
    pub fn increment(&mut self, card: CardId) -> Option<WearChange> {
        let state = self.states.get_mut(&card)?;
        let from = state.level();
        state.count = state.count.saturating_add(1);
        let to = state.level();
        (from != to).then_some(WearChange { card, from, to })
    }

    /// Zero every tracked card, keeping them tracked
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            *state = WearState::default();
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
