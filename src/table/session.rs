//! Scene session state
//!
//! Owns everything one table session mutates: the card entities, which side
//! each dealt card belongs to, wear, hand fixtures and the texture cache.
//! Only the choreography engine and the wear reactor write to it, both on the
//! same update tick as the engine step.

use std::collections::HashMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::engine::{BodyDesc, SpawnDesc, TableEngine};
use super::entity::{BodyKind, CardEntity, EntityId, Transform};
use super::layout::{self, Side};
use super::texture::{TextureCache, TextureProvider};
use super::wear::{WearChange, WearTracker};
use crate::card::{self, Card};
use crate::consts::*;
use crate::settings::Settings;

/// What the cards on the table currently form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// No card entities
    Empty,
    /// Face-down deck at the dealer's seat
    InDeck,
    /// Thrown, settling under physics
    Tossed,
    /// One pile per side
    Stacked,
    /// Fanned in hand fixtures using per-side tuning
    InHands,
    /// Re-fanned with the fixed arc
    Fanned,
    /// Sliding to a corner / being picked up
    Gathering,
}

/// Which side each dealt card belongs to, in deal order
#[derive(Debug, Clone, Default)]
pub struct SideAssignments {
    slots: HashMap<EntityId, (Side, u32)>,
    next_seq: u32,
}

impl SideAssignments {
    /// Assign (or reassign) a card. Later assignments sort after earlier ones.
    pub fn assign(&mut self, id: EntityId, side: Side) {
        self.slots.insert(id, (side, self.next_seq));
        self.next_seq += 1;
    }

    pub fn side_of(&self, id: EntityId) -> Option<Side> {
        self.slots.get(&id).map(|(side, _)| *side)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Cards on a side, in the order they were assigned
    pub fn cards_on(&self, side: Side) -> Vec<EntityId> {
        let mut cards: Vec<_> = self
            .slots
            .iter()
            .filter(|(_, (s, _))| *s == side)
            .map(|(id, (_, seq))| (*seq, *id))
            .collect();
        cards.sort_unstable();
        cards.into_iter().map(|(_, id)| id).collect()
    }
}

pub struct SceneSession {
    /// Logical deck; index 0 is the bottom of the stack
    deck: Vec<Card>,
    /// Live card entities, same order as `deck` when spawned
    cards: Vec<CardEntity>,
    pub sides: SideAssignments,
    pub wear: WearTracker,
    hands: Vec<(Side, EntityId)>,
    fixtures: Vec<EntityId>,
    textures: TextureCache,
    provider: Box<dyn TextureProvider>,
    arrangement: Arrangement,
    rng: Pcg32,
}

impl SceneSession {
    /// Build the fixtures and a shuffled logical deck. No cards are spawned yet.
    pub fn new(
        engine: &mut dyn TableEngine,
        settings: &Settings,
        provider: Box<dyn TextureProvider>,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let mut deck = card::build_deck();
        card::shuffle(&mut deck, &mut rng);

        let mut session = Self {
            deck,
            cards: Vec::new(),
            sides: SideAssignments::default(),
            wear: WearTracker::new(),
            hands: Vec::new(),
            fixtures: Vec::new(),
            textures: TextureCache::new(),
            provider,
            arrangement: Arrangement::Empty,
            rng,
        };
        session.spawn_fixtures(engine);
        session
    }

    fn spawn_fixtures(&mut self, engine: &mut dyn TableEngine) {
        let felt = Vec3::new(0.0, FELT_HEIGHT, 0.0);
        for (name, transform) in [
            (TABLE_NAME, Transform::from_position(felt - Vec3::Y * 0.02)),
            (FELT_NAME, Transform::from_position(felt)),
            (RAIL_NAME, Transform::from_position(felt)),
        ] {
            let spawned = engine.spawn(SpawnDesc {
                name: name.to_string(),
                transform,
                body: Some(BodyDesc::fixture()),
            });
            if !spawned.body.has_physics() {
                log::warn!("Fixture '{}' has no collider", name);
            }
            self.fixtures.push(spawned.id);
        }
    }

    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    pub fn set_arrangement(&mut self, arrangement: Arrangement) {
        if self.arrangement != arrangement {
            log::debug!("Arrangement {:?} -> {:?}", self.arrangement, arrangement);
            self.arrangement = arrangement;
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn cards(&self) -> &[CardEntity] {
        &self.cards
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Card by stack index; `None` when out of range
    pub fn card_at(&self, index: usize) -> Option<&CardEntity> {
        self.cards.get(index)
    }

    pub fn card(&self, id: EntityId) -> Option<&CardEntity> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn hands(&self) -> &[(Side, EntityId)] {
        &self.hands
    }

    pub fn fixtures(&self) -> &[EntityId] {
        &self.fixtures
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Spawn the deck as a face-down stack. No-op when cards already exist.
    pub fn spawn_deck(&mut self, engine: &mut dyn TableEngine, settings: &Settings) {
        if !self.cards.is_empty() {
            return;
        }
        for (i, card) in self.deck.iter().enumerate() {
            let spawned = engine.spawn(SpawnDesc {
                name: card.label(),
                transform: layout::deck_transform(i),
                body: Some(BodyDesc::card()),
            });
            if spawned.body == BodyKind::VisualOnly {
                log::warn!("Card {} spawned without physics, it will not be tossed", card.label());
            }
            if settings.wear_tracking {
                self.wear.track(card.id);
            }
            self.cards.push(CardEntity {
                id: spawned.id,
                card: *card,
                body: spawned.body,
            });
        }
        let cards = self.cards.clone();
        for entity in &cards {
            self.refresh_appearance(engine, entity, settings);
        }
        self.set_arrangement(Arrangement::InDeck);
        log::info!("Spawned deck of {} cards", self.cards.len());
    }

    /// Spawn one visual-only hand fixture per side (once)
    pub fn spawn_hands(&mut self, engine: &mut dyn TableEngine) {
        if !self.hands.is_empty() {
            return;
        }
        for side in Side::ALL {
            let spawned = engine.spawn(SpawnDesc {
                name: format!("hand-{}", side.number()),
                transform: layout::hand_transform(side),
                body: None,
            });
            self.hands.push((side, spawned.id));
        }
    }

    pub fn remove_hands(&mut self, engine: &mut dyn TableEngine) {
        for (_, id) in self.hands.drain(..) {
            engine.despawn(id);
        }
    }

    /// Destroy every card entity and hand, clear side assignments.
    /// Wear survives: it belongs to the logical card.
    pub fn remove_cards(&mut self, engine: &mut dyn TableEngine) {
        for card in self.cards.drain(..) {
            engine.despawn(card.id);
        }
        self.remove_hands(engine);
        self.sides.clear();
        self.set_arrangement(Arrangement::Empty);
    }

    /// Pick everything up, reshuffle, and lay a fresh deck
    pub fn redeal_deck(&mut self, engine: &mut dyn TableEngine, settings: &Settings) {
        self.remove_cards(engine);
        card::shuffle(&mut self.deck, &mut self.rng);
        self.spawn_deck(engine, settings);
    }

    /// Full reset: fresh deck and zero wear
    pub fn reset(&mut self, engine: &mut dyn TableEngine, settings: &Settings) {
        self.remove_cards(engine);
        self.wear.reset();
        card::shuffle(&mut self.deck, &mut self.rng);
        self.spawn_deck(engine, settings);
    }

    /// Increment wear for the card behind `id` and refresh its texture when the
    /// level changes. Shared by collisions and handling.
    pub fn record_wear(
        &mut self,
        engine: &mut dyn TableEngine,
        id: EntityId,
        settings: &Settings,
    ) -> Option<WearChange> {
        if !settings.wear_tracking {
            return None;
        }
        let entity = *self.card(id)?;
        let change = self.wear.increment(entity.card_id())?;
        log::debug!(
            "{} wear {} -> {}",
            entity.card.label(),
            change.from.as_str(),
            change.to.as_str()
        );
        self.refresh_appearance(engine, &entity, settings);
        Some(change)
    }

    /// Push the card's current texture (or fallback tint) to the engine
    pub fn refresh_appearance(
        &mut self,
        engine: &mut dyn TableEngine,
        entity: &CardEntity,
        settings: &Settings,
    ) {
        if !engine.contains(entity.id) {
            return;
        }
        let wear = self.wear.level(entity.card_id());
        let look = self.textures.appearance(
            self.provider.as_mut(),
            &entity.card,
            settings.face_style,
            wear,
        );
        engine.set_appearance(entity.id, look);
    }

    /// Re-apply textures after a style change
    pub fn refresh_all_appearances(&mut self, engine: &mut dyn TableEngine, settings: &Settings) {
        let cards = self.cards.clone();
        for entity in &cards {
            self.refresh_appearance(engine, entity, settings);
        }
    }
}
