//! Texture lookup
//!
//! Textures are generated outside the core; the session only asks for "the
//! texture for this card in this style at this wear level" and caches the
//! answer, including misses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::engine::Appearance;
use super::wear::WearLevel;
use crate::card::Card;
use crate::settings::FaceStyle;

/// Opaque handle issued by the texture subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Produces card textures. `None` means generation failed.
pub trait TextureProvider {
    fn card_texture(&mut self, card: &Card, style: FaceStyle, wear: WearLevel)
    -> Option<TextureHandle>;
}

/// Flat tint used when no texture is available
pub const FALLBACK_TINT: [f32; 4] = [0.93, 0.91, 0.86, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub style: FaceStyle,
    pub card: crate::card::CardId,
    pub wear: WearLevel,
}

/// Session-owned cache keyed by style, card and wear level
#[derive(Debug, Clone, Default)]
pub struct TextureCache {
    entries: HashMap<TextureKey, Option<TextureHandle>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up (or generate) the appearance for a card
    pub fn appearance(
        &mut self,
        provider: &mut dyn TextureProvider,
        card: &Card,
        style: FaceStyle,
        wear: WearLevel,
    ) -> Appearance {
        let key = TextureKey {
            style,
            card: card.id,
            wear,
        };
        let handle = *self.entries.entry(key).or_insert_with(|| {
            let handle = provider.card_texture(card, style, wear);
            if handle.is_none() {
                log::warn!(
                    "No {} texture for {} at wear {}, using flat tint",
                    style.as_str(),
                    card.label(),
                    wear.as_str()
                );
            }
            handle
        });
        match handle {
            Some(h) => Appearance::Textured(h),
            None => Appearance::FlatTint(FALLBACK_TINT),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deterministic provider: one handle per key, optionally failing for a style
#[derive(Debug, Clone, Default)]
pub struct ProceduralTextures {
    pub failing_style: Option<FaceStyle>,
    pub generated: u32,
}

impl TextureProvider for ProceduralTextures {
    fn card_texture(
        &mut self,
        card: &Card,
        style: FaceStyle,
        wear: WearLevel,
    ) -> Option<TextureHandle> {
        if self.failing_style == Some(style) {
            return None;
        }
        self.generated += 1;
        let id = (style as u64) << 32 | (card.id.0 as u64) << 8 | wear as u64;
        Some(TextureHandle(id))
    }
}
