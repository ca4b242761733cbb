//! Logical playing cards
//!
//! A `Card` never changes once the deck is built; the entity that renders it
//! may be destroyed and respawned many times over a session.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Stable identity of a logical card (index into the built deck)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn as_str(&self) -> &'static str {
        match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
        }
    }
}

/// Euchre ranks, ordered by rank value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    /// Short label such as `"Q-hearts"`, used for entity names
    pub fn label(&self) -> String {
        format!("{}-{}", self.rank.as_str(), self.suit.as_str())
    }
}

/// Number of cards in a full deck
pub const DECK_SIZE: usize = Suit::ALL.len() * Rank::ALL.len();

/// Build the 24-card deck in suit-major order. Ids are assigned in build order.
pub fn build_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| (suit, rank)))
        .enumerate()
        .map(|(i, (suit, rank))| Card {
            id: CardId(i as u16),
            suit,
            rank,
        })
        .collect()
}

/// Shuffle a deck in place. Index 0 is the bottom of the stack.
pub fn shuffle(deck: &mut [Card], rng: &mut Pcg32) {
    deck.shuffle(rng);
}
