//! External card store seam
//!
//! Representations (tag-on-card attachments) live outside the engine: the
//! registry is an immutable snapshot, and mutating a card's tags is the
//! loader's domain. [`CardStore`] is the interface the dispatcher drives for
//! `AddRepresentation` and `ChangeDimensionMembership`; a registry rebuild
//! from the store is the loader's responsibility afterwards.

use crate::card::{Card, CardId};
use std::collections::BTreeMap;

pub trait CardStore {
    fn contains_card(&self, card: &CardId) -> bool;

    /// Current tag count of a card; 0 for unknown cards.
    fn tag_count(&self, card: &CardId) -> usize;

    fn has_tag(&self, card: &CardId, tag: &str) -> bool;

    /// Attach a tag. Returns `false` when the card already carried it.
    fn add_tag(&mut self, card: &CardId, tag: &str) -> bool;

    /// Detach a tag. Returns `false` when the card did not carry it.
    fn remove_tag(&mut self, card: &CardId, tag: &str) -> bool;
}

/// In-memory store used by the CLI and tests. Kept sorted by card id so a
/// rebuilt registry sees the same deterministic input a real loader would
/// provide.
#[derive(Debug, Clone, Default)]
pub struct MemoryCardStore {
    cards: BTreeMap<CardId, Card>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Snapshot the store back into loader input for a registry rebuild.
    pub fn to_cards(&self) -> Vec<Card> {
        self.cards.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardStore for MemoryCardStore {
    fn contains_card(&self, card: &CardId) -> bool {
        self.cards.contains_key(card)
    }

    fn tag_count(&self, card: &CardId) -> usize {
        self.cards.get(card).map(|c| c.tags.len()).unwrap_or(0)
    }

    fn has_tag(&self, card: &CardId, tag: &str) -> bool {
        self.cards.get(card).is_some_and(|c| c.has_tag(tag))
    }

    fn add_tag(&mut self, card: &CardId, tag: &str) -> bool {
        match self.cards.get_mut(card) {
            Some(c) if !c.has_tag(tag) => {
                c.tags.push(tag.to_string());
                true
            }
            _ => false,
        }
    }

    fn remove_tag(&mut self, card: &CardId, tag: &str) -> bool {
        match self.cards.get_mut(card) {
            Some(c) => {
                let before = c.tags.len();
                c.tags.retain(|t| t != tag);
                c.tags.len() < before
            }
            None => false,
        }
    }
}
