//! Card Registry
//!
//! The immutable triple `(cards, tag_to_cards, card_to_tags)`. Built once
//! per card-set snapshot, then published through [`SharedRegistry`] and read
//! lock-free by any number of threads. Cards get dense indices by sorted
//! card id; tags get dense ids from the [`TagDictionary`]; both directions
//! of the tag/card relation are materialized as compressed bitmaps.

use crate::card::{Card, CardId};
use crate::config::Config;
use crate::error::{BuildError, QueryError};
use crate::tags::{TagDictionary, TagId};
use once_cell::sync::Lazy;
use roaring::RoaringBitmap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Dense card index assigned at build time, ascending by card id.
pub type CardIndex = u32;

/// Monotonic registry snapshot version, part of every cache key.
pub type RegistryVersion = u64;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Shared empty bitmap returned for unknown tag ids.
static EMPTY: Lazy<RoaringBitmap> = Lazy::new(RoaringBitmap::new);

#[derive(Debug)]
pub struct CardRegistry {
    version: RegistryVersion,
    dictionary: TagDictionary,
    /// Cards sorted by id; position is the card index.
    cards: Vec<Card>,
    /// Tag-id bitmap per card index.
    card_to_tags: Vec<RoaringBitmap>,
    /// Inverted index: card-index bitmap per tag id.
    tag_to_cards: Vec<RoaringBitmap>,
    /// All card indices.
    universe: RoaringBitmap,
}

impl CardRegistry {
    /// Build a registry from a loaded card set.
    ///
    /// Cards are sorted by id (duplicates rejected), tag names are interned
    /// into the dictionary, and the inverted index is produced by inverting
    /// the per-card bitmaps. O(N·T̄) for N cards with T̄ mean tags each.
    pub fn build(mut cards: Vec<Card>, config: &Config) -> Result<Self, BuildError> {
        if cards.len() as u64 > config.max_cards {
            return Err(BuildError::LimitExceeded {
                what: "cards",
                actual: cards.len() as u64,
                limit: config.max_cards,
            });
        }

        let dictionary = TagDictionary::build(
            cards.iter().flat_map(|c| c.tags.iter().cloned()),
            config.max_tags,
        )?;

        cards.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(dup) = cards.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(BuildError::DuplicateCardId(dup[0].id.to_string()));
        }

        let mut card_to_tags = Vec::with_capacity(cards.len());
        for card in &cards {
            let mut tags = RoaringBitmap::new();
            for name in &card.tags {
                // Total by construction: the dictionary was built from
                // exactly these tag names.
                if let Some(id) = dictionary.id_of(name) {
                    tags.insert(id);
                }
            }
            card_to_tags.push(tags);
        }

        // Invert card_to_tags rather than scanning cards per tag
        let mut tag_to_cards = vec![RoaringBitmap::new(); dictionary.len()];
        for (index, tags) in card_to_tags.iter().enumerate() {
            for tag in tags {
                tag_to_cards[tag as usize].insert(index as CardIndex);
            }
        }

        let mut universe = RoaringBitmap::new();
        universe.insert_range(0..cards.len() as CardIndex);

        let version = NEXT_VERSION.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            version,
            cards = cards.len(),
            tags = dictionary.len(),
            "card registry built"
        );

        Ok(Self {
            version,
            dictionary,
            cards,
            card_to_tags,
            tag_to_cards,
            universe,
        })
    }

    pub fn version(&self) -> RegistryVersion {
        self.version
    }

    pub fn dictionary(&self) -> &TagDictionary {
        &self.dictionary
    }

    /// Bitmap of card indices carrying `tag`. Unknown ids yield the empty
    /// bitmap rather than an error.
    pub fn cards_with_tag(&self, tag: TagId) -> &RoaringBitmap {
        self.tag_to_cards.get(tag as usize).unwrap_or(&EMPTY)
    }

    /// Bitmap of tag ids carried by the card at `index`.
    pub fn tags_of_card(&self, index: CardIndex) -> &RoaringBitmap {
        self.card_to_tags.get(index as usize).unwrap_or(&EMPTY)
    }

    pub fn card(&self, index: CardIndex) -> Option<&Card> {
        self.cards.get(index as usize)
    }

    /// Card index by external id, if the card is in this snapshot.
    pub fn index_of(&self, id: &CardId) -> Option<CardIndex> {
        self.cards
            .binary_search_by(|c| c.id.cmp(id))
            .ok()
            .map(|i| i as CardIndex)
    }

    pub fn count(&self) -> u64 {
        self.cards.len() as u64
    }

    /// Bitmap of every card index in this snapshot.
    pub fn universe(&self) -> &RoaringBitmap {
        &self.universe
    }
}

/// Atomically swappable published registry handle.
///
/// A build happens off the hot path, then `publish` replaces the snapshot in
/// one swap. Readers take a snapshot reference at request entry and keep it
/// for the whole request, so an in-flight request never observes a swap.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    current: Arc<RwLock<Option<Arc<CardRegistry>>>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a freshly built registry, replacing any prior snapshot.
    pub fn publish(&self, registry: CardRegistry) -> Arc<CardRegistry> {
        let registry = Arc::new(registry);
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = slot.replace(registry.clone());
        tracing::info!(
            version = registry.version(),
            replaced = previous.map(|p| p.version()),
            "registry published"
        );
        registry
    }

    /// Current snapshot. Fails with `RegistryNotInitialized` before the
    /// first publish; that is a programmer error at the call site.
    pub fn snapshot(&self) -> Result<Arc<CardRegistry>, QueryError> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(QueryError::RegistryNotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
