//! tagsInPlay — the per-session drag state
//!
//! Which tags currently occupy which zones, plus the control flags. Owned by
//! exactly one session; never shared across threads. The structural
//! invariants live here: a tag sits in at most one zone, order within a zone
//! is preserved (display concern, not set semantics), and zone capacity is
//! bounded.

use crate::config::Config;
use crate::error::DispatchError;
use crate::tags::TagId;
use indexmap::IndexMap;
use std::fmt;

/// A named semantic position tags can occupy. The six standard kinds carry
/// engine semantics; custom kinds are caller-registered and display-only.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    Union,
    Intersection,
    Exclusion,
    Difference,
    Row,
    Column,
    Custom(String),
}

impl ZoneKind {
    /// Parse one of the standard zone names. Custom zones are not parsed
    /// here; they must be registered on the session first.
    pub fn parse(name: &str) -> Option<ZoneKind> {
        match name {
            "union" => Some(ZoneKind::Union),
            "intersection" => Some(ZoneKind::Intersection),
            "exclusion" => Some(ZoneKind::Exclusion),
            "difference" => Some(ZoneKind::Difference),
            "row" => Some(ZoneKind::Row),
            "column" => Some(ZoneKind::Column),
            _ => None,
        }
    }

    /// Whether tags in this zone label a matrix axis.
    pub fn is_axis(&self) -> bool {
        matches!(self, ZoneKind::Row | ZoneKind::Column)
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZoneKind::Union => write!(f, "union"),
            ZoneKind::Intersection => write!(f, "intersection"),
            ZoneKind::Exclusion => write!(f, "exclusion"),
            ZoneKind::Difference => write!(f, "difference"),
            ZoneKind::Row => write!(f, "row"),
            ZoneKind::Column => write!(f, "column"),
            ZoneKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Session-level control flags.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Whether an empty plan yields the full universe instead of nothing.
    pub start_with_all_cards: bool,
    /// Renderer hint: show card bodies expanded. Carried, never read here.
    pub expand_cards: bool,
}

impl Controls {
    pub fn from_config(config: &Config) -> Self {
        Controls {
            start_with_all_cards: config.start_with_all_cards,
            expand_cards: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagsInPlay {
    zones: IndexMap<ZoneKind, Vec<TagId>>,
    pub controls: Controls,
}

impl TagsInPlay {
    /// Fresh state with the six standard zones registered in a fixed order,
    /// so plan construction iterates deterministically.
    pub fn new(config: &Config) -> Self {
        let mut zones = IndexMap::new();
        for kind in [
            ZoneKind::Intersection,
            ZoneKind::Exclusion,
            ZoneKind::Difference,
            ZoneKind::Union,
            ZoneKind::Row,
            ZoneKind::Column,
        ] {
            zones.insert(kind, Vec::new());
        }
        Self {
            zones,
            controls: Controls::from_config(config),
        }
    }

    /// Register a caller-defined zone kind. Standard kinds are always
    /// present. Idempotent.
    pub fn register_zone(&mut self, kind: ZoneKind) {
        self.zones.entry(kind).or_default();
    }

    pub fn is_registered(&self, kind: &ZoneKind) -> bool {
        self.zones.contains_key(kind)
    }

    /// The zone currently holding `tag`, if any.
    pub fn zone_of(&self, tag: TagId) -> Option<&ZoneKind> {
        self.zones
            .iter()
            .find(|(_, tags)| tags.contains(&tag))
            .map(|(kind, _)| kind)
    }

    /// Tags in a zone, in placement order.
    pub fn tags_in(&self, kind: &ZoneKind) -> &[TagId] {
        self.zones.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Place `tag` at the end of `target`, removing it from any prior zone.
    ///
    /// Remove-then-add is atomic from the caller's perspective: capacity is
    /// validated before anything is touched. Returns `false` (and changes
    /// nothing) when the tag already sits in the target zone.
    pub fn place(
        &mut self,
        tag: TagId,
        target: &ZoneKind,
        max_per_zone: usize,
    ) -> Result<bool, DispatchError> {
        if self.zone_of(tag) == Some(target) {
            return Ok(false);
        }
        let occupancy = self.tags_in(target).len();
        if occupancy >= max_per_zone {
            return Err(DispatchError::CapacityExceeded {
                what: "tags per zone",
                limit: max_per_zone,
            });
        }

        self.remove_everywhere(tag);
        self.zones.entry(target.clone()).or_default().push(tag);
        Ok(true)
    }

    /// Remove `tag` from whichever zone holds it. Returns the prior zone.
    pub fn remove_everywhere(&mut self, tag: TagId) -> Option<ZoneKind> {
        for (kind, tags) in self.zones.iter_mut() {
            if let Some(pos) = tags.iter().position(|t| *t == tag) {
                tags.remove(pos);
                return Some(kind.clone());
            }
        }
        None
    }

    /// Every placed tag with its zone, in zone order then placement order.
    pub fn placements(&self) -> impl Iterator<Item = (&ZoneKind, TagId)> {
        self.zones
            .iter()
            .flat_map(|(kind, tags)| tags.iter().map(move |t| (kind, *t)))
    }

    /// All zone kinds in registration order.
    pub fn zone_kinds(&self) -> impl Iterator<Item = &ZoneKind> {
        self.zones.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.values().all(Vec::is_empty)
    }
}
