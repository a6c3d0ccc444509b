//! Drop dispatch table
//!
//! The polymorphic drop behavior is a static table indexed by the pair of
//! enumerated kinds. Dispatch is a pure lookup; invalid pairs are explicit
//! cells, not scattered guards, so the hot path has no conditional cascade.

use std::fmt;
use strum::EnumIter;

/// What is being dragged.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum DraggableKind {
    Tag,
    TagGroup,
    Zone,
    Card,
}

/// Where it is being dropped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum DroppableKind {
    TagCloud,
    Zone,
    CardTags,
    ControlArea,
    TagGroupTarget,
    MatrixCell,
}

/// The one well-defined mutation a (drag, drop) pair maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Remove the tag from every zone.
    MoveToCloud,
    /// Append the tag to the target zone, removing it from its prior zone.
    MoveToZone,
    /// Attach the tag to a card in the external store; the registry is
    /// unaffected until the loader rebuilds it.
    AddRepresentation,
    /// Extend a group's membership.
    AddToGroup,
    /// Move every expanded group member, with a single re-evaluation.
    ExpandAndMoveAll,
    /// Attach every expanded group member to a card.
    ExpandAndAddAll,
    /// Purely visual zone rearrangement; no state, no re-evaluation.
    MoveCosmetic,
    /// Re-home a card between matrix cells by diffing their axis tags.
    ChangeDimensionMembership,
    /// Explicitly rejected pair.
    Invalid,
}

impl ActionKind {
    /// Whether this action can change `tagsInPlay` and therefore requires a
    /// re-evaluation after an accepted drop.
    pub fn mutates_tags_in_play(self) -> bool {
        matches!(
            self,
            ActionKind::MoveToCloud | ActionKind::MoveToZone | ActionKind::ExpandAndMoveAll
        )
    }
}

/// Rows are [`DraggableKind`], columns are [`DroppableKind`], both in
/// declaration order.
const DISPATCH_TABLE: [[ActionKind; 6]; 4] = [
    // Tag
    [
        ActionKind::MoveToCloud,
        ActionKind::MoveToZone,
        ActionKind::AddRepresentation,
        ActionKind::Invalid,
        ActionKind::AddToGroup,
        ActionKind::Invalid,
    ],
    // TagGroup
    [
        ActionKind::ExpandAndMoveAll,
        ActionKind::ExpandAndMoveAll,
        ActionKind::ExpandAndAddAll,
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::Invalid,
    ],
    // Zone
    [
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::MoveCosmetic,
        ActionKind::Invalid,
        ActionKind::Invalid,
    ],
    // Card
    [
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::Invalid,
        ActionKind::ChangeDimensionMembership,
    ],
];

/// Resolve the action for a (drag, drop) pair. Pure table lookup.
pub fn action_for(drag: DraggableKind, drop: DroppableKind) -> ActionKind {
    DISPATCH_TABLE[drag as usize][drop as usize]
}

/// One drop event as delivered by the UI layer. The refs are opaque
/// identifiers the session resolves to tags, zones, cards, groups or matrix
/// cells; unresolvable refs surface as `UnknownEntity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub drag_kind: DraggableKind,
    pub drag_ref: String,
    pub drop_kind: DroppableKind,
    pub drop_ref: String,
    /// Where the drag started, when the action needs it (the source cell of
    /// a card drag). Cell refs join their axis tags with `+`.
    pub origin_ref: Option<String>,
    pub session_id: String,
}

impl DropEvent {
    pub fn new(
        drag_kind: DraggableKind,
        drag_ref: impl Into<String>,
        drop_kind: DroppableKind,
        drop_ref: impl Into<String>,
    ) -> Self {
        Self {
            drag_kind,
            drag_ref: drag_ref.into(),
            drop_kind,
            drop_ref: drop_ref.into(),
            origin_ref: None,
            session_id: String::new(),
        }
    }

    pub fn with_origin(mut self, origin_ref: impl Into<String>) -> Self {
        self.origin_ref = Some(origin_ref.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

impl fmt::Display for DraggableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::TagGroup => write!(f, "tag group"),
            Self::Zone => write!(f, "zone"),
            Self::Card => write!(f, "card"),
        }
    }
}

impl fmt::Display for DroppableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TagCloud => write!(f, "tag cloud"),
            Self::Zone => write!(f, "zone"),
            Self::CardTags => write!(f, "card tags"),
            Self::ControlArea => write!(f, "control area"),
            Self::TagGroupTarget => write!(f, "tag group"),
            Self::MatrixCell => write!(f, "matrix cell"),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MoveToCloud => write!(f, "MoveToCloud"),
            Self::MoveToZone => write!(f, "MoveToZone"),
            Self::AddRepresentation => write!(f, "AddRepresentation"),
            Self::AddToGroup => write!(f, "AddToGroup"),
            Self::ExpandAndMoveAll => write!(f, "ExpandAndMoveAll"),
            Self::ExpandAndAddAll => write!(f, "ExpandAndAddAll"),
            Self::MoveCosmetic => write!(f, "MoveCosmetic"),
            Self::ChangeDimensionMembership => write!(f, "ChangeDimensionMembership"),
            Self::Invalid => write!(f, "Invalid"),
        }
    }
}
