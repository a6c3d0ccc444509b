//! Typed error taxonomy for the engine
//!
//! Every failure the engine can produce is a typed value; callers decide
//! presentation. Programmer errors (reading an unpublished registry,
//! out-of-range ids) fail loudly instead of being silently recovered.

use crate::dispatch::{DraggableKind, DroppableKind};
use thiserror::Error;

/// Errors raised while building a tag dictionary or card registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{what} limit exceeded: {actual} > {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: u64,
        limit: u64,
    },
    #[error("Duplicate card id: {0}")]
    DuplicateCardId(String),
    #[error("Unknown tag id: {0}")]
    UnknownTagId(u32),
}

/// Errors raised while evaluating a filter plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Registry not initialized")]
    RegistryNotInitialized,
    #[error("Plan bounds exceeded: {what} count {actual} > {limit}")]
    PlanBoundsExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },
    #[error("Query cancelled")]
    Cancelled,
}

/// Validation failures surfaced by the drop dispatcher.
///
/// None of these leave any state change behind; the caller shows the message
/// and the previous matrix stays valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid drop: {drag} onto {drop}")]
    InvalidDrop {
        drag: DraggableKind,
        drop: DroppableKind,
    },
    #[error("Capacity exceeded: {what} is limited to {limit}")]
    CapacityExceeded { what: &'static str, limit: usize },
    #[error("Cycle detected: group {child} cannot become a member of {parent}")]
    CycleDetected { parent: String, child: String },
    #[error("Unknown {kind}: {reference}")]
    UnknownEntity {
        kind: &'static str,
        reference: String,
    },
    #[error(transparent)]
    Query(#[from] QueryError),
}
