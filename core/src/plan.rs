//! FilterPlan — the canonical, pure description of one query
//!
//! Derived from a `TagsInPlay` snapshot and consumed by the pipeline. A plan
//! owns an ordered op list plus the row/column axes, and can produce the
//! fingerprint the result cache is keyed by.

use crate::config::Config;
use crate::error::QueryError;
use crate::registry::RegistryVersion;
use crate::tags::TagId;
use crate::zones::{TagsInPlay, ZoneKind};
use itertools::Itertools;
use std::fmt;

/// Set operation applied as a refinement of the running result.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Keep cards carrying ALL of the op's tags.
    Intersection,
    /// Keep cards carrying AT LEAST ONE of the op's tags.
    Union,
    /// Keep cards carrying NONE of the op's tags.
    Exclusion,
    /// Subtract cards carrying any of the op's tags. Identical to
    /// `Exclusion` in single-stage use; kept distinct so explicit
    /// subtract-from-result refinements stay representable.
    Difference,
}

impl OpKind {
    /// Evaluation precedence: intersections shrink the running set fastest,
    /// so they go first. Purely a performance ordering — results are
    /// independent of it.
    fn precedence(self) -> u8 {
        match self {
            OpKind::Intersection => 0,
            OpKind::Exclusion | OpKind::Difference => 1,
            OpKind::Union => 2,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OpKind::Intersection => write!(f, "intersection"),
            OpKind::Union => write!(f, "union"),
            OpKind::Exclusion => write!(f, "exclusion"),
            OpKind::Difference => write!(f, "difference"),
        }
    }
}

/// One operation: a kind plus its tag-id set, held sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanOp {
    kind: OpKind,
    tags: Vec<TagId>,
}

impl PlanOp {
    pub fn new(kind: OpKind, mut tags: Vec<TagId>) -> Self {
        tags.sort_unstable();
        tags.dedup();
        Self { kind, tags }
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// The op's tag set, sorted ascending.
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }
}

/// Cache key: registry version plus the canonical plan shape. Two plans
/// with the same ordered op kinds, the same sorted tag sets, and the same
/// start flag hit the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanFingerprint {
    version: RegistryVersion,
    ops: Vec<(OpKind, Vec<TagId>)>,
    start_with_all_cards: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    ops: Vec<PlanOp>,
    row_axis: Vec<TagId>,
    col_axis: Vec<TagId>,
    start_with_all_cards: bool,
}

impl FilterPlan {
    pub fn new(start_with_all_cards: bool) -> Self {
        Self {
            ops: Vec::new(),
            row_axis: Vec::new(),
            col_axis: Vec::new(),
            start_with_all_cards,
        }
    }

    /// Snapshot a plan out of the current drag state.
    ///
    /// Each standard zone with tags contributes its op; the row and column
    /// zones become axes; custom zones carry no set semantics. Ops are
    /// ordered intersection → exclusion/difference → union. That ordering
    /// is a performance choice only (intersections shrink the running set
    /// early); the refinement semantics make the result independent of it.
    pub fn from_tags_in_play(state: &TagsInPlay) -> Self {
        let mut plan = Self::new(state.controls.start_with_all_cards);

        for kind in state.zone_kinds() {
            let tags = state.tags_in(kind);
            if tags.is_empty() {
                continue;
            }
            match kind {
                ZoneKind::Union => {
                    plan.push_op(OpKind::Union, tags.to_vec());
                }
                ZoneKind::Intersection => {
                    plan.push_op(OpKind::Intersection, tags.to_vec());
                }
                ZoneKind::Exclusion => {
                    plan.push_op(OpKind::Exclusion, tags.to_vec());
                }
                ZoneKind::Difference => {
                    plan.push_op(OpKind::Difference, tags.to_vec());
                }
                ZoneKind::Row => plan.row_axis = tags.to_vec(),
                ZoneKind::Column => plan.col_axis = tags.to_vec(),
                ZoneKind::Custom(_) => {}
            }
        }

        plan.ops = plan
            .ops
            .into_iter()
            .sorted_by_key(|op| op.kind().precedence())
            .collect();
        plan
    }

    /// Append an operation. Empty tag sets are dropped outright; they are
    /// identity operations.
    pub fn push_op(&mut self, kind: OpKind, tags: Vec<TagId>) -> &mut Self {
        if !tags.is_empty() {
            self.ops.push(PlanOp::new(kind, tags));
        }
        self
    }

    pub fn with_row_axis(mut self, tags: Vec<TagId>) -> Self {
        self.row_axis = tags;
        self
    }

    pub fn with_col_axis(mut self, tags: Vec<TagId>) -> Self {
        self.col_axis = tags;
        self
    }

    pub fn ops(&self) -> &[PlanOp] {
        &self.ops
    }

    pub fn row_axis(&self) -> &[TagId] {
        &self.row_axis
    }

    pub fn col_axis(&self) -> &[TagId] {
        &self.col_axis
    }

    pub fn start_with_all_cards(&self) -> bool {
        self.start_with_all_cards
    }

    /// Enforce the configured plan bounds.
    pub fn validate(&self, config: &Config) -> Result<(), QueryError> {
        if self.ops.len() > config.max_ops_per_plan {
            return Err(QueryError::PlanBoundsExceeded {
                what: "operations",
                actual: self.ops.len(),
                limit: config.max_ops_per_plan,
            });
        }
        for op in &self.ops {
            if op.tags().len() > config.max_tags_per_zone {
                return Err(QueryError::PlanBoundsExceeded {
                    what: "tags per operation",
                    actual: op.tags().len(),
                    limit: config.max_tags_per_zone,
                });
            }
        }
        Ok(())
    }

    /// Cache key for this plan against one registry snapshot.
    pub fn fingerprint(&self, version: RegistryVersion) -> PlanFingerprint {
        PlanFingerprint {
            version,
            ops: self
                .ops
                .iter()
                .map(|op| (op.kind(), op.tags().to_vec()))
                .collect(),
            start_with_all_cards: self.start_with_all_cards,
        }
    }
}
