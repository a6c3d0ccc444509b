//! Filter Pipeline
//!
//! Pure evaluation of a [`FilterPlan`] against a registry snapshot. The
//! running set starts as the universe (or the empty set, per controls) and
//! every operation refines it with bitmap algebra; cards are never iterated
//! individually. A cooperative cancellation token is checked between
//! operations and an empty running set returns immediately.

use crate::config::Config;
use crate::error::QueryError;
use crate::plan::{FilterPlan, OpKind, PlanOp};
use crate::registry::CardRegistry;
use crate::tags::TagId;
use roaring::RoaringBitmap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a request handler and the
/// pipeline. Cancellation is checked between operations; partial results are
/// never exposed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Evaluate `plan` against `registry`, producing the result bitmap.
///
/// Bounds are validated up front (`PlanBoundsExceeded`); cancellation
/// surfaces as `Cancelled` without logging at error level.
pub fn evaluate(
    plan: &FilterPlan,
    registry: &CardRegistry,
    config: &Config,
    cancel: &CancelToken,
) -> Result<RoaringBitmap, QueryError> {
    plan.validate(config)?;

    let mut result = if plan.start_with_all_cards() {
        registry.universe().clone()
    } else {
        RoaringBitmap::new()
    };

    let interval = config.cancellation_check_interval.max(1);
    for (step, op) in plan.ops().iter().enumerate() {
        if step % interval == 0 && cancel.is_cancelled() {
            tracing::debug!(step, "pipeline cancelled");
            return Err(QueryError::Cancelled);
        }
        if result.is_empty() {
            break;
        }

        apply_op(op, registry, &mut result);
        tracing::debug!(
            step,
            op = %op.kind(),
            remaining = result.len(),
            "pipeline op applied"
        );
    }

    Ok(result)
}

/// Refine `result` in place with one operation.
///
/// For union, exclusion and difference, tags unknown to the registry's
/// dictionary are dropped from the op's set first; an op whose set reduces
/// to nothing is the identity. An intersection does not drop unknowns: a
/// required tag that no card carries matches nothing, so any unknown tag
/// forces the empty result.
fn apply_op(op: &PlanOp, registry: &CardRegistry, result: &mut RoaringBitmap) {
    match op.kind() {
        OpKind::Intersection => {
            for tag in op.tags() {
                *result &= registry.cards_with_tag(*tag);
                if result.is_empty() {
                    return;
                }
            }
        }
        OpKind::Union => {
            let known = known_tags(op, registry);
            if known.is_empty() {
                return;
            }
            *result &= &union_of(&known, registry);
        }
        OpKind::Exclusion | OpKind::Difference => {
            let known = known_tags(op, registry);
            if known.is_empty() {
                return;
            }
            *result -= &union_of(&known, registry);
        }
    }
}

fn known_tags(op: &PlanOp, registry: &CardRegistry) -> Vec<TagId> {
    op.tags()
        .iter()
        .copied()
        .filter(|t| registry.dictionary().contains_id(*t))
        .collect()
}

fn union_of(tags: &[TagId], registry: &CardRegistry) -> RoaringBitmap {
    let mut acc = RoaringBitmap::new();
    for tag in tags {
        acc |= registry.cards_with_tag(*tag);
    }
    acc
}
