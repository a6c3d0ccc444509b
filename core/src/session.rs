//! Session — drop handling and query execution
//!
//! A session owns one user's `tagsInPlay`, their tag groups, and the seam to
//! the external card store. Drop events come in, the dispatch table picks
//! the action, validation runs before any mutation, and every accepted drop
//! that changed `tagsInPlay` is followed by exactly one synchronous
//! re-evaluation through the cached pipeline and the partition engine.

use crate::cache::FilterCache;
use crate::card::CardId;
use crate::config::Config;
use crate::dispatch::{action_for, ActionKind, DropEvent, DroppableKind};
use crate::error::{DispatchError, QueryError};
use crate::groups::GroupStore;
use crate::partition::partition;
use crate::pipeline::{self, CancelToken};
use crate::plan::FilterPlan;
use crate::registry::{CardRegistry, SharedRegistry};
use crate::store::CardStore;
use crate::tags::TagId;
use crate::zones::{TagsInPlay, ZoneKind};
use std::sync::Arc;
use std::time::Instant;

/// Axis labels of a query result, in display order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Axes {
    pub row: Vec<String>,
    pub col: Vec<String>,
}

/// What the renderer receives: card ids per cell, never payloads.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub axes: Axes,
    /// Row-major matrix of card-id lists, ascending card index per cell.
    pub matrix: Vec<Vec<Vec<CardId>>>,
    /// Cardinality of the filter result (distinct cards, before
    /// multiplicity across cells).
    pub total: u64,
    pub operation_time_ms: f64,
    pub cache_hit: bool,
}

#[cfg(feature = "serde")]
impl QueryResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Outcome of one dispatched drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub action: ActionKind,
    /// Whether any state (tagsInPlay or the external store) changed.
    pub changed: bool,
    /// Present exactly when the drop mutated `tagsInPlay`.
    pub result: Option<QueryResult>,
}

pub struct Session<S: CardStore> {
    id: String,
    config: Config,
    registry: SharedRegistry,
    cache: Arc<FilterCache>,
    tags_in_play: TagsInPlay,
    groups: GroupStore,
    store: S,
    evaluations: u64,
}

impl<S: CardStore> Session<S> {
    pub fn new(id: impl Into<String>, config: Config, registry: SharedRegistry, store: S) -> Self {
        let cache = Arc::new(FilterCache::new(config.cache_capacity));
        Self::with_cache(id, config, registry, store, cache)
    }

    /// Share a result cache across sessions; keys embed the registry
    /// version and the plan, so sessions cannot observe each other.
    pub fn with_cache(
        id: impl Into<String>,
        config: Config,
        registry: SharedRegistry,
        store: S,
        cache: Arc<FilterCache>,
    ) -> Self {
        let tags_in_play = TagsInPlay::new(&config);
        let groups = GroupStore::new(config.max_group_depth, config.max_group_size);
        Self {
            id: id.into(),
            config,
            registry,
            cache,
            tags_in_play,
            groups,
            store,
            evaluations: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tags_in_play(&self) -> &TagsInPlay {
        &self.tags_in_play
    }

    /// Caller-managed zone registration and control flags.
    pub fn tags_in_play_mut(&mut self) -> &mut TagsInPlay {
        &mut self.tags_in_play
    }

    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupStore {
        &mut self.groups
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// How many query evaluations this session has run.
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations
    }

    /// Route one drop event through the dispatch table.
    ///
    /// Rejections carry a typed error and leave no state change behind.
    pub fn dispatch(&mut self, event: &DropEvent) -> Result<DropOutcome, DispatchError> {
        if !event.session_id.is_empty() && event.session_id != self.id {
            return Err(DispatchError::UnknownEntity {
                kind: "session",
                reference: event.session_id.clone(),
            });
        }

        let action = action_for(event.drag_kind, event.drop_kind);
        tracing::debug!(
            session = %self.id,
            drag = %event.drag_kind,
            drop = %event.drop_kind,
            %action,
            "drop dispatched"
        );

        if action == ActionKind::Invalid {
            tracing::warn!(
                session = %self.id,
                drag = %event.drag_kind,
                drop = %event.drop_kind,
                "invalid drop rejected"
            );
            return Err(DispatchError::InvalidDrop {
                drag: event.drag_kind,
                drop: event.drop_kind,
            });
        }

        // One snapshot for the whole request, resolution included
        let registry = self.registry.snapshot().map_err(DispatchError::Query)?;

        match action {
            ActionKind::MoveToCloud => {
                let tag = resolve_tag(&registry, &event.drag_ref)?;
                let changed = self.tags_in_play.remove_everywhere(tag).is_some();
                self.finish(action, changed, &registry)
            }
            ActionKind::MoveToZone => {
                let tag = resolve_tag(&registry, &event.drag_ref)?;
                let zone = self.resolve_zone(&event.drop_ref)?;
                let changed =
                    self.tags_in_play
                        .place(tag, &zone, self.config.max_tags_per_zone)?;
                self.finish(action, changed, &registry)
            }
            ActionKind::AddRepresentation => {
                resolve_tag(&registry, &event.drag_ref)?;
                let card = self.resolve_card(&event.drop_ref)?;
                let tag = event.drag_ref.as_str();
                if !self.store.has_tag(&card, tag)
                    && self.store.tag_count(&card) >= self.config.max_tags_per_card
                {
                    return Err(DispatchError::CapacityExceeded {
                        what: "tags per card",
                        limit: self.config.max_tags_per_card,
                    });
                }
                let changed = self.store.add_tag(&card, tag);
                // The registry snapshot is unaffected until the loader
                // rebuilds; no re-evaluation
                Ok(DropOutcome {
                    action,
                    changed,
                    result: None,
                })
            }
            ActionKind::AddToGroup => {
                let tag = resolve_tag(&registry, &event.drag_ref)?;
                let changed = self.groups.add_tag(&event.drop_ref, tag)?;
                Ok(DropOutcome {
                    action,
                    changed,
                    result: None,
                })
            }
            ActionKind::ExpandAndMoveAll => {
                let members = self.groups.expand(&event.drag_ref)?;
                let changed = match event.drop_kind {
                    DroppableKind::TagCloud => {
                        let mut changed = false;
                        for tag in members {
                            changed |= self.tags_in_play.remove_everywhere(tag).is_some();
                        }
                        changed
                    }
                    _ => {
                        let zone = self.resolve_zone(&event.drop_ref)?;
                        self.move_all_to_zone(&members, &zone)?
                    }
                };
                // Atomic with respect to re-evaluation: one run for the
                // whole expansion
                self.finish(action, changed, &registry)
            }
            ActionKind::ExpandAndAddAll => {
                let members = self.groups.expand(&event.drag_ref)?;
                let card = self.resolve_card(&event.drop_ref)?;
                let names = self.member_names(&registry, &members)?;

                let added = names
                    .iter()
                    .filter(|name| !self.store.has_tag(&card, name))
                    .count();
                if self.store.tag_count(&card) + added > self.config.max_tags_per_card {
                    return Err(DispatchError::CapacityExceeded {
                        what: "tags per card",
                        limit: self.config.max_tags_per_card,
                    });
                }

                let mut changed = false;
                for name in &names {
                    changed |= self.store.add_tag(&card, name);
                }
                Ok(DropOutcome {
                    action,
                    changed,
                    result: None,
                })
            }
            ActionKind::MoveCosmetic => Ok(DropOutcome {
                action,
                changed: false,
                result: None,
            }),
            ActionKind::ChangeDimensionMembership => {
                let card = self.resolve_card(&event.drag_ref)?;
                let src = parse_cell_ref(event.origin_ref.as_deref().unwrap_or_default());
                let dst = parse_cell_ref(&event.drop_ref);
                for name in src.iter().chain(dst.iter()) {
                    resolve_tag(&registry, name)?;
                }

                // Symmetric difference of the two cells' axis tags
                let mut changed = false;
                for name in src.iter().filter(|n| !dst.contains(n)) {
                    changed |= self.store.remove_tag(&card, name);
                }
                for name in dst.iter().filter(|n| !src.contains(n)) {
                    if !self.store.has_tag(&card, name)
                        && self.store.tag_count(&card) >= self.config.max_tags_per_card
                    {
                        return Err(DispatchError::CapacityExceeded {
                            what: "tags per card",
                            limit: self.config.max_tags_per_card,
                        });
                    }
                    changed |= self.store.add_tag(&card, name);
                }

                tracing::info!(
                    session = %self.id,
                    card = %card,
                    "dimension membership changed; registry rebuild is the loader's turn"
                );
                Ok(DropOutcome {
                    action,
                    changed,
                    result: None,
                })
            }
            ActionKind::Invalid => unreachable!("rejected above"),
        }
    }

    /// Run the full plan → pipeline → partition cycle against the current
    /// registry snapshot.
    pub fn evaluate(&mut self) -> Result<QueryResult, QueryError> {
        self.evaluate_with(&CancelToken::new())
    }

    pub fn evaluate_with(&mut self, cancel: &CancelToken) -> Result<QueryResult, QueryError> {
        let registry = self.registry.snapshot()?;
        self.run_query(&registry, cancel)
    }

    fn finish(
        &mut self,
        action: ActionKind,
        changed: bool,
        registry: &CardRegistry,
    ) -> Result<DropOutcome, DispatchError> {
        let result = if changed {
            Some(self.run_query(registry, &CancelToken::new())?)
        } else {
            None
        };
        Ok(DropOutcome {
            action,
            changed,
            result,
        })
    }

    fn run_query(
        &mut self,
        registry: &CardRegistry,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        let start = Instant::now();
        let plan = FilterPlan::from_tags_in_play(&self.tags_in_play);
        plan.validate(&self.config)?;

        let key = plan.fingerprint(registry.version());
        let (result, cache_hit) = match self.cache.get(&key) {
            Some(hit) => (hit, true),
            None => {
                let fresh = pipeline::evaluate(&plan, registry, &self.config, cancel)?;
                self.cache.insert(key, fresh.clone());
                (fresh, false)
            }
        };
        self.evaluations += 1;

        let cells = partition(&result, plan.row_axis(), plan.col_axis(), registry);
        let matrix = (0..cells.rows())
            .map(|r| {
                (0..cells.cols())
                    .map(|c| {
                        cells
                            .cell(r, c)
                            .iter()
                            .filter_map(|i| registry.card(i).map(|card| card.id.clone()))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let query = QueryResult {
            axes: Axes {
                row: axis_labels(registry, plan.row_axis()),
                col: axis_labels(registry, plan.col_axis()),
            },
            matrix,
            total: result.len(),
            operation_time_ms: start.elapsed().as_secs_f64() * 1_000.0,
            cache_hit,
        };
        tracing::debug!(
            session = %self.id,
            total = query.total,
            cache_hit,
            elapsed_ms = query.operation_time_ms,
            "query evaluated"
        );
        Ok(query)
    }

    /// Move every group member into `zone`, validating capacity for the
    /// whole batch before touching anything.
    fn move_all_to_zone(
        &mut self,
        members: &[TagId],
        zone: &ZoneKind,
    ) -> Result<bool, DispatchError> {
        let incoming = members
            .iter()
            .filter(|tag| self.tags_in_play.zone_of(**tag) != Some(zone))
            .count();
        if self.tags_in_play.tags_in(zone).len() + incoming > self.config.max_tags_per_zone {
            return Err(DispatchError::CapacityExceeded {
                what: "tags per zone",
                limit: self.config.max_tags_per_zone,
            });
        }

        let mut changed = false;
        for tag in members {
            changed |= self
                .tags_in_play
                .place(*tag, zone, self.config.max_tags_per_zone)?;
        }
        Ok(changed)
    }

    fn member_names(
        &self,
        registry: &CardRegistry,
        members: &[TagId],
    ) -> Result<Vec<String>, DispatchError> {
        members
            .iter()
            .map(|tag| {
                registry
                    .dictionary()
                    .name_of(*tag)
                    .map(str::to_string)
                    .map_err(|_| DispatchError::UnknownEntity {
                        kind: "tag",
                        reference: tag.to_string(),
                    })
            })
            .collect()
    }

    fn resolve_zone(&self, reference: &str) -> Result<ZoneKind, DispatchError> {
        if let Some(kind) = ZoneKind::parse(reference) {
            return Ok(kind);
        }
        let custom = ZoneKind::Custom(reference.to_string());
        if self.tags_in_play.is_registered(&custom) {
            Ok(custom)
        } else {
            Err(DispatchError::UnknownEntity {
                kind: "zone",
                reference: reference.to_string(),
            })
        }
    }

    fn resolve_card(&self, reference: &str) -> Result<CardId, DispatchError> {
        let card = CardId::from(reference);
        if self.store.contains_card(&card) {
            Ok(card)
        } else {
            Err(DispatchError::UnknownEntity {
                kind: "card",
                reference: reference.to_string(),
            })
        }
    }
}

fn resolve_tag(registry: &CardRegistry, name: &str) -> Result<TagId, DispatchError> {
    registry
        .dictionary()
        .id_of(name)
        .ok_or_else(|| DispatchError::UnknownEntity {
            kind: "tag",
            reference: name.to_string(),
        })
}

fn axis_labels(registry: &CardRegistry, axis: &[TagId]) -> Vec<String> {
    axis.iter()
        .map(|tag| {
            registry
                .dictionary()
                .name_of(*tag)
                .unwrap_or("?")
                .to_string()
        })
        .collect()
}

/// Cell refs join their axis tag names with `+`; the empty ref is the
/// single implicit cell of an axis-less matrix.
fn parse_cell_ref(reference: &str) -> Vec<String> {
    reference
        .split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::dispatch::DraggableKind;
    use crate::registry::CardRegistry;
    use crate::store::MemoryCardStore;

    fn seed_cards() -> Vec<Card> {
        vec![
            Card::new("c1", ["a", "b"]),
            Card::new("c2", ["a"]),
            Card::new("c3", ["b", "c"]),
            Card::new("c4", ["a", "b", "c"]),
        ]
    }

    fn session() -> Session<MemoryCardStore> {
        let registry = SharedRegistry::new();
        registry.publish(CardRegistry::build(seed_cards(), &Config::default()).unwrap());
        Session::new(
            "s1",
            Config::default(),
            registry,
            MemoryCardStore::from_cards(seed_cards()),
        )
    }

    fn move_tag(tag: &str, zone: &str) -> DropEvent {
        DropEvent::new(DraggableKind::Tag, tag, DroppableKind::Zone, zone)
    }

    #[test]
    fn test_move_to_zone_triggers_one_evaluation() {
        let mut session = session();

        let outcome = session.dispatch(&move_tag("a", "union")).unwrap();
        assert_eq!(outcome.action, ActionKind::MoveToZone);
        assert!(outcome.changed);
        let result = outcome.result.expect("re-evaluation result");
        assert_eq!(result.total, 3);
        assert_eq!(session.evaluation_count(), 1);
    }

    #[test]
    fn test_move_between_zones() {
        let mut session = session();
        session.dispatch(&move_tag("a", "union")).unwrap();
        session.dispatch(&move_tag("b", "union")).unwrap();
        let evaluations = session.evaluation_count();

        let outcome = session.dispatch(&move_tag("b", "intersection")).unwrap();
        assert!(outcome.changed);
        assert_eq!(session.evaluation_count(), evaluations + 1);

        let dict_zone = |name: &str| {
            session
                .tags_in_play()
                .tags_in(&ZoneKind::parse(name).unwrap())
                .len()
        };
        assert_eq!(dict_zone("union"), 1);
        assert_eq!(dict_zone("intersection"), 1);
    }

    #[test]
    fn test_invalid_drop_leaves_state_untouched() {
        let mut session = session();
        session.dispatch(&move_tag("a", "union")).unwrap();
        let before = session.tags_in_play().clone();
        let evaluations = session.evaluation_count();

        let err = session
            .dispatch(&DropEvent::new(
                DraggableKind::Zone,
                "union",
                DroppableKind::TagCloud,
                "",
            ))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidDrop { .. }));
        assert_eq!(session.tags_in_play().tags_in(&ZoneKind::Union), before.tags_in(&ZoneKind::Union));
        assert_eq!(session.evaluation_count(), evaluations);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let mut session = session();
        let err = session.dispatch(&move_tag("ghost", "union")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownEntity {
                kind: "tag",
                reference: "ghost".to_string(),
            }
        );
        assert_eq!(session.evaluation_count(), 0);
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        let mut session = session();
        let err = session.dispatch(&move_tag("a", "shelf")).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownEntity {
                kind: "zone",
                reference: "shelf".to_string(),
            }
        );
    }

    #[test]
    fn test_registered_custom_zone_accepts_drops() {
        let mut session = session();
        session
            .tags_in_play_mut()
            .register_zone(ZoneKind::Custom("shelf".to_string()));

        let outcome = session.dispatch(&move_tag("a", "shelf")).unwrap();
        // Custom zones hold tags but carry no set semantics
        assert!(outcome.changed);
        assert_eq!(outcome.result.unwrap().total, 4);
    }

    #[test]
    fn test_move_to_cloud_restores_prior_state() {
        let mut session = session();
        session.dispatch(&move_tag("a", "union")).unwrap();

        let cloud = DropEvent::new(DraggableKind::Tag, "a", DroppableKind::TagCloud, "");
        let outcome = session.dispatch(&cloud).unwrap();
        assert_eq!(outcome.action, ActionKind::MoveToCloud);
        assert!(outcome.changed);
        assert!(session.tags_in_play().is_empty());

        // A second move to cloud is a no-op without re-evaluation
        let evaluations = session.evaluation_count();
        let outcome = session.dispatch(&cloud).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.result.is_none());
        assert_eq!(session.evaluation_count(), evaluations);
    }

    #[test]
    fn test_add_representation_skips_reevaluation() {
        let mut session = session();
        let event = DropEvent::new(DraggableKind::Tag, "c", DroppableKind::CardTags, "c1");

        let outcome = session.dispatch(&event).unwrap();
        assert_eq!(outcome.action, ActionKind::AddRepresentation);
        assert!(outcome.changed);
        assert!(outcome.result.is_none());
        assert_eq!(session.evaluation_count(), 0);
        assert!(session.store().has_tag(&"c1".into(), "c"));

        // The published registry snapshot is untouched
        let snapshot = session.registry.snapshot().unwrap();
        let c_id = snapshot.dictionary().id_of("c").unwrap();
        let c1 = snapshot.index_of(&"c1".into()).unwrap();
        assert!(!snapshot.cards_with_tag(c_id).contains(c1));
    }

    #[test]
    fn test_add_representation_capacity() {
        let mut session = session();
        session.config.max_tags_per_card = 2;

        let event = DropEvent::new(DraggableKind::Tag, "c", DroppableKind::CardTags, "c1");
        // c1 already carries two tags
        let err = session.dispatch(&event).unwrap_err();
        assert_eq!(
            err,
            DispatchError::CapacityExceeded {
                what: "tags per card",
                limit: 2,
            }
        );
        assert!(!session.store().has_tag(&"c1".into(), "c"));
    }

    #[test]
    fn test_group_expansion_moves_atomically() {
        let mut session = session();
        session.groups_mut().define("pair");
        for tag in ["a", "b"] {
            session
                .dispatch(&DropEvent::new(
                    DraggableKind::Tag,
                    tag,
                    DroppableKind::TagGroupTarget,
                    "pair",
                ))
                .unwrap();
        }
        assert_eq!(session.evaluation_count(), 0);

        let outcome = session
            .dispatch(&DropEvent::new(
                DraggableKind::TagGroup,
                "pair",
                DroppableKind::Zone,
                "intersection",
            ))
            .unwrap();
        assert_eq!(outcome.action, ActionKind::ExpandAndMoveAll);
        // Both members landed with a single re-evaluation
        assert_eq!(session.evaluation_count(), 1);
        assert_eq!(
            session.tags_in_play().tags_in(&ZoneKind::Intersection).len(),
            2
        );
        assert_eq!(outcome.result.unwrap().total, 2);
    }

    #[test]
    fn test_group_expansion_respects_zone_capacity_atomically() {
        let mut session = session();
        session.config.max_tags_per_zone = 1;
        session.groups_mut().define("pair");
        session.groups_mut().add_tag("pair", 0).unwrap();
        session.groups_mut().add_tag("pair", 1).unwrap();

        let err = session
            .dispatch(&DropEvent::new(
                DraggableKind::TagGroup,
                "pair",
                DroppableKind::Zone,
                "union",
            ))
            .unwrap_err();
        assert!(matches!(err, DispatchError::CapacityExceeded { .. }));
        // Nothing moved
        assert!(session.tags_in_play().is_empty());
    }

    #[test]
    fn test_cosmetic_move_changes_nothing() {
        let mut session = session();
        let outcome = session
            .dispatch(&DropEvent::new(
                DraggableKind::Zone,
                "union",
                DroppableKind::ControlArea,
                "sidebar",
            ))
            .unwrap();
        assert_eq!(outcome.action, ActionKind::MoveCosmetic);
        assert!(!outcome.changed);
        assert!(outcome.result.is_none());
        assert_eq!(session.evaluation_count(), 0);
    }

    #[test]
    fn test_change_dimension_membership_diffs_cells() {
        let mut session = session();
        let event = DropEvent::new(DraggableKind::Card, "c2", DroppableKind::MatrixCell, "b")
            .with_origin("a");

        let outcome = session.dispatch(&event).unwrap();
        assert_eq!(outcome.action, ActionKind::ChangeDimensionMembership);
        assert!(outcome.changed);
        assert!(outcome.result.is_none());
        // Source-exclusive "a" removed, destination-exclusive "b" added
        assert!(!session.store().has_tag(&"c2".into(), "a"));
        assert!(session.store().has_tag(&"c2".into(), "b"));
    }

    #[test]
    fn test_change_dimension_membership_shared_axis_tags_survive() {
        let mut session = session();
        let event = DropEvent::new(DraggableKind::Card, "c4", DroppableKind::MatrixCell, "a+c")
            .with_origin("a+b");

        session.dispatch(&event).unwrap();
        // "a" is in both cells and stays put
        assert!(session.store().has_tag(&"c4".into(), "a"));
        assert!(!session.store().has_tag(&"c4".into(), "b"));
        assert!(session.store().has_tag(&"c4".into(), "c"));
    }

    #[test]
    fn test_change_dimension_membership_unknown_card() {
        let mut session = session();
        let event = DropEvent::new(DraggableKind::Card, "ghost", DroppableKind::MatrixCell, "a");
        let err = session.dispatch(&event).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownEntity {
                kind: "card",
                reference: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_session_id_mismatch_is_rejected() {
        let mut session = session();
        let event = move_tag("a", "union").with_session("someone-else");
        let err = session.dispatch(&event).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownEntity {
                kind: "session",
                reference: "someone-else".to_string(),
            }
        );
    }

    #[test]
    fn test_uninitialized_registry_fails_loudly() {
        let mut session = Session::new(
            "s1",
            Config::default(),
            SharedRegistry::new(),
            MemoryCardStore::new(),
        );
        let err = session.dispatch(&move_tag("a", "union")).unwrap_err();
        assert_eq!(err, DispatchError::Query(QueryError::RegistryNotInitialized));
    }

    #[test]
    fn test_repeat_query_hits_cache() {
        let mut session = session();
        session.dispatch(&move_tag("a", "union")).unwrap();

        let first = session.evaluate().unwrap();
        assert!(first.cache_hit, "dispatch already populated this key");

        // Same state, same registry version: still a hit, same answer
        let second = session.evaluate().unwrap();
        assert!(second.cache_hit);
        assert_eq!(first.matrix, second.matrix);
        assert_eq!(first.total, second.total);
    }

    #[test]
    fn test_result_matrix_lists_card_ids() {
        let mut session = session();
        session.dispatch(&move_tag("b", "row")).unwrap();
        let result = session.evaluate().unwrap();

        assert_eq!(result.axes.row, vec!["b".to_string()]);
        assert!(result.axes.col.is_empty());
        assert_eq!(result.matrix.len(), 1);
        let cell: Vec<&str> = result.matrix[0][0].iter().map(CardId::as_str).collect();
        assert_eq!(cell, vec!["c1", "c3", "c4"]);
        // Total counts the filter result, not cell placements
        assert_eq!(result.total, 4);
    }
}
