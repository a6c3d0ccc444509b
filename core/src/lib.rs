//! Spatial tag-set filtering and partitioning engine.
//!
//! Cards are immutable tagged records; users drag tags into zones, each
//! zone contributes a set-theoretic constraint, and the engine answers with
//! the matching card subset, optionally partitioned into a matrix by row
//! and column tag axes. The registry is built once per snapshot and shared
//! read-only; drop events route through a static dispatch table into
//! per-session state mutations followed by one synchronous re-evaluation.

pub mod cache;
pub mod card;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod groups;
pub mod partition;
pub mod pipeline;
pub mod plan;
pub mod registry;
pub mod session;
pub mod store;
pub mod tags;
pub mod zones;

#[cfg(test)]
mod tests {
    use crate::card::Card;
    use crate::config::Config;
    use crate::dispatch::{DraggableKind, DropEvent, DroppableKind};
    use crate::registry::{CardRegistry, SharedRegistry};
    use crate::session::Session;
    use crate::store::MemoryCardStore;

    #[test]
    // Drive a session through a drag sequence end to end: filter, partition,
    // rebuild after a card mutation
    fn test_drag_filter_partition_cycle() {
        let cards = vec![
            Card::new("bug-1", ["bug", "backend", "urgent"]),
            Card::new("bug-2", ["bug", "frontend"]),
            Card::new("feat-1", ["feature", "backend"]),
            Card::new("feat-2", ["feature", "frontend", "urgent"]),
        ];
        let shared = SharedRegistry::new();
        shared.publish(CardRegistry::build(cards.clone(), &Config::default()).unwrap());
        let mut session = Session::new(
            "e2e",
            Config::default(),
            shared.clone(),
            MemoryCardStore::from_cards(cards),
        );

        // Narrow to bugs
        let outcome = session
            .dispatch(&DropEvent::new(
                DraggableKind::Tag,
                "bug",
                DroppableKind::Zone,
                "intersection",
            ))
            .unwrap();
        assert_eq!(outcome.result.unwrap().total, 2);

        // Split them by area
        for tag in ["backend", "frontend"] {
            session
                .dispatch(&DropEvent::new(
                    DraggableKind::Tag,
                    tag,
                    DroppableKind::Zone,
                    "column",
                ))
                .unwrap();
        }
        let result = session.evaluate().unwrap();
        assert_eq!(result.axes.col, vec!["backend", "frontend"]);
        assert_eq!(result.matrix[0][0].len(), 1);
        assert_eq!(result.matrix[0][1].len(), 1);

        // Re-tag a card in the external store, rebuild, and observe the swap
        let event = DropEvent::new(DraggableKind::Tag, "backend", DroppableKind::CardTags, "bug-2");
        session.dispatch(&event).unwrap();
        shared.publish(
            CardRegistry::build(session.store().to_cards(), &Config::default()).unwrap(),
        );

        let result = session.evaluate().unwrap();
        assert!(!result.cache_hit, "new registry version misses the cache");
        // bug-2 now sits in both area columns
        assert_eq!(result.matrix[0][0].len(), 2);
        assert_eq!(result.matrix[0][1].len(), 1);
    }

    #[test]
    // Rejected drops never disturb an in-flight layout
    fn test_rejection_preserves_layout() {
        let cards = vec![Card::new("only", ["keep"])];
        let shared = SharedRegistry::new();
        shared.publish(CardRegistry::build(cards.clone(), &Config::default()).unwrap());
        let mut session = Session::new(
            "e2e",
            Config::default(),
            shared,
            MemoryCardStore::from_cards(cards),
        );

        session
            .dispatch(&DropEvent::new(
                DraggableKind::Tag,
                "keep",
                DroppableKind::Zone,
                "union",
            ))
            .unwrap();

        assert!(session
            .dispatch(&DropEvent::new(
                DraggableKind::Tag,
                "missing",
                DroppableKind::Zone,
                "union",
            ))
            .is_err());
        assert!(session
            .dispatch(&DropEvent::new(
                DraggableKind::Card,
                "only",
                DroppableKind::TagCloud,
                "",
            ))
            .is_err());

        let result = session.evaluate().unwrap();
        assert_eq!(result.total, 1);
    }
}
