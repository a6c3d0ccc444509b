//! End-to-end filter and partition scenarios over a small literal registry.

use cardgrid::card::{Card, CardId};
use cardgrid::config::Config;
use cardgrid::dispatch::{DraggableKind, DropEvent, DroppableKind};
use cardgrid::error::DispatchError;
use cardgrid::partition::partition;
use cardgrid::pipeline::{self, CancelToken};
use cardgrid::plan::{FilterPlan, OpKind};
use cardgrid::registry::{CardRegistry, SharedRegistry};
use cardgrid::session::Session;
use cardgrid::store::MemoryCardStore;
use cardgrid::tags::TagId;
use cardgrid::zones::ZoneKind;

fn abc_cards() -> Vec<Card> {
    vec![
        Card::new("c1", ["a", "b"]),
        Card::new("c2", ["a"]),
        Card::new("c3", ["b", "c"]),
        Card::new("c4", ["a", "b", "c"]),
    ]
}

fn registry(cards: Vec<Card>) -> CardRegistry {
    CardRegistry::build(cards, &Config::default()).unwrap()
}

fn tag(registry: &CardRegistry, name: &str) -> TagId {
    registry.dictionary().id_of(name).unwrap()
}

fn result_ids(registry: &CardRegistry, plan: &FilterPlan) -> Vec<String> {
    pipeline::evaluate(plan, registry, &Config::default(), &CancelToken::new())
        .unwrap()
        .iter()
        .map(|i| registry.card(i).unwrap().id.to_string())
        .collect()
}

#[test]
fn scenario_a_intersection_filter() {
    let registry = registry(abc_cards());
    let mut plan = FilterPlan::new(true);
    plan.push_op(
        OpKind::Intersection,
        vec![tag(&registry, "a"), tag(&registry, "b")],
    );

    assert_eq!(result_ids(&registry, &plan), vec!["c1", "c4"]);

    // The axis-less matrix is one cell holding the whole result
    let result =
        pipeline::evaluate(&plan, &registry, &Config::default(), &CancelToken::new()).unwrap();
    let matrix = partition(&result, &[], &[], &registry);
    assert_eq!(matrix.rows(), 1);
    assert_eq!(matrix.cols(), 1);
    assert_eq!(matrix.cell(0, 0), &result);
}

#[test]
fn scenario_b_exclusion() {
    let registry = registry(abc_cards());
    let mut plan = FilterPlan::new(true);
    plan.push_op(OpKind::Exclusion, vec![tag(&registry, "c")]);

    assert_eq!(result_ids(&registry, &plan), vec!["c1", "c2"]);
}

#[test]
fn scenario_c_partition_multiplicity() {
    let registry = registry(vec![
        Card::new("c1", ["row1", "col1"]),
        Card::new("c2", ["row1", "col2"]),
        Card::new("c3", ["row1", "col1", "col2"]),
    ]);
    let rows = [tag(&registry, "row1")];
    let cols = [tag(&registry, "col1"), tag(&registry, "col2")];

    let matrix = partition(registry.universe(), &rows, &cols, &registry);
    let cell = |r: usize, c: usize| -> Vec<String> {
        matrix
            .cell(r, c)
            .iter()
            .map(|i| registry.card(i).unwrap().id.to_string())
            .collect()
    };

    assert_eq!(cell(0, 0), vec!["c1", "c3"]);
    assert_eq!(cell(0, 1), vec!["c2", "c3"]);
    // c3 appears in both cells
    let c3 = registry.index_of(&CardId::from("c3")).unwrap();
    assert_eq!(matrix.placements_of(c3), 2);
}

#[test]
fn scenario_d_invalid_drop() {
    let shared = SharedRegistry::new();
    shared.publish(registry(abc_cards()));
    let mut session = Session::new(
        "s",
        Config::default(),
        shared,
        MemoryCardStore::from_cards(abc_cards()),
    );
    session
        .dispatch(&DropEvent::new(
            DraggableKind::Tag,
            "a",
            DroppableKind::Zone,
            "union",
        ))
        .unwrap();
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
    assert_eq!(
        session.tags_in_play().tags_in(&ZoneKind::Union),
        &[registry(abc_cards()).dictionary().id_of("a").unwrap()]
    );
    assert_eq!(session.evaluation_count(), evaluations);
}

#[test]
fn scenario_e_move_between_zones() {
    let shared = SharedRegistry::new();
    let published = shared.publish(registry(abc_cards()));
    let x = published.dictionary().id_of("a").unwrap();
    let y = published.dictionary().id_of("b").unwrap();

    let mut session = Session::new(
        "s",
        Config::default(),
        shared,
        MemoryCardStore::from_cards(abc_cards()),
    );
    for name in ["a", "b"] {
        session
            .dispatch(&DropEvent::new(
                DraggableKind::Tag,
                name,
                DroppableKind::Zone,
                "union",
            ))
            .unwrap();
    }
    let evaluations = session.evaluation_count();

    let outcome = session
        .dispatch(&DropEvent::new(
            DraggableKind::Tag,
            "b",
            DroppableKind::Zone,
            "intersection",
        ))
        .unwrap();

    assert!(outcome.changed);
    assert_eq!(session.tags_in_play().tags_in(&ZoneKind::Union), &[x]);
    assert_eq!(
        session.tags_in_play().tags_in(&ZoneKind::Intersection),
        &[y]
    );
    // The pipeline re-ran exactly once
    assert_eq!(session.evaluation_count(), evaluations + 1);
}

#[test]
fn scenario_f_unknown_tag_in_intersection() {
    let registry = registry(abc_cards());
    let mut plan = FilterPlan::new(true);
    // "z" never made it into the dictionary; its stand-in id matches nothing
    let unknown: TagId = 999;
    plan.push_op(OpKind::Intersection, vec![tag(&registry, "a"), unknown]);

    assert!(result_ids(&registry, &plan).is_empty());
}
