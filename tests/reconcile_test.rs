//! Tests for identity-preserving reconciliation (section view and full tree)

use std::collections::BTreeMap;
use std::sync::Arc;

use checktree::domain::{
    build, reduce, ItemDescriptor, NodeConfig, Reconciler, Request, Snapshot,
    DEFAULT_SECTION_NAME,
};
use checktree::util::testing::init_test_setup;

type Props = BTreeMap<String, String>;

fn notes(text: &str) -> Props {
    BTreeMap::from([("notes".to_string(), text.to_string())])
}

fn shopping_list() -> Snapshot<Props> {
    init_test_setup();
    Reconciler::default().sections(
        None,
        vec![
            ItemDescriptor::new("Milk").in_section("Shopping"),
            ItemDescriptor::new("Eggs")
                .in_section("Shopping")
                .with_selected(true)
                .with_payload(notes("free range")),
            ItemDescriptor::new("Sweep").in_section("Chores").with_selected(true),
        ],
    )
}

// ============================================================
// First build
// ============================================================

#[test]
fn given_no_prior_snapshot_when_rebuilding_then_sections_follow_first_seen_order() {
    init_test_setup();

    let snapshot = Reconciler::default().sections::<Props>(
        None,
        vec![
            ItemDescriptor::new("a").in_section("B"),
            ItemDescriptor::new("b"),
            ItemDescriptor::new("c").in_section("A"),
            ItemDescriptor::new("d").in_section("B"),
        ],
    );

    let root = snapshot.root();
    assert_eq!(root.name(), "");
    let sections: Vec<&str> = root.children().iter().map(|s| s.name()).collect();
    assert_eq!(sections, ["B", DEFAULT_SECTION_NAME, "A"]);
    let items: Vec<&str> = root.children()[0].children().iter().map(|i| i.name()).collect();
    assert_eq!(items, ["a", "d"]);
}

#[test]
fn given_descriptor_without_fields_when_rebuilding_then_defaults_apply() {
    let snapshot = Reconciler::new("Inbox").sections::<Props>(None, vec![ItemDescriptor::new("x")]);

    let section = &snapshot.root().children()[0];
    assert_eq!(section.name(), "Inbox");
    assert_eq!(section.payload(), Some(&Props::new()));
    let item = &section.children()[0];
    assert!(!item.selected());
    assert_eq!(item.payload(), Some(&Props::new()));
    assert_eq!(item.parent_id(), Some(section.id()));
    assert_eq!(section.parent_id(), Some(snapshot.root().id()));
}

#[test]
fn given_section_payload_when_rebuilding_new_section_then_first_payload_taken() {
    let snapshot = Reconciler::default().sections(
        None,
        vec![
            ItemDescriptor::new("a").in_section("S"),
            ItemDescriptor::new("b")
                .in_section("S")
                .with_section_payload(notes("first")),
            ItemDescriptor::new("c")
                .in_section("S")
                .with_section_payload(notes("second")),
        ],
    );

    assert_eq!(snapshot.root().children()[0].payload(), Some(&notes("first")));
}

// ============================================================
// Identity preservation
// ============================================================

#[test]
fn given_selected_eggs_when_rebuilding_with_eggs_again_then_selection_and_id_kept() {
    let before = shopping_list();
    let eggs_before = Arc::clone(before.find_by_names(&["Shopping", "Eggs"]).unwrap());

    let after = Reconciler::default().sections(
        Some(&before),
        vec![
            ItemDescriptor::new("Eggs").in_section("Shopping"),
            ItemDescriptor::new("Bread").in_section("Shopping"),
        ],
    );

    let eggs_after = after.find_by_names(&["Shopping", "Eggs"]).unwrap();
    assert!(eggs_after.selected());
    assert_eq!(eggs_after.id(), eggs_before.id());
    assert_eq!(eggs_after.payload(), Some(&notes("free range")));
    assert!(Arc::ptr_eq(eggs_after, &eggs_before));
    assert!(!after.find_by_names(&["Shopping", "Bread"]).unwrap().selected());
}

#[test]
fn given_eggs_without_prior_match_when_rebuilding_then_unselected() {
    let before = shopping_list();

    let after = Reconciler::default().sections(
        Some(&before),
        vec![ItemDescriptor::new("Eggs").in_section("Groceries")],
    );

    let eggs = after.find_by_names(&["Groceries", "Eggs"]).unwrap();
    assert!(!eggs.selected());
    assert_ne!(
        eggs.id(),
        before.find_by_names(&["Shopping", "Eggs"]).unwrap().id()
    );
}

#[test]
fn given_selected_sweep_when_rebuilding_chores_alone_then_old_node_reused() {
    let before = shopping_list();
    let chores_before = before.find_by_names(&["Chores"]).unwrap().id();

    let after = reduce(
        &before,
        Request::Rebuild(vec![ItemDescriptor::new("Sweep").in_section("Chores")]),
    );

    let root = after.root();
    assert_eq!(root.id(), before.root().id());
    assert_eq!(root.children().len(), 1);
    let chores = &root.children()[0];
    assert_eq!(chores.id(), chores_before);
    assert!(chores.children()[0].selected());
    assert!(chores.is_all_selected());
}

#[test]
fn given_descriptor_selected_false_when_item_matches_then_descriptor_ignored() {
    let before = shopping_list();

    let after = Reconciler::default().sections(
        Some(&before),
        vec![ItemDescriptor::new("Eggs")
            .in_section("Shopping")
            .with_selected(false)
            .with_payload(notes("ignored"))],
    );

    let eggs = after.find_by_names(&["Shopping", "Eggs"]).unwrap();
    assert!(eggs.selected());
    assert_eq!(eggs.payload(), Some(&notes("free range")));
}

#[test]
fn given_reordered_descriptors_when_rebuilding_then_item_order_follows_descriptors() {
    let before = shopping_list();

    let after = Reconciler::default().sections(
        Some(&before),
        vec![
            ItemDescriptor::new("Eggs").in_section("Shopping"),
            ItemDescriptor::new("Milk").in_section("Shopping"),
        ],
    );

    let names: Vec<&str> = after.root().children()[0]
        .children()
        .iter()
        .map(|i| i.name())
        .collect();
    assert_eq!(names, ["Eggs", "Milk"]);
}

#[test]
fn given_renamed_section_and_item_when_rebuilding_then_treated_as_new() {
    let before = shopping_list();
    let sweep_before = before.find_by_names(&["Chores", "Sweep"]).unwrap().id();

    let after = Reconciler::default().sections(
        Some(&before),
        vec![ItemDescriptor::new("Sweep Floor").in_section("Housework")],
    );

    let sweep = after.find_by_names(&["Housework", "Sweep Floor"]).unwrap();
    assert_ne!(sweep.id(), sweep_before);
    assert!(!sweep.selected());
    assert!(after.find_by_names(&["Chores"]).is_none());
}

#[test]
fn given_user_selection_when_rebuilding_through_store_path_then_selection_survives() {
    let before = shopping_list();
    let milk = before.find_by_names(&["Shopping", "Milk"]).unwrap().id();
    let toggled = reduce(&before, Request::Toggle(milk));

    let after = reduce(
        &toggled,
        Request::Rebuild(vec![
            ItemDescriptor::new("Milk").in_section("Shopping"),
            ItemDescriptor::new("Eggs").in_section("Shopping"),
        ]),
    );

    let shopping = after.find_by_names(&["Shopping"]).unwrap();
    assert!(shopping.is_all_selected());
}

#[test]
fn given_matched_section_without_payload_when_rebuilding_then_payload_stays_absent() {
    init_test_setup();
    let before = build::<Props>(
        NodeConfig::new("root").with_child(
            NodeConfig::new("Chores").with_child(NodeConfig::new("Sweep").with_selected(true)),
        ),
    );
    assert!(before.find_by_names(&["Chores"]).unwrap().payload().is_none());

    let after = Reconciler::default().sections(
        Some(&before),
        vec![ItemDescriptor::new("Sweep")
            .in_section("Chores")
            .with_section_payload(notes("new"))],
    );

    let chores = after.find_by_names(&["Chores"]).unwrap();
    assert_eq!(chores.id(), before.find_by_names(&["Chores"]).unwrap().id());
    assert!(chores.payload().is_none());
}

#[test]
fn given_matched_section_with_payload_when_rebuilding_then_old_payload_kept() {
    let first = Reconciler::default().sections(
        None,
        vec![ItemDescriptor::new("Sweep")
            .in_section("Chores")
            .with_section_payload(notes("old"))],
    );

    let after = Reconciler::default().sections(
        Some(&first),
        vec![ItemDescriptor::new("Dust")
            .in_section("Chores")
            .with_section_payload(notes("new"))],
    );

    let chores = after.find_by_names(&["Chores"]).unwrap();
    assert_eq!(chores.payload(), Some(&notes("old")));
    assert!(Arc::ptr_eq(
        chores.payload_handle().unwrap(),
        first.find_by_names(&["Chores"]).unwrap().payload_handle().unwrap()
    ));
}

// ============================================================
// Full-tree reconciliation
// ============================================================

#[test]
fn given_nested_tree_when_reconciling_then_matched_nodes_keep_identity_and_selection() {
    init_test_setup();
    let before = build::<Props>(
        NodeConfig::new("Todo")
            .with_child(
                NodeConfig::new("Homework")
                    .with_payload(notes("school"))
                    .with_child(NodeConfig::new("Math").with_selected(true))
                    .with_child(
                        NodeConfig::new("English").with_child(NodeConfig::new("Essay")),
                    ),
            )
            .with_child(NodeConfig::new("Chores")),
    );
    let math = before.find_by_names(&["Homework", "Math"]).unwrap().id();
    let homework = before.find_by_names(&["Homework"]).unwrap().id();

    let after = Reconciler::default().tree(
        Some(&before),
        NodeConfig::new("Todo").with_child(
            NodeConfig::new("Homework")
                .with_child(NodeConfig::new("History"))
                .with_child(NodeConfig::new("Math"))
                .with_child(NodeConfig::new("English").with_child(NodeConfig::new("Essay"))),
        ),
    );

    assert_eq!(after.root().id(), before.root().id());
    let homework_after = after.find_by_names(&["Homework"]).unwrap();
    assert_eq!(homework_after.id(), homework);
    assert_eq!(homework_after.payload(), Some(&notes("school")));
    let math_after = after.find_by_names(&["Homework", "Math"]).unwrap();
    assert_eq!(math_after.id(), math);
    assert!(math_after.selected());
    assert_eq!(math_after.parent_id(), Some(homework));
    assert!(!after.find_by_names(&["Homework", "History"]).unwrap().selected());
    assert!(after.find_by_names(&["Chores"]).is_none());
    assert!(homework_after.is_indeterminate());
}

#[test]
fn given_different_root_name_when_reconciling_then_fresh_tree() {
    let before = build::<Props>(NodeConfig::new("A").with_selected(true));

    let after = reduce(&before, Request::Reconcile(NodeConfig::new("B")));

    assert_ne!(after.root().id(), before.root().id());
    assert!(!after.root().selected());
}
