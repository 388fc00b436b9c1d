//! Property tests over random trees and random single-node requests

use std::sync::Arc;

use proptest::prelude::*;

use checktree::domain::{build, reduce, CheckState, Node, NodeConfig, NodeId, Request, Snapshot};

#[derive(Debug, Clone)]
enum Op {
    Toggle,
    SetSelected(bool),
    SetPayload(Option<u8>),
    SetName(String),
    AddChild(bool),
    SetChildren(Vec<bool>),
    Remove,
}

impl Op {
    fn into_request(self, target: NodeId) -> Request<u8> {
        match self {
            Op::Toggle => Request::Toggle(target),
            Op::SetSelected(selected) => Request::SetSelected { target, selected },
            Op::SetPayload(payload) => Request::SetPayload { target, payload },
            Op::SetName(name) => Request::SetName { target, name },
            Op::AddChild(selected) => Request::AddChild {
                target,
                child: NodeConfig::new("added").with_selected(selected),
            },
            Op::SetChildren(flags) => Request::SetChildren {
                target,
                children: flags
                    .into_iter()
                    .map(|selected| NodeConfig::new("fresh").with_selected(selected))
                    .collect(),
            },
            Op::Remove => Request::Remove(target),
        }
    }

    /// Requests that leave the target's own children untouched.
    fn keeps_children(&self) -> bool {
        matches!(self, Op::SetPayload(_) | Op::SetName(_))
    }
}

fn arb_config() -> impl Strategy<Value = NodeConfig<u8>> {
    let leaf = (any::<bool>(), any::<u8>()).prop_map(|(selected, payload)| {
        NodeConfig::new(format!("n{}", payload % 4))
            .with_selected(selected)
            .with_payload(payload)
    });
    leaf.prop_recursive(4, 64, 4, |inner| {
        (any::<bool>(), prop::collection::vec(inner, 1..5)).prop_map(|(selected, children)| {
            NodeConfig::new("group")
                .with_selected(selected)
                .with_children(children)
        })
    })
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Toggle),
        any::<bool>().prop_map(Op::SetSelected),
        any::<Option<u8>>().prop_map(Op::SetPayload),
        "[a-z]{1,6}".prop_map(Op::SetName),
        any::<bool>().prop_map(Op::AddChild),
        prop::collection::vec(any::<bool>(), 0..4).prop_map(Op::SetChildren),
        Just(Op::Remove),
    ]
}

fn pick(snapshot: &Snapshot<u8>, index: prop::sample::Index) -> NodeId {
    let ids: Vec<NodeId> = snapshot.iter().map(|(_, node)| node.id()).collect();
    ids[index.index(ids.len())]
}

fn leaf_flags(node: &Node<u8>) -> Vec<bool> {
    if node.is_leaf() {
        vec![node.selected()]
    } else {
        node.children().iter().flat_map(|child| leaf_flags(child)).collect()
    }
}

fn check_tri_state_laws(snapshot: &Snapshot<u8>) -> Result<(), TestCaseError> {
    for (_, node) in snapshot.iter() {
        if node.is_leaf() {
            prop_assert_eq!(node.is_all_selected(), node.selected());
        }
        prop_assert!(!(node.is_indeterminate() && node.is_all_selected()));
        prop_assert_eq!(
            node.is_any_selected(),
            leaf_flags(node).into_iter().any(|selected| selected)
        );
        prop_assert_eq!(node.selected(), node.is_all_selected());
    }
    Ok(())
}

/// Every subtree hanging off the root-to-target path is the same allocation
/// in both snapshots.
fn check_off_path_shared(
    before: &Snapshot<u8>,
    after: &Snapshot<u8>,
    path: &[usize],
    removed: bool,
) -> Result<(), TestCaseError> {
    for level in 0..path.len() {
        let old_parent = before.node_at(&path[..level]).unwrap();
        let new_parent = after.node_at(&path[..level]).unwrap();
        let on_path = path[level];
        let removed_here = removed && level + 1 == path.len();

        for (index, old_child) in old_parent.children().iter().enumerate() {
            if index == on_path {
                continue;
            }
            let new_index = if removed_here && index > on_path {
                index - 1
            } else {
                index
            };
            prop_assert!(Arc::ptr_eq(old_child, &new_parent.children()[new_index]));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn given_random_tree_when_building_then_tri_state_laws_hold(config in arb_config()) {
        let snapshot = build(config);
        check_tri_state_laws(&snapshot)?;
    }

    #[test]
    fn given_random_request_when_reducing_then_laws_hold_and_off_path_subtrees_shared(
        config in arb_config(),
        index in any::<prop::sample::Index>(),
        op in arb_op(),
    ) {
        let before = build(config);
        let target = pick(&before, index);
        let path = before.path_to(target).unwrap();
        let keeps_children = op.keeps_children();
        let removing = matches!(op, Op::Remove);

        let after = reduce(&before, op.into_request(target));

        check_tri_state_laws(&after)?;
        check_tri_state_laws(&before)?;
        if removing && path.is_empty() {
            prop_assert!(after.ptr_eq(&before));
            return Ok(());
        }
        check_off_path_shared(&before, &after, &path, removing)?;
        if keeps_children {
            let old_target = before.find(target).unwrap();
            let new_target = after.find(target).unwrap();
            for (old_child, new_child) in old_target.children().iter().zip(new_target.children()) {
                prop_assert!(Arc::ptr_eq(old_child, new_child));
            }
        }
    }

    #[test]
    fn given_random_node_when_toggling_then_cascade_follows_prior_state(
        config in arb_config(),
        index in any::<prop::sample::Index>(),
    ) {
        let before = build(config);
        let target = pick(&before, index);
        let prior = before.find(target).unwrap().check_state();

        let after = reduce(&before, Request::Toggle(target));

        let node = after.find(target).unwrap();
        match prior {
            CheckState::Checked => {
                prop_assert!(!node.is_any_selected());
                prop_assert!(leaf_flags(node).into_iter().all(|selected| !selected));
            }
            CheckState::Unchecked | CheckState::Indeterminate => {
                prop_assert!(node.is_all_selected());
            }
        }
    }
}
