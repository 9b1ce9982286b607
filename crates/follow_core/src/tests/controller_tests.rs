use super::*;

use std::{cell::RefCell, collections::HashSet, rc::Rc};

use shared::domain::{FrameInfo, ViewSize};

const SELF: FrameId = FrameId(0);
const VIEW: ViewSize = ViewSize {
    width: 1280,
    height: 720,
};

/// Records every send instead of delivering it.
#[derive(Clone)]
struct TestTree {
    children: Vec<FrameInfo>,
    sent: Rc<RefCell<Vec<(FrameId, Envelope)>>>,
}

impl TestTree {
    fn with_children(count: usize) -> Self {
        let children = (1..=count as u64)
            .map(|id| FrameInfo {
                frame: FrameId(id),
                position: FramePosition {
                    x: 40.0 * id as f64,
                    y: 120.0,
                },
            })
            .collect();
        Self {
            children,
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn take_sent(&self) -> Vec<(FrameId, Envelope)> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl ContextTree for TestTree {
    fn view_size(&self) -> ViewSize {
        VIEW
    }

    fn self_frame(&self) -> FrameId {
        SELF
    }

    fn child_frames(&self) -> Vec<FrameInfo> {
        self.children.clone()
    }

    fn send_to(&self, target: FrameId, envelope: &Envelope) {
        self.sent.borrow_mut().push((target, envelope.clone()));
    }
}

fn enabled_controller(children: usize) -> (FollowController<TestTree>, TestTree) {
    let tree = TestTree::with_children(children);
    let mut controller = FollowController::new(tree.clone());
    controller
        .on_message(Envelope::Start { new_tab: false }, SELF)
        .expect("start never fails");
    (controller, tree)
}

fn labels_of(envelope: &Envelope) -> Vec<String> {
    match envelope {
        Envelope::CreateHints { keys_array, .. } => keys_array.clone(),
        other => panic!("expected create-hints, got {other:?}"),
    }
}

#[test]
fn enable_requests_counts_from_self_and_direct_children() {
    let (_, tree) = enabled_controller(2);
    let sent = tree.take_sent();

    assert_eq!(sent.len(), 3, "one request per frame, nothing deeper");
    assert_eq!(
        sent[0],
        (
            SELF,
            Envelope::RequestCountTargets {
                view_size: VIEW,
                frame_position: FramePosition::ORIGIN,
            }
        )
    );
    assert_eq!(
        sent[1],
        (
            FrameId(1),
            Envelope::RequestCountTargets {
                view_size: VIEW,
                frame_position: FramePosition { x: 40.0, y: 120.0 },
            }
        )
    );
    assert_eq!(
        sent[2],
        (
            FrameId(2),
            Envelope::RequestCountTargets {
                view_size: VIEW,
                frame_position: FramePosition { x: 80.0, y: 120.0 },
            }
        )
    );
}

#[test]
fn count_reply_is_answered_with_exact_label_slice() {
    let (mut controller, tree) = enabled_controller(0);
    tree.take_sent();

    controller
        .on_message(Envelope::ResponseCountTargets { count: 3 }, SELF)
        .expect("activation is live");

    let sent = tree.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, SELF);
    assert_eq!(labels_of(&sent[0].1), ["a", "b", "c"]);
    assert_eq!(controller.keys(), ["a", "b", "c"]);
}

#[test]
fn create_hints_carries_new_tab_flag() {
    let tree = TestTree::with_children(0);
    let mut controller = FollowController::new(tree.clone());
    controller
        .on_message(Envelope::Start { new_tab: true }, SELF)
        .expect("start never fails");
    tree.take_sent();

    controller
        .on_message(Envelope::ResponseCountTargets { count: 1 }, SELF)
        .expect("activation is live");

    let sent = tree.take_sent();
    match &sent[0].1 {
        Envelope::CreateHints { new_tab, .. } => assert!(*new_tab),
        other => panic!("expected create-hints, got {other:?}"),
    }
}

#[test]
fn reversed_reply_order_still_partitions_disjointly() {
    let (mut controller, tree) = enabled_controller(2);
    tree.take_sent();

    // Second child answers first; arrival order is arbitrary.
    controller
        .on_message(Envelope::ResponseCountTargets { count: 2 }, FrameId(2))
        .expect("activation is live");
    controller
        .on_message(Envelope::ResponseCountTargets { count: 2 }, FrameId(1))
        .expect("activation is live");

    let sent = tree.take_sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, FrameId(2));
    assert_eq!(labels_of(&sent[0].1), ["a", "b"]);
    assert_eq!(sent[1].0, FrameId(1));
    assert_eq!(labels_of(&sent[1].1), ["c", "d"]);

    let all: Vec<String> = sent.iter().flat_map(|(_, env)| labels_of(env)).collect();
    let distinct: HashSet<&String> = all.iter().collect();
    assert_eq!(distinct.len(), 4, "slices never overlap");
    assert_eq!(controller.keys(), ["a", "b", "c", "d"]);
}

#[test]
fn unique_prefix_match_autocommits_then_tears_down() {
    let (mut controller, tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 3 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    assert!(controller.key_press("b"));

    let sent = tree.take_sent();
    let kinds: Vec<&Envelope> = sent.iter().map(|(_, env)| env).collect();
    assert_eq!(
        kinds,
        [
            &Envelope::Activate { keys: "b".into() },
            &Envelope::ShowHints { keys: "b".into() },
            &Envelope::RemoveHints,
        ],
        "commit wins, but the show update still goes out before teardown"
    );
    assert!(!controller.state().enabled);
    assert!(controller.keys().is_empty());
}

#[test]
fn ambiguous_prefix_only_updates_hints() {
    let (mut controller, tree) = enabled_controller(0);
    // 30 targets: a..z plus aa, ab, ac, ad.
    controller
        .on_message(Envelope::ResponseCountTargets { count: 30 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    controller.key_press("a");

    let sent = tree.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, Envelope::ShowHints { keys: "a".into() });
    assert!(controller.state().enabled, "five candidates remain");
}

#[test]
fn prefix_filter_matches_on_full_label_strings() {
    let (mut controller, _tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 30 }, SELF)
        .expect("activation is live");

    let visible: Vec<&String> = controller
        .keys()
        .iter()
        .filter(|k| k.starts_with("a"))
        .collect();
    assert_eq!(visible, ["a", "aa", "ab", "ac", "ad"]);
}

#[test]
fn enter_commits_with_current_prefix() {
    let (mut controller, tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 2 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    controller.key_press("Enter");

    let sent = tree.take_sent();
    assert_eq!(sent[0].1, Envelope::Activate { keys: "".into() });
    assert_eq!(sent[1].1, Envelope::RemoveHints);
    assert!(!controller.state().enabled);
}

#[test]
fn escape_cancels_without_activate() {
    let (mut controller, tree) = enabled_controller(1);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 2 }, FrameId(1))
        .expect("activation is live");
    tree.take_sent();

    controller.key_press("Escape");

    let sent = tree.take_sent();
    let removals = sent
        .iter()
        .filter(|(_, env)| matches!(env, Envelope::RemoveHints))
        .count();
    assert_eq!(removals, 2, "one removal broadcast, self plus one child");
    assert!(
        !sent.iter().any(|(_, env)| matches!(env, Envelope::Activate { .. })),
        "cancel never activates"
    );
    assert!(controller.keys().is_empty());
}

#[test]
fn late_count_reply_is_rejected_loudly() {
    let (mut controller, tree) = enabled_controller(1);
    controller.key_press("Escape");
    tree.take_sent();

    let result = controller.on_message(Envelope::ResponseCountTargets { count: 2 }, FrameId(1));

    assert_eq!(result, Err(FollowError::NoActiveActivation));
    assert!(tree.take_sent().is_empty(), "no labels for a dead activation");
    assert!(controller.keys().is_empty());
}

#[test]
fn stray_reply_before_any_activation_is_rejected() {
    let tree = TestTree::with_children(0);
    let mut controller = FollowController::new(tree.clone());

    let result = controller.on_message(Envelope::ResponseCountTargets { count: 1 }, SELF);

    assert_eq!(result, Err(FollowError::NoActiveActivation));
    assert!(tree.take_sent().is_empty());
}

#[test]
fn alphabet_key_updates_typed_prefix() {
    let (mut controller, tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 30 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    assert!(controller.key_press("z"));

    assert_eq!(controller.state().keys, "z");
    let sent = tree.take_sent();
    assert_eq!(sent[0].1, Envelope::ShowHints { keys: "z".into() });
}

#[test]
fn keys_outside_the_alphabet_are_handled_but_inert() {
    let (mut controller, tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 3 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    assert!(controller.key_press("1"));
    assert!(controller.key_press("Shift"));

    assert_eq!(controller.state().keys, "");
    assert!(tree.take_sent().is_empty(), "no action, no broadcast");
}

#[test]
fn backspace_and_delete_shorten_prefix_via_the_store() {
    let (mut controller, tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 30 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    controller.key_press("a");
    controller.key_press("Backspace");
    assert_eq!(controller.state().keys, "");

    controller.key_press("a");
    controller.key_press("Delete");
    assert_eq!(controller.state().keys, "");

    let shows: Vec<String> = tree
        .take_sent()
        .into_iter()
        .filter_map(|(_, env)| match env {
            Envelope::ShowHints { keys } => Some(keys),
            _ => None,
        })
        .collect();
    assert_eq!(shows, ["a", "", "a", ""]);
    assert!(controller.state().enabled);
}

#[test]
fn key_press_messages_reach_the_dispatch_table() {
    let (mut controller, tree) = enabled_controller(0);
    controller
        .on_message(Envelope::ResponseCountTargets { count: 30 }, SELF)
        .expect("activation is live");
    tree.take_sent();

    controller
        .on_message(Envelope::KeyPress { key: "a".into() }, SELF)
        .expect("key-press never fails");

    assert_eq!(controller.state().keys, "a");
}
