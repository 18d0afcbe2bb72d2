// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Conditional children, expressed with nil markers, toggled at every position.

mod common;

use common::*;
use render_testing::{TestNode, button, label, stack};

const SLOTS: usize = 4;

/// Labels in every slot but `position`, which holds a button if `present`.
fn with_optional(position: usize, present: bool) -> TestNode {
    stack().with_children((0..SLOTS).map(|slot| {
        if slot == position {
            present.then(|| button("x"))
        } else {
            Some(label(format!("{slot}")))
        }
    }))
}

fn expected_texts(position: usize, present: bool) -> Vec<String> {
    (0..SLOTS)
        .filter_map(|slot| {
            if slot == position {
                present.then(|| "x".to_owned())
            } else {
                Some(format!("{slot}"))
            }
        })
        .collect()
}

#[test]
fn inserting_at_every_position() {
    for position in 0..SLOTS {
        let mut fixture = Fixture::mounted(with_optional(position, false));
        let before = fixture.child_elements();

        let report = fixture.render(with_optional(position, true));

        assert_eq!(fixture.texts(), expected_texts(position, true), "at {position}");
        assert_eq!(creates(&fixture.recording), 1, "at {position}");
        assert_eq!(destroys(&fixture.recording), 0, "at {position}");
        assert_eq!(reorders(&fixture.recording), 0, "at {position}");
        assert_eq!(report.configured, 1, "at {position}");

        let mut after = fixture.child_elements();
        after.remove(position);
        assert_eq!(after, before, "at {position}");
    }
}

#[test]
fn removing_at_every_position() {
    for position in 0..SLOTS {
        let mut fixture = Fixture::mounted(with_optional(position, true));
        let mut before = fixture.child_elements();
        let removed = before.remove(position);

        fixture.render(with_optional(position, false));

        assert_eq!(fixture.texts(), expected_texts(position, false), "at {position}");
        assert_eq!(creates(&fixture.recording), 0, "at {position}");
        assert_eq!(destroys(&fixture.recording), 1, "at {position}");
        assert_eq!(reorders(&fixture.recording), 0, "at {position}");
        assert!(!fixture.backend().is_alive(removed), "at {position}");
        assert_eq!(fixture.child_elements(), before, "at {position}");
    }
}

#[test]
fn toggling_repeatedly_keeps_order() {
    let mut fixture = Fixture::new();
    for pass in 0..6 {
        let position = pass % SLOTS;
        let present = pass % 2 == 0;
        fixture.render(with_optional(position, present));
        assert_eq!(fixture.texts(), expected_texts(position, present), "pass {pass}");
    }
}

#[test]
fn emptying_and_refilling_children() {
    let all = |present: bool| {
        stack().with_children((0..3).map(|i| present.then(|| label(format!("{i}")))))
    };
    let mut fixture = Fixture::mounted(all(true));

    let report = fixture.render(all(false));
    assert_eq!(report.destroyed, 3);
    assert!(fixture.texts().is_empty());

    let report = fixture.render(all(true));
    assert_eq!(report.created, 3);
    assert_eq!(fixture.texts(), ["0", "1", "2"]);
    assert_eq!(reorders(&fixture.recording), 0);
}

#[test]
fn nil_markers_never_reach_the_backend() {
    let fixture = Fixture::mounted(stack().with_children([
        TestNode::nil(),
        label("a"),
        TestNode::nil(),
        TestNode::nil(),
        label("b"),
    ]));
    assert_eq!(fixture.texts(), ["a", "b"]);
    assert_eq!(fixture.retained().children().len(), 2);
    let keys: Vec<_> = fixture
        .retained()
        .children()
        .iter()
        .map(|child| child.effective_key().to_owned())
        .collect();
    assert_eq!(keys, ["Label#1", "Label#4"]);
}
