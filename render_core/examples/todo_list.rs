// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! A todo list, rendered into an in-memory backend.
//!
//! Event handlers are simulated by keeping hold of the list's [`StateHandle`], and the
//! mutations of each pass are printed along with the resulting tree.

use std::cell::RefCell;
use std::rc::Rc;

use render_core::kurbo::Size;
use render_core::tracing_backend::try_init_tracing;
use render_core::{
    Capabilities, Component, Describe, Hierarchy, ReconcileReport, RenderCtx, StateHandle,
};
use render_testing::{
    FixedLayout, RecordingBackend, TestLayout, TestNode, button, label, scroll, stack, table,
};

#[derive(Clone, Debug, Default)]
struct Todo {
    id: u32,
    title: String,
    done: bool,
}

#[derive(Debug, Default)]
struct Todos {
    next_id: u32,
    items: Vec<Todo>,
}

impl Todos {
    fn add(&mut self, title: &str) {
        self.items.push(Todo {
            id: self.next_id,
            title: title.to_owned(),
            done: false,
        });
        self.next_id += 1;
    }

    fn toggle(&mut self, id: u32) {
        if let Some(todo) = self.items.iter_mut().find(|todo| todo.id == id) {
            todo.done = !todo.done;
        }
    }
}

impl Describe for Todos {
    fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("items".to_owned(), self.items.len().to_string()),
            (
                "done".to_owned(),
                self.items.iter().filter(|todo| todo.done).count().to_string(),
            ),
        ]
    }
}

/// The title bar, which never changes.
struct Header;

impl Component<RecordingBackend> for Header {
    type State = ();
    const CAPABILITIES: Capabilities = Capabilities::STATIC;

    fn render(&self, _: &StateHandle<()>, _: &mut RenderCtx<'_>) -> TestNode {
        stack()
            .with_layout(TestLayout::Sized(Size::new(400., 44.)))
            .with_child(label("Todos"))
            .with_child(button("Clear done"))
    }
}

type Handlers = Rc<RefCell<Option<StateHandle<Todos>>>>;

/// The list itself, keyed by todo id.
struct TodoList {
    handlers: Handlers,
}

impl Component<RecordingBackend> for TodoList {
    type State = Todos;
    const CAPABILITIES: Capabilities = Capabilities::STATEFUL;

    fn render(&self, state: &StateHandle<Todos>, _: &mut RenderCtx<'_>) -> TestNode {
        *self.handlers.borrow_mut() = Some(state.clone());
        state.with(|todos| {
            table().with_children(todos.items.iter().map(|todo| {
                let mark = if todo.done { "[x]" } else { "[ ]" };
                label(format!("{mark} {}", todo.title))
                    .with_key(format!("todo-{}", todo.id))
                    .with_layout(TestLayout::Sized(Size::new(400., 32.)))
            }))
        })
    }
}

fn print_pass(title: &str, report: Option<&ReconcileReport>) {
    match report {
        Some(report) => println!(
            "{title}: {} created, {} destroyed, {} configured, {} moved",
            report.created, report.destroyed, report.configured, report.moved
        ),
        None => println!("{title}: nothing to do"),
    }
}

fn main() {
    let _ = try_init_tracing();

    let handlers = Handlers::default();
    let backend = RecordingBackend::new();
    let recording = backend.recording();
    let root = backend.root();
    let mut hierarchy = Hierarchy::new(
        backend,
        FixedLayout::new(),
        root,
        Size::new(400., 800.),
        {
            let handlers = handlers.clone();
            move |ctx: &mut RenderCtx<'_>| {
                let header = ctx.component::<RecordingBackend, _>(Some("header"), &Header);
                let list = ctx.component::<RecordingBackend, _>(
                    Some("todos"),
                    &TodoList {
                        handlers: handlers.clone(),
                    },
                );
                scroll().with_child(header).with_child(list)
            }
        },
    );

    let report = hierarchy.run_pending().expect("the first pass should succeed");
    print_pass("mount", report);

    let Some(todos) = handlers.borrow().clone() else {
        return;
    };
    todos.update(|todos| {
        todos.add("Write the reconciler");
        todos.add("Test the reconciler");
        todos.add("Ship it");
    });
    print_pass("add three", hierarchy.run_pending().expect("pass should succeed"));

    todos.update(|todos| {
        todos.toggle(0);
        todos.items.reverse();
    });
    print_pass("toggle and reverse", hierarchy.run_pending().expect("pass should succeed"));

    // Nothing changed, so nothing runs.
    print_pass("idle", hierarchy.run_pending().expect("pass should succeed"));

    hierarchy.set_constraint(Size::new(320., 480.));
    print_pass("resize", hierarchy.run_pending().expect("pass should succeed"));

    println!("{} backend calls recorded", recording.len());
    println!("state: {:?}", hierarchy.registry().describe("todos"));
    if let Some(retained) = hierarchy.retained() {
        match retained.describe().to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("couldn't describe the tree: {err}"),
        }
    }
}
