use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use shared::{fields, ActionMode, Field, Model, MvcResult};

use super::*;
use crate::{
    app::{App, Toolkit},
    binder::ViewBinder,
    config::MvcSettings,
};

#[derive(Debug, Clone, Default)]
struct Note {
    text: String,
}

impl Model for Note {
    const NAME: &'static str = "Note";

    fn fields() -> Vec<Field<Self>> {
        fields!(Note { text: String => "Text" })
    }
}

#[derive(Default)]
struct NoteView {
    binder: Option<Rc<ViewBinder<Note>>>,
    label: &'static str,
}

impl View for NoteView {
    type Model = Note;
    const NAME: &'static str = "Note";

    fn binder(&self) -> Option<Rc<ViewBinder<Note>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<Note>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, _mvc: &ViewBinder<Note>) -> MvcResult<()> {
        Ok(())
    }
}

struct NullToolkit;

impl Toolkit for NullToolkit {
    fn open_windows(&self) -> usize {
        1
    }

    fn mdi_container(&self) -> Option<Window> {
        None
    }

    fn show(&self, _window: &Window, _parent: Option<&Window>) {}

    fn activate(&self, _window: &Window) {}

    fn show_modal(&self, _window: &Window) -> ActionMode {
        ActionMode::Cancel
    }

    fn run(&self, _window: &Window) {}
}

fn app() -> App {
    App::builder(MvcSettings::default(), Rc::new(NullToolkit))
        .view::<NoteView>()
        .build()
        .expect("app")
}

fn window(app: &App, id: i64, label: &'static str) -> Window {
    let binder = ViewBinder::<Note>::new(app, NoteView::NAME, false);
    let view: Rc<RefCell<dyn DynView>> = Rc::new(RefCell::new(NoteView {
        binder: Some(Rc::clone(&binder)),
        label,
    }));
    Window::new(WindowId(id), NoteView::NAME, view, binder)
}

#[test]
fn windows_are_added_once_and_latest_is_newest() {
    let app = app();
    let mut registry = ViewInstanceRegistry::new();
    let first = window(&app, 1, "first");
    let second = window(&app, 2, "second");

    assert!(registry.add(&first));
    assert!(!registry.add(&first));
    assert!(registry.add(&second));

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.latest("Note").map(|w| w.id()), Some(WindowId(2)));
    assert_eq!(registry.latest("NOTE").map(|w| w.id()), Some(WindowId(2)));
    assert!(registry.contains(WindowId(1)));
}

#[test]
fn remove_drops_exactly_the_named_window() {
    let app = app();
    let mut registry = ViewInstanceRegistry::new();
    let first = window(&app, 1, "first");
    let second = window(&app, 2, "second");
    registry.add(&first);
    registry.add(&second);

    assert!(registry.remove("note", first.id()));
    assert!(!registry.remove("note", first.id()));
    assert_eq!(registry.instances("Note"), vec![second.clone()]);

    assert!(registry.remove("Note", second.id()));
    assert!(registry.is_empty());
    assert!(registry.latest("Note").is_none());
}

#[test]
fn close_handlers_run_exactly_once() {
    let app = app();
    let closed = Rc::new(Cell::new(0));
    let note = window(&app, 3, "note");
    let counter = Rc::clone(&closed);
    note.on_closed(move |_| counter.set(counter.get() + 1));

    note.notify_closed();
    note.notify_closed();

    assert!(note.is_closed());
    assert_eq!(closed.get(), 1);
}

#[test]
fn concrete_view_is_reachable_through_the_window() {
    let app = app();
    let note = window(&app, 4, "inspect me");

    assert_eq!(note.with_view::<NoteView, _>(|view| view.label), Some("inspect me"));
    assert_eq!(note.binder().view_name(), "Note");
    assert!(note.native().is_none());
}
