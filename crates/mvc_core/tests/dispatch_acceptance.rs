mod support;

use mvc_core::{
    args, ActionArgs, ActionMode, CreationMode, DataBag, DispatchRequest, DynBinder, ErrorKind,
    FallbackPolicy, HasText, MvcError, MvcSettings, ResultKind, Value, View,
};
use support::{EmpController, EmpView, FakeToolkit, SaveParams, NOTE};

fn plain(always_create: bool) -> DispatchRequest {
    DispatchRequest::new(CreationMode::Plain, always_create)
}

#[test]
fn unique_arity_match_is_invoked_and_type_errors_surface_at_invocation() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");

    let err = app
        .dispatch(&emp, "Rename", args![5], plain(false), &mut DataBag::new())
        .expect_err("int for a text parameter");

    assert_eq!(err.kind(), ErrorKind::ActionParamTypeMismatch);
    let err = app
        .dispatch(&emp, "Rename", args!["x", "y"], plain(false), &mut DataBag::new())
        .expect_err("wrong arity");
    assert!(matches!(err, MvcError::ActionNotFound { arity: 2, .. }));
}

#[test]
fn same_arity_overloads_need_an_exact_type_match() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();

    app.dispatch(&emp, "Pick", args![3], plain(false), &mut bag)
        .expect("int overload");
    app.dispatch(&emp, "Pick", args!["bo"], plain(false), &mut bag)
        .expect("text overload");
    let picked = emp
        .inspect(|c: &EmpController| c.picked.clone())
        .expect("controller");
    assert_eq!(picked, vec!["id:3", "name:bo"]);

    let float = app.dispatch(&emp, "Pick", args![1.5], plain(false), &mut bag);
    assert!(matches!(float, Err(MvcError::ActionAmbiguous { .. })));
    let null = app.dispatch(&emp, "Pick", args![Value::Null], plain(false), &mut bag);
    assert!(matches!(null, Err(MvcError::ActionAmbiguous { .. })));
}

#[test]
fn record_arguments_resolve_like_positional_ones() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();

    let record = ActionArgs::from_record(&SaveParams { id: 1, name: "x" });
    app.dispatch(&emp, "Save", record, plain(false), &mut bag)
        .expect("record args");
    app.dispatch(&emp, "Save", args![1, "x"], plain(false), &mut bag)
        .expect("positional args");

    let saved = emp
        .inspect(|c: &EmpController| c.saved.clone())
        .expect("controller");
    assert_eq!(saved, vec![(1, "x".to_string()), (1, "x".to_string())]);
}

#[test]
fn activate_or_create_reuses_the_latest_window() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();

    app.dispatch(&emp, "Show", ActionArgs::none(), plain(false), &mut bag)
        .expect("first");
    let first = app.instances("Emp");
    assert_eq!(first.len(), 1);
    let w1 = first[0].clone();

    app.dispatch(&emp, "Show", ActionArgs::none(), plain(false), &mut bag)
        .expect("second");
    assert_eq!(app.instances("Emp"), vec![w1.clone()]);
    assert_eq!(
        w1.with_view(|view: &EmpView| view.registrations.get()),
        Some(2)
    );

    app.dispatch(&emp, "Show", ActionArgs::none(), plain(true), &mut bag)
        .expect("third");
    let both = app.instances("Emp");
    assert_eq!(both.len(), 2);
    let w2 = both[1].clone();

    toolkit.close(&w1);
    assert_eq!(app.instances("Emp"), vec![w2.clone()]);
    assert!(toolkit
        .events()
        .contains(&format!("activate Emp {}", w1.id())));
}

#[test]
fn entry_action_activates_without_rebinding() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();

    app.dispatch(&emp, "Index", ActionArgs::none(), plain(false), &mut bag)
        .expect("create");
    app.dispatch(&emp, "Index", ActionArgs::none(), plain(false), &mut bag)
        .expect("activate");

    let windows = app.instances("Emp");
    assert_eq!(windows.len(), 1);
    assert_eq!(
        windows[0].with_view(|view: &EmpView| view.registrations.get()),
        Some(1)
    );
}

#[test]
fn entry_action_name_is_case_sensitive() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");

    let err = app
        .dispatch(&emp, "index", ActionArgs::none(), plain(false), &mut DataBag::new())
        .expect_err("only Index names the entry action");
    assert!(matches!(err, MvcError::ActionNotFound { arity: 0, .. }));
    assert!(app.instances("Emp").is_empty());
}

#[test]
fn mdi_children_open_inside_the_container() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let home = app.instances("Home").pop().expect("home window");
    toolkit.set_container(Some(home.clone()));
    let emp = app.controller("Emp").expect("emp");

    app.dispatch(
        &emp,
        "Show",
        ActionArgs::none(),
        DispatchRequest::new(CreationMode::MdiChild, false),
        &mut DataBag::new(),
    )
    .expect("child");

    let child = app.instances("Emp").pop().expect("child window");
    assert!(toolkit
        .events()
        .contains(&format!("show Emp {} in {}", child.id(), home.id())));
}

#[test]
fn dialog_returns_its_code_and_the_bag_it_wrote() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    toolkit.on_modal(|window| {
        let binder = window.binder();
        let mut bag = binder.bag();
        bag.insert(&NOTE, "from dialog".to_string());
        binder.set_bag(bag);
        ActionMode::Ok
    });
    let dlg = app.controller("Dlg").expect("dlg");
    let mut bag = DataBag::new();

    let outcome = app
        .dispatch(
            &dlg,
            "Index",
            ActionArgs::none(),
            DispatchRequest::new(CreationMode::Dialog, false),
            &mut bag,
        )
        .expect("dialog");

    assert_eq!(outcome.action_mode(), Some(ActionMode::Ok));
    assert_eq!(bag.get_cloned(&NOTE).as_deref(), Some("from dialog"));
    assert!(app.instances("Dlg").is_empty());
    let events = toolkit.events();
    assert_eq!(events.last().map(String::as_str), Some("modal closed ok"));
}

#[test]
fn dialog_sees_the_callers_bag() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    toolkit.on_modal(|window| match window.binder().bag().get_cloned(&NOTE) {
        Some(note) if note == "hello" => ActionMode::Yes,
        _ => ActionMode::No,
    });
    let dlg = app.controller("Dlg").expect("dlg");
    let mut bag = DataBag::new();
    bag.insert(&NOTE, "hello".to_string());

    let outcome = app
        .dispatch(
            &dlg,
            "Index",
            ActionArgs::none(),
            DispatchRequest::new(CreationMode::Dialog, false),
            &mut bag,
        )
        .expect("dialog");
    assert_eq!(outcome.action_mode(), Some(ActionMode::Yes));
}

#[test]
fn update_applies_every_field_but_the_failing_one() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    app.dispatch(&emp, "Show", ActionArgs::none(), plain(false), &mut DataBag::new())
        .expect("show");
    let window = app.instances("Emp").pop().expect("emp window");

    let save = window
        .with_view(|view: &EmpView| {
            view.id.set_text("not a number");
            view.name.set_text("Zed");
            view.save.clone()
        })
        .expect("emp view");
    save.click().expect("click");

    let updates = emp
        .inspect(|c: &EmpController| c.updates.clone())
        .expect("controller");
    assert_eq!(updates.len(), 1);
    let (applied, model) = &updates[0];
    assert!(!applied);
    assert_eq!(model.name, "Zed");
    assert_eq!(model.id, 0);
}

#[test]
fn redirect_to_a_dialog_returns_the_dialog_code() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    toolkit.on_modal(|window| {
        let binder = window.binder();
        let mut bag = binder.bag();
        bag.insert(&NOTE, "confirmed".to_string());
        binder.set_bag(bag);
        ActionMode::Ok
    });
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();

    let outcome = app
        .dispatch(
            &emp,
            "Confirm",
            ActionArgs::none(),
            DispatchRequest::new(CreationMode::Dialog, false),
            &mut bag,
        )
        .expect("confirm");

    assert_eq!(outcome.kind, ResultKind::Redirect);
    assert_eq!(outcome.action_mode(), Some(ActionMode::Ok));
    assert_eq!(bag.get_cloned(&NOTE).as_deref(), Some("confirmed"));
}

#[test]
fn partial_views_bind_inside_the_parent() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();
    app.dispatch(&emp, "Show", ActionArgs::none(), plain(false), &mut bag)
        .expect("show");

    let outcome = app
        .dispatch(&emp, "EditPartial", args![12], plain(false), &mut bag)
        .expect("partial");
    assert_eq!(outcome.kind, ResultKind::PartialView);

    let window = app.instances("Emp").pop().expect("emp window");
    let (text, bound) = window
        .with_view(|view: &EmpView| {
            let edit = view.edit.borrow();
            let bound = edit
                .binder()
                .and_then(|binder| binder.model())
                .map(|model| model.id);
            (edit.name.text(), bound)
        })
        .expect("emp view");
    assert_eq!(text, "emp 12");
    assert_eq!(bound, Some(12));

    app.dispatch(&emp, "EditPartial", args![13], plain(false), &mut bag)
        .expect("partial again");
    let edit = window
        .with_view(|view: &EmpView| view.edit.borrow().name.text())
        .expect("emp view");
    assert_eq!(edit, "emp 13");
}

#[test]
fn partial_views_dispatching_partials_rebind_in_their_host() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    let mut bag = DataBag::new();
    app.dispatch(&emp, "Show", ActionArgs::none(), plain(false), &mut bag)
        .expect("show");
    app.dispatch(&emp, "EditPartial", args![3], plain(false), &mut bag)
        .expect("partial");

    let window = app.instances("Emp").pop().expect("emp window");
    let partial = window
        .with_view(|view: &EmpView| view.edit.borrow().binder())
        .flatten()
        .expect("partial binder");
    assert!(partial.is_partial());

    partial
        .action("EditPartial", args![4])
        .expect("partial from partial");
    let text = window
        .with_view(|view: &EmpView| view.edit.borrow().name.text())
        .expect("emp view");
    assert_eq!(text, "emp 4");
}

#[test]
fn partial_view_without_a_parent_breaks_the_contract() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");

    let err = app
        .dispatch(&emp, "EditPartial", args![1], plain(false), &mut DataBag::new())
        .expect_err("no parent view");
    assert!(matches!(err, MvcError::ViewContractMissing { .. }));
}

#[test]
fn configuration_defects_are_fatal() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let mut bag = DataBag::new();

    let ghost = app.controller("GhostController").expect("ghost");
    let err = app
        .dispatch(&ghost, "Index", ActionArgs::none(), plain(false), &mut bag)
        .expect_err("no view");
    assert!(matches!(err, MvcError::ViewTypeNotFound { .. }));

    let legacy = app.controller("legacy").expect("legacy");
    let err = app
        .dispatch(&legacy, "Index", ActionArgs::none(), plain(false), &mut bag)
        .expect_err("plain window");
    assert!(matches!(err, MvcError::ViewContractMissing { .. }));

    let emp = app.controller("Emp").expect("emp");
    let err = app
        .dispatch(&emp, "Lost", ActionArgs::none(), plain(false), &mut bag)
        .expect_err("unknown redirect target");
    assert!(matches!(err, MvcError::ControllerNotFound(name) if name == "Nowhere"));

    let err = app
        .dispatch(&emp, "  ", ActionArgs::none(), plain(false), &mut bag)
        .expect_err("blank action");
    assert!(matches!(err, MvcError::Argument { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn case_insensitive_fallback_follows_the_policy() {
    let toolkit = FakeToolkit::new();
    let app = support::started(&toolkit);
    let emp = app.controller("Emp").expect("emp");
    app.dispatch(&emp, "show", ActionArgs::none(), plain(false), &mut DataBag::new())
        .expect("fallback allowed by default");

    let strict = FakeToolkit::new();
    let settings = MvcSettings {
        action_name_fallback: FallbackPolicy::Deny,
        ..MvcSettings::default()
    };
    let app = support::app_with(settings, &strict);
    let emp = app.controller("Emp").expect("emp");
    let err = app
        .dispatch(&emp, "show", ActionArgs::none(), plain(false), &mut DataBag::new())
        .expect_err("fallback denied");
    assert!(matches!(err, MvcError::ActionNotFound { .. }));
}

#[test]
fn bootstrap_runs_the_first_default_controller() {
    let toolkit = FakeToolkit::new();
    let app = support::app(&toolkit);

    let outcome = app
        .run_default(args!["--demo"])
        .expect("bootstrap");

    assert_eq!(outcome.kind, ResultKind::View);
    assert_eq!(outcome.action_mode(), None);
    let home = app.instances("Home").pop().expect("home window");
    assert_eq!(toolkit.events(), vec![format!("run Home {}", home.id())]);

    let missing = MvcSettings {
        default_controllers: vec!["Default".into(), "Main".into()],
        ..MvcSettings::default()
    };
    let app = support::app_with(missing, &FakeToolkit::new());
    assert!(matches!(
        app.run_default(ActionArgs::none()),
        Err(MvcError::ControllerNotFound(_))
    ));
}

#[test]
fn first_view_always_becomes_the_main_window() {
    let toolkit = FakeToolkit::new();
    let app = support::app(&toolkit);
    let dlg = app.controller("Dlg").expect("dlg");

    let outcome = app
        .dispatch(
            &dlg,
            "Index",
            ActionArgs::none(),
            DispatchRequest::new(CreationMode::Dialog, false),
            &mut DataBag::new(),
        )
        .expect("first window");

    assert_eq!(outcome.action_mode(), None);
    assert_eq!(app.instances("Dlg").len(), 1);
    assert!(toolkit.events()[0].starts_with("run Dlg"));
}
