use std::rc::Rc;

use shared::{ActionMode, CreationMode, MvcError, MvcResult};
use tracing::{debug, info};

use crate::{
    app::App,
    bag::{DataBag, ModeBag},
    catalog::{TypeKind, ViewFactory, ViewKind},
    controller::ControllerRef,
    registry::Window,
    result::{ActionResult, Payload, PartialViewResult, ViewResult},
};

/// Applies one action result to the view layer. Redirects and empty results
/// have already done their work.
pub(crate) fn apply(
    app: &App,
    controller: &ControllerRef,
    result: ActionResult,
    mode: &mut ModeBag,
    bag: &mut DataBag,
) -> MvcResult<()> {
    match result {
        ActionResult::View(view) => render_view(app, controller, view, mode, bag),
        ActionResult::PartialView(partial) => render_partial(app, controller, partial, bag),
        ActionResult::Redirect(_) | ActionResult::Empty => Ok(()),
    }
}

fn render_view(
    app: &App,
    controller: &ControllerRef,
    result: ViewResult,
    mode: &mut ModeBag,
    bag: &mut DataBag,
) -> MvcResult<()> {
    mode.dialog_result = ActionMode::NOT_A_DIALOG;
    let toolkit = app.toolkit();
    let creation = if toolkit.open_windows() == 0 {
        CreationMode::FirstWindow
    } else {
        mode.creation
    };

    let entry = app
        .catalog()
        .view(&result.view, TypeKind::View)
        .ok_or_else(|| MvcError::ViewTypeNotFound {
            tried: result.view.clone(),
        })?;
    let (name, create) = match entry.kind {
        ViewKind::View(create) => (entry.name, create),
        ViewKind::Window | ViewKind::Partial => {
            return Err(MvcError::view_contract(entry.name, "view has no binder contract"));
        }
    };
    info!(
        view = name,
        ?creation,
        always_create = mode.always_create,
        origin = ?result.origin,
        "rendering view"
    );

    match creation {
        CreationMode::FirstWindow => {
            let window = open(app, name, create, controller, &result.payload, bag)?;
            track(app, &window);
            toolkit.run(&window);
        }
        CreationMode::Dialog => {
            let window = open(app, name, create, controller, &result.payload, bag)?;
            let code = toolkit.show_modal(&window);
            window.notify_closed();
            mode.dialog_result = code.code();
            *bag = window.binder().bag();
            debug!(view = name, window = %window.id(), ?code, "dialog closed");
        }
        CreationMode::Plain | CreationMode::MdiChild => {
            let existing = if mode.always_create {
                None
            } else {
                app.registry().latest(name)
            };
            if let Some(window) = existing {
                if !result.origin.is_entry() {
                    rebind(app, &window, controller, &result.payload, bag)?;
                }
                debug!(view = name, window = %window.id(), rebound = !result.origin.is_entry(), "activating window");
                toolkit.activate(&window);
                return Ok(());
            }

            let window = open(app, name, create, controller, &result.payload, bag)?;
            track(app, &window);
            let container = match creation {
                CreationMode::MdiChild => toolkit.mdi_container(),
                _ => None,
            };
            toolkit.show(&window, container.as_ref());
        }
    }
    Ok(())
}

/// Creates and binds a new instance of the view.
fn open(
    app: &App,
    name: &'static str,
    create: ViewFactory,
    controller: &ControllerRef,
    payload: &Payload,
    bag: &DataBag,
) -> MvcResult<Window> {
    let view = create();
    let binder = view
        .borrow_mut()
        .bind_payload(app, payload, bag.clone(), controller, false)?;
    let window = Window::new(app.next_window_id(), name, view, Rc::clone(&binder));
    binder.set_window(window.id());
    info!(view = name, window = %window.id(), controller = controller.name(), "window created");
    Ok(window)
}

/// Registers `window` and deregisters exactly this instance when it closes.
fn track(app: &App, window: &Window) {
    app.registry_mut().add(window);
    let app = app.downgrade();
    window.on_closed(move |closed| {
        if let Some(app) = app.upgrade() {
            app.registry_mut().remove(closed.view_key(), closed.id());
        }
    });
}

fn rebind(
    app: &App,
    window: &Window,
    controller: &ControllerRef,
    payload: &Payload,
    bag: &DataBag,
) -> MvcResult<()> {
    let view = window.view();
    let mut view = view
        .try_borrow_mut()
        .map_err(|_| MvcError::view_contract(window.view_key(), "view is already being bound"))?;
    view.bind_payload(app, payload, bag.clone(), controller, false)?;
    Ok(())
}

fn render_partial(
    app: &App,
    controller: &ControllerRef,
    result: PartialViewResult,
    bag: &DataBag,
) -> MvcResult<()> {
    let mut parent = controller.binder().ok_or_else(|| {
        MvcError::view_contract(result.view.as_str(), "controller is not driving a parent view")
    })?;
    while parent.is_partial() {
        match parent.parent() {
            Some(host) => parent = host,
            None => break,
        }
    }
    let partial = parent.mounted_partial(&result.view).ok_or_else(|| {
        MvcError::view_contract(
            result.view.as_str(),
            format!("partial view is not mounted in {}", parent.view_name()),
        )
    })?;
    let mut view = partial
        .try_borrow_mut()
        .map_err(|_| MvcError::view_contract(result.view.as_str(), "partial view is already being bound"))?;
    let binder = view.bind_payload(app, &result.payload, bag.clone(), controller, true)?;
    binder.set_parent(Rc::downgrade(&parent));
    controller.set_binder(Rc::downgrade(&parent));
    debug!(view = %result.view, parent = parent.view_name(), "partial view rendered");
    Ok(())
}
