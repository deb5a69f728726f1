use std::{
    any::TypeId,
    cell::{Cell, Ref, RefCell, RefMut},
    rc::{Rc, Weak},
};

use shared::{ActionMode, MvcError, MvcResult, WindowId};
use tracing::{info, warn};

use crate::{
    args::ActionArgs,
    bag::DataBag,
    catalog::{Catalog, TypeKind},
    config::MvcSettings,
    controller::{Controller, ControllerRef, ENTRY_ACTION},
    dispatch::{self, DispatchOutcome, DispatchRequest},
    registry::{ViewInstanceRegistry, Window},
    view::View,
};

/// The host windowing system.
pub trait Toolkit {
    /// Number of top-level windows currently open.
    fn open_windows(&self) -> usize;

    /// First open window able to host child windows.
    fn mdi_container(&self) -> Option<Window>;

    /// Shows `window` without blocking, inside `parent` when given.
    fn show(&self, window: &Window, parent: Option<&Window>);

    fn activate(&self, window: &Window);

    /// Shows `window` modally and blocks until it is dismissed.
    fn show_modal(&self, window: &Window) -> ActionMode;

    /// Runs `window` as the application's main window until the application exits.
    fn run(&self, window: &Window);
}

struct AppInner {
    settings: MvcSettings,
    catalog: Catalog,
    registry: RefCell<ViewInstanceRegistry>,
    toolkit: Rc<dyn Toolkit>,
    next_window: Cell<i64>,
}

/// Application context shared by every controller, binder and window.
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

/// Non-owning handle held by binders and close handlers.
#[derive(Clone)]
pub struct WeakApp {
    inner: Weak<AppInner>,
}

impl WeakApp {
    pub fn upgrade(&self) -> Option<App> {
        self.inner.upgrade().map(|inner| App { inner })
    }
}

impl App {
    pub fn builder(settings: MvcSettings, toolkit: Rc<dyn Toolkit>) -> AppBuilder {
        AppBuilder {
            catalog: Catalog::new(&settings.controller_suffix),
            settings,
            toolkit,
            errors: Vec::new(),
        }
    }

    pub fn settings(&self) -> &MvcSettings {
        &self.inner.settings
    }

    pub fn toolkit(&self) -> Rc<dyn Toolkit> {
        Rc::clone(&self.inner.toolkit)
    }

    pub fn registry(&self) -> Ref<'_, ViewInstanceRegistry> {
        self.inner.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, ViewInstanceRegistry> {
        self.inner.registry.borrow_mut()
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Live windows of `view`, oldest first.
    pub fn instances(&self, view: &str) -> Vec<Window> {
        self.registry().instances(view)
    }

    /// Catalog name registered for `name`, ignoring case. Controllers resolve
    /// with or without their suffix.
    pub fn resolve(&self, name: &str, kind: TypeKind) -> Option<&'static str> {
        self.inner.catalog.resolve(name, kind)
    }

    /// A new instance of the controller named `name`.
    pub fn controller(&self, name: &str) -> MvcResult<ControllerRef> {
        self.inner
            .catalog
            .controller(name)
            .map(|entry| entry.create())
            .ok_or_else(|| MvcError::ControllerNotFound(name.to_string()))
    }

    pub fn controller_of<C: Controller>(&self) -> MvcResult<ControllerRef> {
        self.inner
            .catalog
            .controller_of(TypeId::of::<C>())
            .map(|entry| entry.create())
            .ok_or_else(|| MvcError::ControllerNotFound(C::NAME.to_string()))
    }

    pub fn dispatch(
        &self,
        controller: &ControllerRef,
        action: &str,
        args: ActionArgs,
        request: DispatchRequest,
        bag: &mut DataBag,
    ) -> MvcResult<DispatchOutcome> {
        dispatch::dispatch(self, controller, action, args, request, bag)
    }

    /// Runs the entry action of controller `C` as the first window.
    pub fn start<C: Controller>(&self, args: ActionArgs) -> MvcResult<DispatchOutcome> {
        let controller = self.controller_of::<C>()?;
        self.start_with(&controller, args)
    }

    /// Runs the entry action of the first configured default controller that exists.
    pub fn run_default(&self, args: ActionArgs) -> MvcResult<DispatchOutcome> {
        let controller = self
            .inner
            .settings
            .default_controllers
            .iter()
            .find_map(|name| self.controller(name).ok())
            .ok_or_else(|| {
                MvcError::ControllerNotFound(self.inner.settings.default_controllers.join(", "))
            })?;
        self.start_with(&controller, args)
    }

    fn start_with(&self, controller: &ControllerRef, args: ActionArgs) -> MvcResult<DispatchOutcome> {
        info!(controller = controller.name(), "starting application");
        let mut bag = DataBag::new();
        dispatch::dispatch(
            self,
            controller,
            ENTRY_ACTION,
            args,
            DispatchRequest::first_window(),
            &mut bag,
        )
    }

    pub(crate) fn next_window_id(&self) -> WindowId {
        let id = self.inner.next_window.get() + 1;
        self.inner.next_window.set(id);
        WindowId(id)
    }

    pub fn downgrade(&self) -> WeakApp {
        WeakApp {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &App) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Collects the controllers and views of an application.
pub struct AppBuilder {
    settings: MvcSettings,
    catalog: Catalog,
    toolkit: Rc<dyn Toolkit>,
    errors: Vec<MvcError>,
}

impl AppBuilder {
    pub fn controller<C: Controller>(mut self) -> Self {
        if let Err(err) = self.catalog.add_controller::<C>() {
            warn!(controller = C::NAME, error = %err, "controller rejected");
            self.errors.push(err);
        }
        self
    }

    pub fn view<V: View + Default>(mut self) -> Self {
        self.catalog.add_view::<V>();
        self
    }

    pub fn partial<P: View>(mut self) -> Self {
        self.catalog.add_partial::<P>();
        self
    }

    /// Registers a plain window that has no binder contract.
    pub fn window(mut self, name: &'static str) -> Self {
        self.catalog.add_window(name);
        self
    }

    pub fn build(self) -> MvcResult<App> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        info!(
            controllers = self.catalog.controller_count(),
            views = self.catalog.view_count(),
            fallback = %self.settings.action_name_fallback,
            "application context built"
        );
        Ok(App {
            inner: Rc::new(AppInner {
                settings: self.settings,
                catalog: self.catalog,
                registry: RefCell::new(ViewInstanceRegistry::new()),
                toolkit: self.toolkit,
                next_window: Cell::new(0),
            }),
        })
    }
}
