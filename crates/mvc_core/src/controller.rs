use std::{
    any::Any,
    cell::{RefCell, RefMut},
    rc::{Rc, Weak},
};

use shared::{ActionOrigin, Model, ModelType, ModelValue, MvcError, MvcResult};
use tracing::debug;

use crate::{
    action::{ActionSignature, ActionTable},
    app::App,
    args::ActionArgs,
    bag::{BagKey, DataBag, ModeBag},
    binder::DynBinder,
    catalog::TypeKind,
    redirect,
    resolver,
    result::{ActionResult, PartialViewResult, Payload, ViewResult},
    table::DataTable,
};

/// Arguments the default entry action received, when there were any.
pub const ENTRY_ARGS: BagKey<ActionArgs> = BagKey::new("mvc.entry_args");

pub const ENTRY_ACTION: &str = "Index";

/// A user controller. Actions are registered in [`Controller::actions`];
/// [`Controller::index`] is the entry action.
pub trait Controller: Default + 'static {
    /// Type name, ending with the configured suffix (`"EmpController"`).
    const NAME: &'static str;

    fn actions(table: &mut ActionTable<Self>);

    /// Entry action. The default keeps the arguments in the data bag and shows
    /// the controller's view.
    fn index(&mut self, cx: &mut ActionContext<'_>, args: ActionArgs) -> MvcResult<ActionResult> {
        if !args.is_empty() {
            cx.bag_mut().insert(&ENTRY_ARGS, args);
        }
        Ok(cx.view())
    }

    /// Namespace prefix for this controller's views (`"Admin/Staff"` or `"Admin.Staff"`).
    fn view_prefix() -> Option<&'static str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMeta {
    pub type_name: &'static str,
    /// View name derived from the type name: prefix plus the name without its suffix.
    pub view_name: String,
}

impl ControllerMeta {
    pub fn derive(
        type_name: &'static str,
        suffix: &str,
        prefix: Option<&str>,
    ) -> MvcResult<Self> {
        let base = type_name
            .strip_suffix(suffix)
            .filter(|base| !base.is_empty())
            .ok_or_else(|| MvcError::ControllerNameInvalid {
                name: type_name.to_string(),
                suffix: suffix.to_string(),
            })?;
        let prefix = prefix.map(normalize_prefix).unwrap_or_default();
        let view_name = if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{prefix}.{base}")
        };
        Ok(Self {
            type_name,
            view_name,
        })
    }

    /// Final segment of the view name.
    pub fn view_base(&self) -> &str {
        self.view_name
            .rsplit_once('.')
            .map_or(self.view_name.as_str(), |(_, base)| base)
    }

    fn view_namespace(&self) -> Option<&str> {
        self.view_name.rsplit_once('.').map(|(prefix, _)| prefix)
    }
}

fn normalize_prefix(raw: &str) -> String {
    raw.replace(&['/', '\\'][..], ".").trim_matches('.').to_string()
}

pub(crate) trait DynController {
    fn invoke(&mut self, app: &App, action: &str, args: ActionArgs) -> MvcResult<ActionResult>;
    fn mode(&self) -> ModeBag;
    fn mode_mut(&mut self) -> &mut ModeBag;
    fn bag(&self) -> &DataBag;
    fn replace_bag(&mut self, bag: DataBag) -> DataBag;
    fn set_binder(&mut self, binder: Weak<dyn DynBinder>);
    fn binder(&self) -> Option<Rc<dyn DynBinder>>;
    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct ControllerCell<C: Controller> {
    meta: Rc<ControllerMeta>,
    table: Rc<ActionTable<C>>,
    inner: C,
    mode: ModeBag,
    bag: DataBag,
    binder: Option<Weak<dyn DynBinder>>,
}

impl<C: Controller> ControllerCell<C> {
    pub(crate) fn new(meta: Rc<ControllerMeta>, table: Rc<ActionTable<C>>) -> Self {
        Self {
            meta,
            table,
            inner: C::default(),
            mode: ModeBag::default(),
            bag: DataBag::default(),
            binder: None,
        }
    }
}

impl<C: Controller> DynController for ControllerCell<C> {
    fn invoke(&mut self, app: &App, action: &str, args: ActionArgs) -> MvcResult<ActionResult> {
        let table = Rc::clone(&self.table);
        let resolved = resolver::resolve(
            self.meta.type_name,
            table.entries(),
            action,
            args.values(),
            app.settings().action_name_fallback,
        );
        let index = match resolved {
            Ok(index) => Some(index),
            Err(MvcError::ActionNotFound { .. }) if action == ENTRY_ACTION => None,
            Err(err) => return Err(err),
        };
        let matched = index.map_or(ENTRY_ACTION, |index| table.entries()[index].name());
        let origin = if matched == ENTRY_ACTION {
            ActionOrigin::Entry
        } else {
            ActionOrigin::SubAction
        };
        debug!(controller = self.meta.type_name, action, ?origin, "invoking action");

        let mut cx = ActionContext {
            app,
            controller: &self.meta,
            action,
            origin,
            mode: &mut self.mode,
            bag: &mut self.bag,
            binder: self.binder.as_ref().and_then(Weak::upgrade),
        };
        match index {
            Some(index) => table.invoke(index, &mut self.inner, &mut cx, args.into_values()),
            None => self.inner.index(&mut cx, args),
        }
    }

    fn mode(&self) -> ModeBag {
        self.mode
    }

    fn mode_mut(&mut self) -> &mut ModeBag {
        &mut self.mode
    }

    fn bag(&self) -> &DataBag {
        &self.bag
    }

    fn replace_bag(&mut self, bag: DataBag) -> DataBag {
        std::mem::replace(&mut self.bag, bag)
    }

    fn set_binder(&mut self, binder: Weak<dyn DynBinder>) {
        self.binder = Some(binder);
    }

    fn binder(&self) -> Option<Rc<dyn DynBinder>> {
        self.binder.as_ref().and_then(Weak::upgrade)
    }

    fn as_any(&self) -> &dyn Any {
        &self.inner
    }
}

/// Shared handle to a live controller instance.
#[derive(Clone)]
pub struct ControllerRef {
    meta: Rc<ControllerMeta>,
    cell: Rc<RefCell<dyn DynController>>,
}

impl ControllerRef {
    pub(crate) fn new<C: Controller>(meta: Rc<ControllerMeta>, table: Rc<ActionTable<C>>) -> Self {
        let cell: Rc<RefCell<dyn DynController>> =
            Rc::new(RefCell::new(ControllerCell::new(Rc::clone(&meta), table)));
        Self { meta, cell }
    }

    pub fn name(&self) -> &'static str {
        self.meta.type_name
    }

    pub fn meta(&self) -> &ControllerMeta {
        &self.meta
    }

    /// Runs `f` on the concrete controller. `None` when the type differs or the
    /// controller is executing an action.
    pub fn inspect<C: Controller, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let cell = self.cell.try_borrow().ok()?;
        cell.as_any().downcast_ref::<C>().map(f)
    }

    pub fn mode(&self) -> Option<ModeBag> {
        self.cell.try_borrow().ok().map(|cell| cell.mode())
    }

    pub fn bag(&self) -> Option<DataBag> {
        self.cell.try_borrow().ok().map(|cell| cell.bag().clone())
    }

    pub fn ptr_eq(&self, other: &ControllerRef) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    pub(crate) fn borrow_mut(&self) -> MvcResult<RefMut<'_, dyn DynController + 'static>> {
        self.cell
            .try_borrow_mut()
            .map_err(|_| MvcError::ControllerBusy(self.meta.type_name.to_string()))
    }

    /// Points the controller at the binder that is driving it.
    pub(crate) fn set_binder(&self, binder: Weak<dyn DynBinder>) {
        match self.cell.try_borrow_mut() {
            Ok(mut cell) => cell.set_binder(binder),
            Err(_) => debug!(controller = self.name(), "controller busy; binder link unchanged"),
        }
    }

    /// The binder of the view this controller last drove, if it is still alive.
    pub(crate) fn binder(&self) -> Option<Rc<dyn DynBinder>> {
        self.cell.try_borrow().ok().and_then(|cell| cell.binder())
    }
}

impl std::fmt::Debug for ControllerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ControllerRef").field(&self.meta.type_name).finish()
    }
}

/// Everything an action body can reach while it runs.
pub struct ActionContext<'a> {
    app: &'a App,
    controller: &'a ControllerMeta,
    action: &'a str,
    origin: ActionOrigin,
    mode: &'a mut ModeBag,
    bag: &'a mut DataBag,
    binder: Option<Rc<dyn DynBinder>>,
}

impl<'a> ActionContext<'a> {
    pub fn app(&self) -> &App {
        self.app
    }

    pub fn controller_name(&self) -> &str {
        self.controller.type_name
    }

    pub fn view_name(&self) -> &str {
        &self.controller.view_name
    }

    pub fn action_name(&self) -> &str {
        self.action
    }

    /// Whether this action is the controller's entry action.
    pub fn origin(&self) -> ActionOrigin {
        self.origin
    }

    pub fn mode(&self) -> &ModeBag {
        &*self.mode
    }

    pub fn mode_mut(&mut self) -> &mut ModeBag {
        &mut *self.mode
    }

    pub fn bag(&self) -> &DataBag {
        &*self.bag
    }

    pub fn bag_mut(&mut self) -> &mut DataBag {
        &mut *self.bag
    }

    pub fn view(&self) -> ActionResult {
        self.view_as(self.origin, Payload::Empty)
    }

    pub fn view_model<M: Model>(&self, model: M) -> ActionResult {
        self.view_as(self.origin, Payload::Model(ModelValue::new(model)))
    }

    pub fn view_models<M: Model>(&self, models: Vec<M>) -> ActionResult {
        let models = models.into_iter().map(ModelValue::new).collect();
        self.view_as(self.origin, Payload::Models(ModelType::of::<M>(), models))
    }

    /// List-bound view from type-erased models; they must be non-empty and of
    /// one model type.
    pub fn view_models_dyn(&self, models: Vec<ModelValue>) -> MvcResult<ActionResult> {
        let ty = sequence_type(&models)?;
        Ok(self.view_as(self.origin, Payload::Models(ty, models)))
    }

    pub fn view_table(&self, table: impl Into<Rc<DataTable>>) -> ActionResult {
        self.view_as(self.origin, Payload::Table(table.into()))
    }

    /// A view result whose caller identity is stated explicitly.
    pub fn view_as(&self, origin: ActionOrigin, payload: Payload) -> ActionResult {
        ActionResult::View(ViewResult {
            view: self.controller.view_name.clone(),
            origin,
            payload,
        })
    }

    /// Partial view named after the current action.
    pub fn partial_view(&self) -> MvcResult<ActionResult> {
        self.partial(self.action, Payload::Empty)
    }

    pub fn partial_view_model<M: Model>(&self, model: M) -> MvcResult<ActionResult> {
        self.partial(self.action, Payload::Model(ModelValue::new(model)))
    }

    pub fn partial_view_named(&self, name: &str) -> MvcResult<ActionResult> {
        self.partial(name, Payload::Empty)
    }

    pub fn partial_view_named_model<M: Model>(&self, name: &str, model: M) -> MvcResult<ActionResult> {
        self.partial(name, Payload::Model(ModelValue::new(model)))
    }

    pub fn partial_view_models<M: Model>(&self, name: Option<&str>, models: Vec<M>) -> MvcResult<ActionResult> {
        let models = models.into_iter().map(ModelValue::new).collect();
        self.partial(
            name.unwrap_or(self.action),
            Payload::Models(ModelType::of::<M>(), models),
        )
    }

    fn partial(&self, name: &str, payload: Payload) -> MvcResult<ActionResult> {
        let candidates = partial_candidates(self.controller, name);
        let view = candidates
            .iter()
            .find_map(|candidate| self.app.resolve(candidate, TypeKind::PartialView))
            .ok_or_else(|| MvcError::ViewTypeNotFound {
                tried: candidates.join(", "),
            })?;
        Ok(ActionResult::PartialView(PartialViewResult {
            view: view.to_string(),
            payload,
        }))
    }

    /// Runs `action` on a new instance of the controller named `controller`.
    pub fn redirect_to_action(
        &mut self,
        action: &str,
        controller: &str,
        args: ActionArgs,
    ) -> MvcResult<ActionResult> {
        let target = self.app.controller(controller)?;
        redirect::run(self.app, self.mode, self.bag, &target, action, args)
    }

    pub fn redirect_to<C: Controller>(&mut self, action: &str, args: ActionArgs) -> MvcResult<ActionResult> {
        let target = self.app.controller_of::<C>()?;
        redirect::run(self.app, self.mode, self.bag, &target, action, args)
    }

    /// Runs the entry action of controller `C`.
    pub fn redirect_index<C: Controller>(&mut self, args: ActionArgs) -> MvcResult<ActionResult> {
        self.redirect_to::<C>(ENTRY_ACTION, args)
    }

    /// Runs `action` on a new instance of the current controller type.
    pub fn redirect_local(&mut self, action: &str, args: ActionArgs) -> MvcResult<ActionResult> {
        let controller = self.controller.type_name;
        self.redirect_to_action(action, controller, args)
    }

    pub fn empty(&self) -> ActionResult {
        ActionResult::Empty
    }

    /// Applies the bound view's control values to `model`.
    pub fn update_model<M: Model>(&self, model: &mut M) -> MvcResult<()> {
        let binder = self.binder.as_ref().ok_or_else(|| {
            MvcError::argument("binder", format!("{} is not driving a view", self.controller.type_name))
        })?;
        binder.update_model_any(model)
    }

    pub fn try_update_model<M: Model>(&self, model: &mut M) -> bool {
        match self.update_model(model) {
            Ok(()) => true,
            Err(err) => {
                debug!(controller = self.controller.type_name, error = %err, "model update failed");
                false
            }
        }
    }
}

fn sequence_type(models: &[ModelValue]) -> MvcResult<ModelType> {
    let first = models
        .first()
        .ok_or_else(|| MvcError::argument("models", "an empty sequence has no element type"))?
        .model_type();
    if models.iter().any(|model| model.model_type() != first) {
        return Err(MvcError::argument("models", "sequence mixes model types"));
    }
    Ok(first)
}

/// Names tried for a partial view, in order: `<View><suffix>`,
/// `<View>s.<suffix>`, `<View>s.<View><suffix>`.
pub(crate) fn partial_candidates(meta: &ControllerMeta, name: &str) -> Vec<String> {
    let base = meta.view_base();
    let suffix = match name.get(..base.len()) {
        Some(head) if name.len() > base.len() && head.eq_ignore_ascii_case(base) => &name[base.len()..],
        _ => name,
    };
    let names = [
        format!("{base}{suffix}"),
        format!("{base}s.{suffix}"),
        format!("{base}s.{base}{suffix}"),
    ];
    match meta.view_namespace() {
        Some(prefix) => names.into_iter().map(|name| format!("{prefix}.{name}")).collect(),
        None => names.into_iter().collect(),
    }
}
