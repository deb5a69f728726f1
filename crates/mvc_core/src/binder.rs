use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};

use shared::{
    model::field_named, ActionMode, ControlId, Field, Model, ModelType, ModelValue, MvcError,
    MvcResult, ToActionFlag, Value, WindowId,
};
use tracing::{debug, warn};

use crate::{
    app::{App, WeakApp},
    args::ActionArgs,
    bag::DataBag,
    controller::ControllerRef,
    dispatch::{self, DispatchOutcome, DispatchRequest},
    grid::{GridCommand, GridKey},
    result::Payload,
    table::DataTable,
    view::{
        Clickable, DynView, HasDataSource, HasItems, HasProperty, HasText, HasValue, ListItem,
        Tagged, View,
    },
};

/// Object-safe face of [`ViewBinder`], shared by windows and controllers.
pub trait DynBinder {
    fn view_name(&self) -> &'static str;
    fn model_type(&self) -> ModelType;
    fn is_partial(&self) -> bool;
    fn window_id(&self) -> Option<WindowId>;
    fn set_window(&self, id: WindowId);
    fn load(&self, payload: &Payload, bag: DataBag) -> MvcResult<()>;
    fn attach_controller(&self, controller: &ControllerRef);
    fn controller(&self) -> Option<ControllerRef>;
    fn bag(&self) -> DataBag;
    fn set_bag(&self, bag: DataBag);
    fn update_model_any(&self, target: &mut dyn Any) -> MvcResult<()>;
    fn mounted_partial(&self, name: &str) -> Option<Rc<RefCell<dyn DynView>>>;
    /// Binder of the view hosting this partial view.
    fn parent(&self) -> Option<Rc<dyn DynBinder>>;
    fn set_parent(&self, parent: Weak<dyn DynBinder>);
    fn as_any(&self) -> &dyn Any;
}

enum BoundControl {
    Text(Rc<dyn HasText>),
    Value(Rc<dyn HasValue>),
    Property(Rc<dyn HasProperty>, String),
    Tag(Rc<dyn Tagged>),
}

impl BoundControl {
    fn read(&self) -> Value {
        match self {
            BoundControl::Text(control) => Value::Text(control.text()),
            BoundControl::Value(control) => control.value(),
            BoundControl::Property(control, name) => control.property(name).unwrap_or_default(),
            BoundControl::Tag(control) => control.tag(),
        }
    }
}

struct Binding<M> {
    control: ControlId,
    property: String,
    field: Field<M>,
    target: BoundControl,
}

/// One registered (control, property, field) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    pub control: ControlId,
    pub property: String,
    pub field: &'static str,
}

#[derive(Clone)]
pub(crate) enum ActionLink {
    Action {
        name: String,
        args: ActionArgs,
        flag: ToActionFlag,
        on_dialog: Option<Rc<dyn Fn(ActionMode)>>,
    },
    Grid {
        grid: Rc<dyn HasDataSource>,
        command: GridCommand,
    },
}

pub(crate) struct BinderState<M> {
    pub(crate) controller: Option<ControllerRef>,
    pub(crate) model: Option<M>,
    pub(crate) models: Option<Vec<M>>,
    pub(crate) table: Option<Rc<DataTable>>,
    pub(crate) bag: DataBag,
    bindings: Vec<Binding<M>>,
    partials: Vec<(&'static str, Rc<RefCell<dyn DynView>>)>,
    links: HashMap<ControlId, ActionLink>,
    pub(crate) grid_mode: bool,
    pub(crate) grid_key: Option<GridKey>,
}

impl<M> Default for BinderState<M> {
    fn default() -> Self {
        Self {
            controller: None,
            model: None,
            models: None,
            table: None,
            bag: DataBag::default(),
            bindings: Vec::new(),
            partials: Vec::new(),
            links: HashMap::new(),
            grid_mode: false,
            grid_key: None,
        }
    }
}

/// Pairs one window (or partial view) with its model payload, its field
/// bindings and the controller that drives it.
pub struct ViewBinder<M: Model> {
    me: Weak<ViewBinder<M>>,
    app: WeakApp,
    view: &'static str,
    partial: bool,
    pub(crate) fields: Vec<Field<M>>,
    window: Cell<Option<WindowId>>,
    parent: RefCell<Option<Weak<dyn DynBinder>>>,
    registered: Cell<bool>,
    pub(crate) state: RefCell<BinderState<M>>,
}

impl<M: Model> ViewBinder<M> {
    pub fn new(app: &App, view: &'static str, partial: bool) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            app: app.downgrade(),
            view,
            partial,
            fields: M::fields(),
            window: Cell::new(None),
            parent: RefCell::new(None),
            registered: Cell::new(false),
            state: RefCell::new(BinderState::default()),
        })
    }

    pub fn view_name(&self) -> &'static str {
        self.view
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window.get()
    }

    /// Whether the view has completed at least one registration.
    pub fn is_registered(&self) -> bool {
        self.registered.get()
    }

    pub(crate) fn mark_registered(&self) {
        self.registered.set(true);
    }

    pub fn model(&self) -> Option<M> {
        self.state.borrow().model.clone()
    }

    pub fn models(&self) -> Vec<M> {
        self.state.borrow().models.clone().unwrap_or_default()
    }

    pub fn table(&self) -> Option<Rc<DataTable>> {
        self.state.borrow().table.clone()
    }

    pub fn bag(&self) -> DataBag {
        self.state.borrow().bag.clone()
    }

    pub fn with_bag_mut<R>(&self, f: impl FnOnce(&mut DataBag) -> R) -> R {
        f(&mut self.state.borrow_mut().bag)
    }

    pub fn controller(&self) -> Option<ControllerRef> {
        self.state.borrow().controller.clone()
    }

    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.state
            .borrow()
            .bindings
            .iter()
            .map(|binding| BindingInfo {
                control: binding.control,
                property: binding.property.clone(),
                field: binding.field.name(),
            })
            .collect()
    }

    pub(crate) fn app(&self) -> MvcResult<App> {
        self.app
            .upgrade()
            .ok_or_else(|| MvcError::view_contract(self.view, "the application has shut down"))
    }

    pub(crate) fn load(&self, payload: &Payload, bag: DataBag) -> MvcResult<()> {
        let expected = ModelType::of::<M>();
        if let Some(found) = payload.model_type() {
            if found != expected {
                return Err(self.model_mismatch(found));
            }
        }
        let mismatch = |value: &ModelValue| self.model_mismatch(value.model_type());
        let (model, models, table) = match payload {
            Payload::Empty => (None, None, None),
            Payload::Model(value) => {
                let model = value.to_model::<M>().ok_or_else(|| mismatch(value))?;
                (Some(model), None, None)
            }
            Payload::Models(_, values) => {
                let models = values
                    .iter()
                    .map(|value| value.to_model::<M>().ok_or_else(|| mismatch(value)))
                    .collect::<MvcResult<Vec<_>>>()?;
                (None, Some(models), None)
            }
            Payload::Table(table) => (None, None, Some(Rc::clone(table))),
        };

        let mut state = self.state.borrow_mut();
        state.model = model;
        state.models = models;
        state.table = table;
        state.bag = bag;
        state.grid_key = None;
        debug!(view = self.view, "payload loaded");
        Ok(())
    }

    fn model_mismatch(&self, found: ModelType) -> MvcError {
        MvcError::view_contract(
            self.view,
            format!("view binds {} but the payload carries {found}", M::NAME),
        )
    }

    pub(crate) fn attach_controller(&self, controller: &ControllerRef) {
        controller.set_binder(self.me.clone());
        self.state.borrow_mut().controller = Some(controller.clone());
    }

    fn field(&self, name: &str) -> MvcResult<Field<M>> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|field| field.name().eq_ignore_ascii_case(name))
            })
            .cloned()
            .ok_or_else(|| MvcError::UnknownModelField {
                model: M::NAME.to_string(),
                field: name.to_string(),
            })
    }

    fn current_value(&self, field: &Field<M>) -> Option<Value> {
        self.state.borrow().model.as_ref().map(|model| field.get(model))
    }

    fn bind_control(&self, control: ControlId, property: &str, field: Field<M>, target: BoundControl) {
        let mut state = self.state.borrow_mut();
        if state.bindings.iter().any(|binding| binding.control == control) {
            return;
        }
        state.bindings.push(Binding {
            control,
            property: property.to_string(),
            field,
            target,
        });
    }

    /// Shows `field` as the control's text and binds it for updates.
    pub fn for_text<C: HasText + 'static>(&self, control: &Rc<C>, field: &str) -> MvcResult<()> {
        let field = self.field(field)?;
        if let Some(value) = self.current_value(&field) {
            control.set_text(&value.as_text());
        }
        let target: Rc<dyn HasText> = control.clone();
        self.bind_control(control.control_id(), "Text", field, BoundControl::Text(target));
        Ok(())
    }

    pub fn for_value<C: HasValue + 'static>(&self, control: &Rc<C>, field: &str) -> MvcResult<()> {
        let field = self.field(field)?;
        if let Some(value) = self.current_value(&field) {
            control.set_value(value);
        }
        let target: Rc<dyn HasValue> = control.clone();
        self.bind_control(control.control_id(), "Value", field, BoundControl::Value(target));
        Ok(())
    }

    /// Binds `field` to a named value property of the control.
    pub fn for_known<C: HasProperty + 'static>(
        &self,
        control: &Rc<C>,
        property: &str,
        field: &str,
    ) -> MvcResult<()> {
        let field = self.field(field)?;
        if let Some(value) = self.current_value(&field) {
            if !control.set_property(property, value) {
                return Err(MvcError::argument(
                    "property",
                    format!("control {} has no property '{property}'", control.control_id()),
                ));
            }
        }
        let target: Rc<dyn HasProperty> = control.clone();
        self.bind_control(
            control.control_id(),
            property,
            field,
            BoundControl::Property(target, property.to_string()),
        );
        Ok(())
    }

    pub fn for_tag<C: Tagged + 'static>(&self, control: &Rc<C>, field: &str) -> MvcResult<()> {
        let field = self.field(field)?;
        if let Some(value) = self.current_value(&field) {
            control.set_tag(value);
        }
        let target: Rc<dyn Tagged> = control.clone();
        self.bind_control(control.control_id(), "Tag", field, BoundControl::Tag(target));
        Ok(())
    }

    /// Pushes the model sequence, else the table, else an empty table of the
    /// model's columns into `grid`, and puts the binder in grid mode.
    pub fn fill_data_source<G: HasDataSource + 'static>(&self, grid: &Rc<G>) {
        let table = {
            let mut state = self.state.borrow_mut();
            state.grid_mode = true;
            match (&state.models, &state.table) {
                (Some(models), _) => Rc::new(DataTable::from_models(models)),
                (None, Some(table)) => Rc::clone(table),
                (None, None) => Rc::new(DataTable::from_models::<M>(&[])),
            }
        };
        grid.set_data_source(table);
    }

    /// Fills a list control from `items`, using two of their fields as the
    /// item value and display text.
    pub fn fill_data_list<L: HasItems + 'static, N: Model>(
        &self,
        list: &Rc<L>,
        items: &[N],
        value_member: &str,
        display_member: &str,
    ) -> MvcResult<()> {
        let member = |name: &str| {
            field_named::<N>(name).ok_or_else(|| MvcError::UnknownModelField {
                model: N::NAME.to_string(),
                field: name.to_string(),
            })
        };
        let value_field = member(value_member)?;
        let display_field = member(display_member)?;
        list.set_items(
            items
                .iter()
                .map(|item| ListItem {
                    value: value_field.get(item),
                    display: display_field.get(item).as_text(),
                })
                .collect(),
        );
        Ok(())
    }

    /// Fills a list control from a fixed option set.
    pub fn fill_enum_list<L: HasItems + 'static>(&self, list: &Rc<L>, options: &[(Value, &str)]) {
        list.set_items(
            options
                .iter()
                .map(|(value, display)| ListItem {
                    value: value.clone(),
                    display: display.to_string(),
                })
                .collect(),
        );
    }

    /// Wires a click on `control` to dispatch `action`.
    pub fn action_click<B: Clickable + 'static>(
        &self,
        control: &Rc<B>,
        action: &str,
        args: ActionArgs,
        flag: ToActionFlag,
    ) {
        self.link(
            &**control,
            ActionLink::Action {
                name: action.to_string(),
                args,
                flag,
                on_dialog: None,
            },
        );
    }

    /// Wires a click to open `action` as a dialog; `on_close` receives the
    /// dialog code once the dialog is dismissed.
    pub fn action_click_dialog<B: Clickable + 'static>(
        &self,
        control: &Rc<B>,
        action: &str,
        args: ActionArgs,
        on_close: impl Fn(ActionMode) + 'static,
    ) {
        let on_close: Rc<dyn Fn(ActionMode)> = Rc::new(on_close);
        self.link(
            &**control,
            ActionLink::Action {
                name: action.to_string(),
                args,
                flag: ToActionFlag::Dialog,
                on_dialog: Some(on_close),
            },
        );
    }

    /// Wires a click to a grid command on the grid's selected row.
    pub fn action_click_grid<B: Clickable + 'static, G: HasDataSource + 'static>(
        &self,
        control: &Rc<B>,
        grid: &Rc<G>,
        command: GridCommand,
    ) {
        let grid: Rc<dyn HasDataSource> = grid.clone();
        self.link(&**control, ActionLink::Grid { grid, command });
    }

    fn link(&self, control: &dyn Clickable, link: ActionLink) {
        let id = control.control_id();
        let first = self.state.borrow_mut().links.insert(id, link).is_none();
        if first {
            let me = self.me.clone();
            control.on_click(Rc::new(move || match me.upgrade() {
                Some(binder) => binder.fire(id),
                None => Ok(()),
            }));
        }
    }

    fn fire(&self, id: ControlId) -> MvcResult<()> {
        let link = self.state.borrow().links.get(&id).cloned();
        match link {
            None => Ok(()),
            Some(ActionLink::Action {
                name,
                args,
                flag,
                on_dialog,
            }) => {
                let outcome = self.action_with(&name, args, flag)?;
                if let (Some(callback), Some(mode)) = (on_dialog, outcome.action_mode()) {
                    callback(mode);
                }
                Ok(())
            }
            Some(ActionLink::Grid { grid, command }) => {
                self.grid_command(command, grid.selected_row())?;
                Ok(())
            }
        }
    }

    /// Activates the existing window of the target view or creates it.
    pub fn action(&self, action: &str, args: ActionArgs) -> MvcResult<DispatchOutcome> {
        self.action_with(action, args, ToActionFlag::ViewActived)
    }

    pub fn action_always_create(&self, action: &str, args: ActionArgs) -> MvcResult<DispatchOutcome> {
        self.action_with(action, args, ToActionFlag::View)
    }

    pub fn action_child(
        &self,
        action: &str,
        args: ActionArgs,
        always_create: bool,
    ) -> MvcResult<DispatchOutcome> {
        let flag = if always_create {
            ToActionFlag::Child
        } else {
            ToActionFlag::ChildActived
        };
        self.action_with(action, args, flag)
    }

    /// Runs `action` as a modal dialog. `None` when the target did not end in a dialog.
    pub fn action_dialog(&self, action: &str, args: ActionArgs) -> MvcResult<Option<ActionMode>> {
        let outcome = self.action_with(action, args, ToActionFlag::Dialog)?;
        Ok(outcome.action_mode())
    }

    pub fn action_with(
        &self,
        action: &str,
        args: ActionArgs,
        flag: ToActionFlag,
    ) -> MvcResult<DispatchOutcome> {
        let app = self.app()?;
        let (controller, mut bag) = {
            let state = self.state.borrow();
            (state.controller.clone(), state.bag.clone())
        };
        let controller = controller
            .ok_or_else(|| MvcError::view_contract(self.view, "no controller is attached"))?;
        debug!(view = self.view, action, ?flag, "dispatching from view");

        controller.set_binder(self.me.clone());
        let request = DispatchRequest::new(flag.creation_mode(), flag.always_create());
        let outcome = dispatch::dispatch(&app, &controller, action, args, request, &mut bag);
        self.state.borrow_mut().bag = bag;
        outcome
    }

    /// Mounts a partial view inside this view; the first mount per view type wins.
    pub fn partial<P: View>(&self, partial: &Rc<RefCell<P>>) {
        let mut state = self.state.borrow_mut();
        if state
            .partials
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(P::NAME))
        {
            return;
        }
        let view: Rc<RefCell<dyn DynView>> = partial.clone();
        state.partials.push((P::NAME, view));
    }

    /// Mounts `partial` if needed and binds it to `model` with this view's
    /// controller and bag.
    pub fn render_partial<P: View>(&self, partial: &Rc<RefCell<P>>, model: P::Model) -> MvcResult<()> {
        self.partial(partial);
        let app = self.app()?;
        let controller = self
            .controller()
            .ok_or_else(|| MvcError::view_contract(self.view, "no controller is attached"))?;
        let bag = self.bag();
        let mut view = partial
            .try_borrow_mut()
            .map_err(|_| MvcError::view_contract(P::NAME, "partial view is already being bound"))?;
        let binder = view.bind_payload(
            &app,
            &Payload::Model(ModelValue::new(model)),
            bag,
            &controller,
            true,
        )?;
        let parent: Weak<dyn DynBinder> = self.me.clone();
        binder.set_parent(parent.clone());
        controller.set_binder(parent);
        Ok(())
    }

    /// Applies control values to `target`.
    ///
    /// A field-bound view converts each bound control's value and assigns it,
    /// continuing past failures and reporting the first one. Controls reading
    /// null are skipped; blank text still clears a nullable field. A grid-bound
    /// view copies the row identified by the recorded grid key instead.
    pub fn update_model(&self, target: &mut M) -> MvcResult<()> {
        let state = self.state.borrow();
        if state.grid_mode {
            return self.update_from_grid(&state, target);
        }

        let mut first_failure = None;
        for binding in &state.bindings {
            let value = binding.target.read();
            // An unset control leaves its field alone.
            if value.is_null() {
                continue;
            }
            if let Err(source) = binding.field.assign(target, value) {
                warn!(view = self.view, field = binding.field.name(), error = %source, "field update failed");
                first_failure.get_or_insert(MvcError::ModelUpdate {
                    field: binding.field.name().to_string(),
                    source,
                });
            }
        }
        first_failure.map_or(Ok(()), Err)
    }
}

impl<M: Model> DynBinder for ViewBinder<M> {
    fn view_name(&self) -> &'static str {
        self.view
    }

    fn model_type(&self) -> ModelType {
        ModelType::of::<M>()
    }

    fn is_partial(&self) -> bool {
        self.partial
    }

    fn window_id(&self) -> Option<WindowId> {
        self.window.get()
    }

    fn set_window(&self, id: WindowId) {
        self.window.set(Some(id));
    }

    fn load(&self, payload: &Payload, bag: DataBag) -> MvcResult<()> {
        ViewBinder::load(self, payload, bag)
    }

    fn attach_controller(&self, controller: &ControllerRef) {
        ViewBinder::attach_controller(self, controller);
    }

    fn controller(&self) -> Option<ControllerRef> {
        ViewBinder::controller(self)
    }

    fn bag(&self) -> DataBag {
        ViewBinder::bag(self)
    }

    fn set_bag(&self, bag: DataBag) {
        self.state.borrow_mut().bag = bag;
    }

    fn update_model_any(&self, target: &mut dyn Any) -> MvcResult<()> {
        let target = target.downcast_mut::<M>().ok_or_else(|| {
            MvcError::view_contract(
                self.view,
                format!("view binds {} models; the update target is another type", M::NAME),
            )
        })?;
        self.update_model(target)
    }

    fn mounted_partial(&self, name: &str) -> Option<Rc<RefCell<dyn DynView>>> {
        self.state
            .borrow()
            .partials
            .iter()
            .find(|(mounted, _)| mounted.eq_ignore_ascii_case(name))
            .map(|(_, view)| Rc::clone(view))
    }

    fn parent(&self) -> Option<Rc<dyn DynBinder>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn set_parent(&self, parent: Weak<dyn DynBinder>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "tests/binder_tests.rs"]
mod tests;
