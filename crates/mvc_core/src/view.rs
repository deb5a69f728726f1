use std::{any::Any, rc::Rc};

use shared::{ControlId, Model, ModelType, MvcError, MvcResult, Value};

use crate::{
    app::App,
    bag::DataBag,
    binder::{DynBinder, ViewBinder},
    controller::ControllerRef,
    result::Payload,
    table::DataTable,
};

/// A bindable window or partial view.
///
/// The view keeps the binder it is given and re-establishes its field
/// bindings in [`View::register`], which runs when the binder is first
/// attached and again on every rebind.
pub trait View: 'static {
    type Model: Model;

    /// Catalog name, dot-qualified for namespaced views (`"Emps.Edit"`).
    const NAME: &'static str;

    fn binder(&self) -> Option<Rc<ViewBinder<Self::Model>>>;

    fn set_binder(&mut self, binder: Rc<ViewBinder<Self::Model>>);

    fn register(&mut self, mvc: &ViewBinder<Self::Model>) -> MvcResult<()>;

    /// Host surface for the toolkit (a form, a panel).
    fn native(&self) -> Option<Rc<dyn Any>> {
        None
    }
}

/// Object-safe face of [`View`] used by the lifecycle manager.
pub trait DynView {
    fn view_name(&self) -> &'static str;

    fn bound_model_type(&self) -> ModelType;

    /// Creates the binder on first use, loads `payload` and `bag`, links the
    /// binder to `controller` and runs the view's registration.
    fn bind_payload(
        &mut self,
        app: &App,
        payload: &Payload,
        bag: DataBag,
        controller: &ControllerRef,
        partial: bool,
    ) -> MvcResult<Rc<dyn DynBinder>>;

    fn dyn_binder(&self) -> Option<Rc<dyn DynBinder>>;

    fn native_surface(&self) -> Option<Rc<dyn Any>>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<V: View> DynView for V {
    fn view_name(&self) -> &'static str {
        V::NAME
    }

    fn bound_model_type(&self) -> ModelType {
        ModelType::of::<V::Model>()
    }

    fn bind_payload(
        &mut self,
        app: &App,
        payload: &Payload,
        bag: DataBag,
        controller: &ControllerRef,
        partial: bool,
    ) -> MvcResult<Rc<dyn DynBinder>> {
        let binder = match self.binder() {
            Some(binder) => binder,
            None => {
                self.set_binder(ViewBinder::new(app, V::NAME, partial));
                self.binder()
                    .ok_or_else(|| MvcError::view_contract(V::NAME, "view does not keep its binder"))?
            }
        };
        binder.load(payload, bag)?;
        binder.attach_controller(controller);
        self.register(&binder)?;
        binder.mark_registered();
        Ok(binder)
    }

    fn dyn_binder(&self) -> Option<Rc<dyn DynBinder>> {
        self.binder().map(|binder| binder as Rc<dyn DynBinder>)
    }

    fn native_surface(&self) -> Option<Rc<dyn Any>> {
        self.native()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A widget with a stable identity inside its window.
pub trait Control {
    fn control_id(&self) -> ControlId;
}

pub trait HasText: Control {
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
}

pub trait HasValue: Control {
    fn value(&self) -> Value;
    fn set_value(&self, value: Value);
}

/// A widget exposing additional named value properties (`"Checked"`, `"SelectedValue"`).
pub trait HasProperty: Control {
    fn property(&self, name: &str) -> Option<Value>;
    fn set_property(&self, name: &str, value: Value) -> bool;
}

pub trait Tagged: Control {
    fn tag(&self) -> Value;
    fn set_tag(&self, tag: Value);
}

/// A grid showing rows of a table.
pub trait HasDataSource: Control {
    fn set_data_source(&self, table: Rc<DataTable>);
    fn selected_row(&self) -> Option<usize>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub value: Value,
    pub display: String,
}

/// A list or combo box.
pub trait HasItems: Control {
    fn set_items(&self, items: Vec<ListItem>);
}

pub type ClickHandler = Rc<dyn Fn() -> MvcResult<()>>;

/// A button or menu item.
pub trait Clickable: Control {
    fn on_click(&self, handler: ClickHandler);
}
