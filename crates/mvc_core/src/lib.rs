//! Action dispatch and view lifecycle for desktop applications organized as
//! controllers and bindable views.
//!
//! A view's [`ViewBinder`] dispatches an action by name; the resolver picks
//! the controller entry matching the name and the argument values, the action
//! returns an [`ActionResult`], and the lifecycle manager creates, activates,
//! rebinds or modally shows the target window.

pub mod action;
pub mod app;
pub mod args;
pub mod bag;
pub mod binder;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod grid;
mod lifecycle;
mod redirect;
pub mod registry;
pub mod resolver;
pub mod result;
pub mod table;
pub mod view;

pub use action::{ActionEntry, ActionSignature, ActionTable};
pub use app::{App, AppBuilder, Toolkit, WeakApp};
pub use args::{ActionArgs, ParamRecord};
pub use bag::{BagKey, DataBag, ModeBag};
pub use binder::{BindingInfo, DynBinder, ViewBinder};
pub use catalog::TypeKind;
pub use config::{load_settings, load_settings_from, FallbackPolicy, MvcSettings, SETTINGS_FILE};
pub use controller::{ActionContext, Controller, ControllerMeta, ControllerRef, ENTRY_ACTION, ENTRY_ARGS};
pub use dispatch::{DispatchOutcome, DispatchRequest};
pub use grid::{GridActions, GridCommand, GridKey, DELETE_MODEL, SAVE_EDIT_MODEL, SAVE_NEW_MODEL};
pub use registry::{ViewInstanceRegistry, Window};
pub use result::{ActionResult, PartialViewResult, Payload, RedirectResult, ResultKind, ViewResult};
pub use shared::{
    fields, impl_model_value, ActionMode, ActionOrigin, ControlId, CreationMode, ErrorKind, Field,
    FieldValue, Model, ModelType, ModelValue, MvcError, MvcResult, ToActionFlag, Value, ValueType,
    WindowId,
};
pub use table::{Column, DataTable};
pub use view::{
    ClickHandler, Clickable, Control, DynView, HasDataSource, HasItems, HasProperty, HasText,
    HasValue, ListItem, Tagged, View,
};
