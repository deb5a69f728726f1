use std::rc::Rc;

use shared::{ActionMode, ActionOrigin, ModelType, ModelValue};

use crate::{bag::DataBag, table::DataTable};

/// Data handed to the view a result targets.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    Model(ModelValue),
    Models(ModelType, Vec<ModelValue>),
    Table(Rc<DataTable>),
}

impl Payload {
    pub fn model_type(&self) -> Option<ModelType> {
        match self {
            Payload::Model(model) => Some(model.model_type()),
            Payload::Models(ty, _) => Some(*ty),
            Payload::Empty | Payload::Table(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewResult {
    /// Catalog name of the target view.
    pub view: String,
    pub origin: ActionOrigin,
    pub payload: Payload,
}

#[derive(Debug, Clone)]
pub struct PartialViewResult {
    pub view: String,
    pub payload: Payload,
}

#[derive(Debug, Clone)]
pub struct RedirectResult {
    pub controller: String,
    pub action: String,
    pub dialog_result: i32,
    pub bag: DataBag,
}

impl RedirectResult {
    pub fn action_mode(&self) -> Option<ActionMode> {
        ActionMode::from_code(self.dialog_result)
    }
}

/// What an action wants shown next. Consumed once by the lifecycle manager.
#[derive(Debug, Clone)]
pub enum ActionResult {
    View(ViewResult),
    PartialView(PartialViewResult),
    Redirect(RedirectResult),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    View,
    PartialView,
    Redirect,
    Empty,
}

impl ActionResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            ActionResult::View(_) => ResultKind::View,
            ActionResult::PartialView(_) => ResultKind::PartialView,
            ActionResult::Redirect(_) => ResultKind::Redirect,
            ActionResult::Empty => ResultKind::Empty,
        }
    }
}
