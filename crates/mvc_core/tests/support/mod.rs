#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use mvc_core::{
    fields, ActionArgs, ActionContext, ActionMode, ActionResult, ActionTable, App, BagKey,
    ClickHandler, Clickable, Control, ControlId, Controller, Field, HasText, Model, MvcResult,
    MvcSettings, ParamRecord, ToActionFlag, Toolkit, Value, View, ViewBinder, Window,
};

pub const NOTE: BagKey<String> = BagKey::new("test.note");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emp {
    pub id: i64,
    pub name: String,
}

impl Model for Emp {
    const NAME: &'static str = "Emp";

    fn fields() -> Vec<Field<Self>> {
        fields!(Emp {
            id: i64 => "Id",
            name: String => "Name",
        })
    }
}

impl Emp {
    pub fn sample() -> Self {
        Self {
            id: 7,
            name: "Ann".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Blank;

impl Model for Blank {
    const NAME: &'static str = "Blank";

    fn fields() -> Vec<Field<Self>> {
        Vec::new()
    }
}

pub struct SaveParams {
    pub id: i64,
    pub name: &'static str,
}

impl ParamRecord for SaveParams {
    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.id), Value::from(self.name)]
    }
}

pub struct TextBox {
    id: ControlId,
    text: RefCell<String>,
}

impl TextBox {
    pub fn new(id: i64) -> Rc<Self> {
        Rc::new(Self {
            id: ControlId(id),
            text: RefCell::new(String::new()),
        })
    }
}

impl Control for TextBox {
    fn control_id(&self) -> ControlId {
        self.id
    }
}

impl HasText for TextBox {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
}

pub struct Button {
    id: ControlId,
    handler: RefCell<Option<ClickHandler>>,
}

impl Button {
    pub fn new(id: i64) -> Rc<Self> {
        Rc::new(Self {
            id: ControlId(id),
            handler: RefCell::new(None),
        })
    }

    pub fn click(&self) -> MvcResult<()> {
        let handler = self.handler.borrow().clone();
        handler.map_or(Ok(()), |handler| handler())
    }
}

impl Control for Button {
    fn control_id(&self) -> ControlId {
        self.id
    }
}

impl Clickable for Button {
    fn on_click(&self, handler: ClickHandler) {
        *self.handler.borrow_mut() = Some(handler);
    }
}

type ModalHandler = Box<dyn Fn(&Window) -> ActionMode>;

/// Records what the lifecycle manager asks of the host.
#[derive(Default)]
pub struct FakeToolkit {
    open: RefCell<Vec<Window>>,
    events: RefCell<Vec<String>>,
    modal: RefCell<Option<ModalHandler>>,
    container: RefCell<Option<Window>>,
}

impl FakeToolkit {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn open(&self) -> Vec<Window> {
        self.open.borrow().clone()
    }

    pub fn on_modal(&self, handler: impl Fn(&Window) -> ActionMode + 'static) {
        *self.modal.borrow_mut() = Some(Box::new(handler));
    }

    pub fn set_container(&self, window: Option<Window>) {
        *self.container.borrow_mut() = window;
    }

    pub fn close(&self, window: &Window) {
        self.open.borrow_mut().retain(|open| !open.ptr_eq(window));
        self.record(format!("close {} {}", window.view_key(), window.id()));
        window.notify_closed();
    }

    fn record(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl Toolkit for FakeToolkit {
    fn open_windows(&self) -> usize {
        self.open.borrow().len()
    }

    fn mdi_container(&self) -> Option<Window> {
        self.container.borrow().clone()
    }

    fn show(&self, window: &Window, parent: Option<&Window>) {
        match parent {
            Some(parent) => self.record(format!("show {} {} in {}", window.view_key(), window.id(), parent.id())),
            None => self.record(format!("show {} {}", window.view_key(), window.id())),
        }
        self.open.borrow_mut().push(window.clone());
    }

    fn activate(&self, window: &Window) {
        self.record(format!("activate {} {}", window.view_key(), window.id()));
    }

    fn show_modal(&self, window: &Window) -> ActionMode {
        self.record(format!("modal {} {}", window.view_key(), window.id()));
        let modal = self.modal.borrow();
        let code = modal.as_ref().map_or(ActionMode::Cancel, |handler| handler(window));
        self.record(format!("modal closed {}", code.label()));
        code
    }

    fn run(&self, window: &Window) {
        self.record(format!("run {} {}", window.view_key(), window.id()));
        self.open.borrow_mut().push(window.clone());
    }
}

#[derive(Default)]
pub struct HomeController;

impl Controller for HomeController {
    const NAME: &'static str = "HomeController";

    fn actions(_table: &mut ActionTable<Self>) {}
}

#[derive(Default)]
pub struct EmpController {
    pub picked: Vec<String>,
    pub saved: Vec<(i64, String)>,
    pub updates: Vec<(bool, Emp)>,
}

impl Controller for EmpController {
    const NAME: &'static str = "EmpController";

    fn actions(table: &mut ActionTable<Self>) {
        table
            .action0("Show", Self::show)
            .action1("Pick", Self::pick_id)
            .action1("Pick", Self::pick_name)
            .action1("Rename", Self::rename)
            .action2("Save", Self::save)
            .action0("Update", Self::update)
            .action1("EditPartial", Self::edit_partial)
            .action0("Confirm", Self::confirm)
            .action0("Lost", Self::lost);
    }
}

impl EmpController {
    fn show(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        Ok(cx.view_model(Emp::sample()))
    }

    fn pick_id(&mut self, cx: &mut ActionContext<'_>, id: i64) -> MvcResult<ActionResult> {
        self.picked.push(format!("id:{id}"));
        Ok(cx.empty())
    }

    fn pick_name(&mut self, cx: &mut ActionContext<'_>, name: String) -> MvcResult<ActionResult> {
        self.picked.push(format!("name:{name}"));
        Ok(cx.empty())
    }

    fn rename(&mut self, cx: &mut ActionContext<'_>, name: String) -> MvcResult<ActionResult> {
        self.picked.push(format!("rename:{name}"));
        Ok(cx.empty())
    }

    fn save(&mut self, cx: &mut ActionContext<'_>, id: i64, name: String) -> MvcResult<ActionResult> {
        self.saved.push((id, name));
        Ok(cx.empty())
    }

    fn update(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        let mut emp = Emp::default();
        let applied = cx.try_update_model(&mut emp);
        self.updates.push((applied, emp));
        Ok(cx.empty())
    }

    fn edit_partial(&mut self, cx: &mut ActionContext<'_>, id: i64) -> MvcResult<ActionResult> {
        cx.partial_view_named_model(
            "Edit",
            Emp {
                id,
                name: format!("emp {id}"),
            },
        )
    }

    fn confirm(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        cx.redirect_to_action("Index", "Dlg", ActionArgs::none())
    }

    fn lost(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        cx.redirect_to_action("Index", "Nowhere", ActionArgs::none())
    }
}

#[derive(Default)]
pub struct DlgController;

impl Controller for DlgController {
    const NAME: &'static str = "DlgController";

    fn actions(_table: &mut ActionTable<Self>) {}
}

/// Its view is registered as a plain window.
#[derive(Default)]
pub struct LegacyController;

impl Controller for LegacyController {
    const NAME: &'static str = "LegacyController";

    fn actions(_table: &mut ActionTable<Self>) {}
}

/// Has no view at all.
#[derive(Default)]
pub struct GhostController;

impl Controller for GhostController {
    const NAME: &'static str = "GhostController";

    fn actions(_table: &mut ActionTable<Self>) {}
}

#[derive(Default)]
pub struct HomeView {
    binder: Option<Rc<ViewBinder<Blank>>>,
}

impl View for HomeView {
    type Model = Blank;
    const NAME: &'static str = "Home";

    fn binder(&self) -> Option<Rc<ViewBinder<Blank>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<Blank>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, _mvc: &ViewBinder<Blank>) -> MvcResult<()> {
        Ok(())
    }
}

pub struct EmpView {
    binder: Option<Rc<ViewBinder<Emp>>>,
    pub id: Rc<TextBox>,
    pub name: Rc<TextBox>,
    pub save: Rc<Button>,
    pub edit: Rc<RefCell<EmpEditView>>,
    pub registrations: Cell<u32>,
}

impl Default for EmpView {
    fn default() -> Self {
        Self {
            binder: None,
            id: TextBox::new(1),
            name: TextBox::new(2),
            save: Button::new(3),
            edit: Rc::new(RefCell::new(EmpEditView::default())),
            registrations: Cell::new(0),
        }
    }
}

impl View for EmpView {
    type Model = Emp;
    const NAME: &'static str = "Emp";

    fn binder(&self) -> Option<Rc<ViewBinder<Emp>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<Emp>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, mvc: &ViewBinder<Emp>) -> MvcResult<()> {
        self.registrations.set(self.registrations.get() + 1);
        mvc.for_text(&self.id, "Id")?;
        mvc.for_text(&self.name, "Name")?;
        mvc.action_click(&self.save, "Update", ActionArgs::none(), ToActionFlag::ViewActived);
        mvc.partial(&self.edit);
        Ok(())
    }
}

pub struct EmpEditView {
    binder: Option<Rc<ViewBinder<Emp>>>,
    pub name: Rc<TextBox>,
}

impl Default for EmpEditView {
    fn default() -> Self {
        Self {
            binder: None,
            name: TextBox::new(20),
        }
    }
}

impl View for EmpEditView {
    type Model = Emp;
    const NAME: &'static str = "EmpEdit";

    fn binder(&self) -> Option<Rc<ViewBinder<Emp>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<Emp>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, mvc: &ViewBinder<Emp>) -> MvcResult<()> {
        mvc.for_text(&self.name, "Name")
    }
}

#[derive(Default)]
pub struct DlgView {
    binder: Option<Rc<ViewBinder<Blank>>>,
}

impl View for DlgView {
    type Model = Blank;
    const NAME: &'static str = "Dlg";

    fn binder(&self) -> Option<Rc<ViewBinder<Blank>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<Blank>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, _mvc: &ViewBinder<Blank>) -> MvcResult<()> {
        Ok(())
    }
}

pub fn app_with(settings: MvcSettings, toolkit: &Rc<FakeToolkit>) -> App {
    App::builder(settings, Rc::clone(toolkit) as Rc<dyn Toolkit>)
        .controller::<HomeController>()
        .controller::<EmpController>()
        .controller::<DlgController>()
        .controller::<LegacyController>()
        .controller::<GhostController>()
        .view::<HomeView>()
        .view::<EmpView>()
        .partial::<EmpEditView>()
        .view::<DlgView>()
        .window("Legacy")
        .build()
        .expect("app")
}

pub fn app(toolkit: &Rc<FakeToolkit>) -> App {
    app_with(MvcSettings::default(), toolkit)
}

/// An application whose home window is already running.
pub fn started(toolkit: &Rc<FakeToolkit>) -> App {
    let app = app(toolkit);
    app.run_default(ActionArgs::none()).expect("home window");
    app
}
