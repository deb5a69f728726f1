//! Text-mode widgets implementing the binder's control capabilities.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use mvc_core::{
    ClickHandler, Clickable, Control, DataTable, HasDataSource, HasItems, HasProperty, HasText,
    HasValue, ListItem,
};
use shared::{ControlId, MvcError, MvcResult, Value, ValueType};

thread_local! {
    static NEXT_CONTROL: Cell<i64> = const { Cell::new(1) };
}

fn next_control_id() -> ControlId {
    NEXT_CONTROL.with(|next| {
        let id = next.get();
        next.set(id + 1);
        ControlId(id)
    })
}

fn unsupported(widget: &str, what: &str) -> MvcError {
    MvcError::argument(widget.to_string(), format!("control does not accept {what}"))
}

/// A control the terminal can render and drive by name.
pub trait Widget {
    fn name(&self) -> &str;

    fn render(&self) -> String;

    fn input(&self, _text: &str) -> MvcResult<()> {
        Err(unsupported(self.name(), "text"))
    }

    fn pick(&self, _index: usize) -> MvcResult<()> {
        Err(unsupported(self.name(), "a selection"))
    }

    fn click(&self) -> MvcResult<()> {
        Err(unsupported(self.name(), "clicks"))
    }
}

pub struct TextBox {
    id: ControlId,
    name: &'static str,
    text: RefCell<String>,
}

impl TextBox {
    pub fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            id: next_control_id(),
            name,
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

impl Widget for TextBox {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self) -> String {
        format!("{:<14} [{}]", self.name, self.text.borrow())
    }

    fn input(&self, text: &str) -> MvcResult<()> {
        self.set_text(text);
        Ok(())
    }
}

/// Drop-down list exposing its selection as the `SelectedValue` property.
pub struct ComboBox {
    id: ControlId,
    name: &'static str,
    items: RefCell<Vec<ListItem>>,
    selected: Cell<Option<usize>>,
}

pub const SELECTED_VALUE: &str = "SelectedValue";

impl ComboBox {
    pub fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            id: next_control_id(),
            name,
            items: RefCell::new(Vec::new()),
            selected: Cell::new(None),
        })
    }
}

impl Control for ComboBox {
    fn control_id(&self) -> ControlId {
        self.id
    }
}

impl HasItems for ComboBox {
    fn set_items(&self, items: Vec<ListItem>) {
        *self.items.borrow_mut() = items;
        self.selected.set(None);
    }
}

impl HasProperty for ComboBox {
    fn property(&self, name: &str) -> Option<Value> {
        if !name.eq_ignore_ascii_case(SELECTED_VALUE) {
            return None;
        }
        let items = self.items.borrow();
        Some(
            self.selected
                .get()
                .and_then(|index| items.get(index))
                .map_or(Value::Null, |item| item.value.clone()),
        )
    }

    fn set_property(&self, name: &str, value: Value) -> bool {
        if !name.eq_ignore_ascii_case(SELECTED_VALUE) {
            return false;
        }
        let index = self.items.borrow().iter().position(|item| item.value == value);
        self.selected.set(index);
        true
    }
}

impl Widget for ComboBox {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self) -> String {
        let items = self.items.borrow();
        let options: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if Some(index) == self.selected.get() {
                    format!("<{}>", item.display)
                } else {
                    item.display.clone()
                }
            })
            .collect();
        format!("{:<14} ({})", self.name, options.join(" | "))
    }

    fn input(&self, text: &str) -> MvcResult<()> {
        let index = self
            .items
            .borrow()
            .iter()
            .position(|item| item.display.eq_ignore_ascii_case(text.trim()))
            .ok_or_else(|| MvcError::argument(self.name, format!("no option named '{text}'")))?;
        self.selected.set(Some(index));
        Ok(())
    }

    fn pick(&self, index: usize) -> MvcResult<()> {
        if index >= self.items.borrow().len() {
            return Err(MvcError::argument(self.name, format!("no option {index}")));
        }
        self.selected.set(Some(index));
        Ok(())
    }
}

/// Date entry; blank input clears the value.
pub struct DatePicker {
    id: ControlId,
    name: &'static str,
    value: RefCell<Value>,
}

impl DatePicker {
    pub fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            id: next_control_id(),
            name,
            value: RefCell::new(Value::Null),
        })
    }
}

impl Control for DatePicker {
    fn control_id(&self) -> ControlId {
        self.id
    }
}

impl HasValue for DatePicker {
    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }
}

impl Widget for DatePicker {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self) -> String {
        format!("{:<14} [{}]", self.name, self.value.borrow().as_text())
    }

    fn input(&self, text: &str) -> MvcResult<()> {
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            Value::from(text)
                .convert_to(ValueType::DateTime)
                .map_err(|err| MvcError::argument(self.name, err.to_string()))?
        };
        self.set_value(value);
        Ok(())
    }
}

#[derive(Default)]
struct GridState {
    table: Option<Rc<DataTable>>,
    selected: Option<usize>,
}

pub struct Grid {
    id: ControlId,
    name: &'static str,
    state: RefCell<GridState>,
}

impl Grid {
    pub fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            id: next_control_id(),
            name,
            state: RefCell::new(GridState::default()),
        })
    }
}

impl Control for Grid {
    fn control_id(&self) -> ControlId {
        self.id
    }
}

impl HasDataSource for Grid {
    fn set_data_source(&self, table: Rc<DataTable>) {
        let mut state = self.state.borrow_mut();
        state.selected = state.selected.filter(|row| *row < table.len());
        state.table = Some(table);
    }

    fn selected_row(&self) -> Option<usize> {
        self.state.borrow().selected
    }
}

impl Widget for Grid {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self) -> String {
        let state = self.state.borrow();
        let Some(table) = &state.table else {
            return format!("{:<14} (no data)", self.name);
        };
        let header: Vec<&str> = table.columns().iter().map(|column| column.name.as_str()).collect();
        let mut out = format!("{:<14} {}", self.name, header.join(", "));
        for (index, row) in table.rows().iter().enumerate() {
            let cells = serde_json::Value::Array(row.iter().map(Value::to_json).collect());
            let marker = if state.selected == Some(index) { '>' } else { ' ' };
            out.push_str(&format!("\n  {marker}{index:>3} {cells}"));
        }
        out
    }

    fn pick(&self, index: usize) -> MvcResult<()> {
        let mut state = self.state.borrow_mut();
        let rows = state.table.as_ref().map_or(0, |table| table.len());
        if index >= rows {
            return Err(MvcError::argument(self.name, format!("no row {index}")));
        }
        state.selected = Some(index);
        Ok(())
    }
}

/// Button or menu item.
pub struct Button {
    id: ControlId,
    name: &'static str,
    caption: &'static str,
    handler: RefCell<Option<ClickHandler>>,
}

impl Button {
    pub fn new(name: &'static str, caption: &'static str) -> Rc<Self> {
        Rc::new(Self {
            id: next_control_id(),
            name,
            caption,
            handler: RefCell::new(None),
        })
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

impl Widget for Button {
    fn name(&self) -> &str {
        self.name
    }

    fn render(&self) -> String {
        format!("{:<14} <{}>", self.name, self.caption)
    }

    fn click(&self) -> MvcResult<()> {
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => handler(),
            None => Ok(()),
        }
    }
}

/// The native surface of a view: a titled list of widgets.
pub struct Panel {
    pub title: &'static str,
    /// Hosts child windows (an MDI container).
    pub container: bool,
    widgets: Vec<Rc<dyn Widget>>,
}

impl Panel {
    pub fn new(title: &'static str, container: bool, widgets: Vec<Rc<dyn Widget>>) -> Rc<Self> {
        Rc::new(Self {
            title,
            container,
            widgets,
        })
    }

    pub fn widget(&self, name: &str) -> Option<Rc<dyn Widget>> {
        self.widgets
            .iter()
            .find(|widget| widget.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn render(&self) -> String {
        let mut out = format!("== {} ==", self.title);
        for widget in &self.widgets {
            out.push('\n');
            out.push_str(&widget.render());
        }
        out
    }
}
