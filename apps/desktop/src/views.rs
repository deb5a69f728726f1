use std::{any::Any, cell::RefCell, rc::Rc};

use mvc_core::{ActionArgs, GridCommand, MvcResult, ToActionFlag, View, ViewBinder};

use crate::{
    controllers::{DIALOG_NOTE, SEX_OPTIONS},
    models::{Blank, EmpModel, SexModel},
    widgets::{Button, ComboBox, DatePicker, Grid, Panel, TextBox, Widget, SELECTED_VALUE},
};

fn surface(panel: &Rc<Panel>) -> Option<Rc<dyn Any>> {
    Some(Rc::clone(panel) as Rc<dyn Any>)
}

/// Main window: a menu hosting the employee list as a child window.
pub struct HomeView {
    binder: Option<Rc<ViewBinder<Blank>>>,
    emps: Rc<Button>,
    about: Rc<Button>,
    panel: Rc<Panel>,
}

impl Default for HomeView {
    fn default() -> Self {
        let emps = Button::new("emps", "Employees");
        let about = Button::new("about", "About");
        let panel = Panel::new(
            "Home",
            true,
            vec![emps.clone() as Rc<dyn Widget>, about.clone() as Rc<dyn Widget>],
        );
        Self {
            binder: None,
            emps,
            about,
            panel,
        }
    }
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

    fn register(&mut self, mvc: &ViewBinder<Blank>) -> MvcResult<()> {
        mvc.action_click(&self.emps, "LoadEmps", ActionArgs::none(), ToActionFlag::ChildActived);
        mvc.action_click_dialog(&self.about, "About", ActionArgs::none(), |mode| {
            println!("about closed with {}", mode.label());
        });
        Ok(())
    }

    fn native(&self) -> Option<Rc<dyn Any>> {
        surface(&self.panel)
    }
}

/// Employee list with the edit panel mounted below it.
pub struct EmpView {
    binder: Option<Rc<ViewBinder<EmpModel>>>,
    grid: Rc<Grid>,
    new: Rc<Button>,
    edit: Rc<Button>,
    delete: Rc<Button>,
    refresh: Rc<Button>,
    dialog: Rc<Button>,
    editor: Rc<RefCell<EmpEditView>>,
    panel: Rc<Panel>,
}

impl Default for EmpView {
    fn default() -> Self {
        let grid = Grid::new("grid");
        let new = Button::new("new", "New");
        let edit = Button::new("edit", "Edit");
        let delete = Button::new("delete", "Delete");
        let refresh = Button::new("refresh", "Refresh");
        let dialog = Button::new("dialog", "Dialog");
        let editor = EmpEditView::default();
        let mut widgets: Vec<Rc<dyn Widget>> = vec![
            grid.clone(),
            new.clone(),
            edit.clone(),
            delete.clone(),
            refresh.clone(),
            dialog.clone(),
        ];
        widgets.extend(editor.widgets());
        Self {
            binder: None,
            grid,
            new,
            edit,
            delete,
            refresh,
            dialog,
            editor: Rc::new(RefCell::new(editor)),
            panel: Panel::new("Employees", false, widgets),
        }
    }
}

impl View for EmpView {
    type Model = EmpModel;
    const NAME: &'static str = "Emp";

    fn binder(&self) -> Option<Rc<ViewBinder<EmpModel>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<EmpModel>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, mvc: &ViewBinder<EmpModel>) -> MvcResult<()> {
        mvc.partial(&self.editor);
        mvc.fill_data_source(&self.grid);
        mvc.action_click_grid(&self.new, &self.grid, GridCommand::New);
        mvc.action_click_grid(&self.edit, &self.grid, GridCommand::Edit);
        mvc.action_click_grid(&self.delete, &self.grid, GridCommand::Delete);
        mvc.action_click(&self.refresh, "Refresh", ActionArgs::none(), ToActionFlag::ViewActived);

        let binder = self.binder.as_ref().map(Rc::downgrade);
        mvc.action_click_dialog(&self.dialog, "Dlg", ActionArgs::none(), move |mode| {
            let note = binder
                .as_ref()
                .and_then(|binder| binder.upgrade())
                .and_then(|binder| binder.bag().get_cloned(&DIALOG_NOTE))
                .unwrap_or_default();
            println!("dialog closed with {} note={note:?}", mode.label());
        });
        Ok(())
    }

    fn native(&self) -> Option<Rc<dyn Any>> {
        surface(&self.panel)
    }
}

/// Partial view editing one employee.
pub struct EmpEditView {
    binder: Option<Rc<ViewBinder<EmpModel>>>,
    id: Rc<TextBox>,
    name: Rc<TextBox>,
    sex: Rc<ComboBox>,
    birthday: Rc<DatePicker>,
    save: Rc<Button>,
}

impl Default for EmpEditView {
    fn default() -> Self {
        Self {
            binder: None,
            id: TextBox::new("edit.id"),
            name: TextBox::new("edit.name"),
            sex: ComboBox::new("edit.sex"),
            birthday: DatePicker::new("edit.birthday"),
            save: Button::new("edit.save", "Save"),
        }
    }
}

impl EmpEditView {
    fn widgets(&self) -> Vec<Rc<dyn Widget>> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.sex.clone(),
            self.birthday.clone(),
            self.save.clone(),
        ]
    }
}

impl View for EmpEditView {
    type Model = EmpModel;
    const NAME: &'static str = "EmpEdit";

    fn binder(&self) -> Option<Rc<ViewBinder<EmpModel>>> {
        self.binder.clone()
    }

    fn set_binder(&mut self, binder: Rc<ViewBinder<EmpModel>>) {
        self.binder = Some(binder);
    }

    fn register(&mut self, mvc: &ViewBinder<EmpModel>) -> MvcResult<()> {
        mvc.for_text(&self.id, "ID")?;
        mvc.for_text(&self.name, "Name")?;
        let options = mvc.bag().get_cloned(&SEX_OPTIONS).unwrap_or_else(SexModel::data);
        mvc.fill_data_list(&self.sex, &options, "Value", "Name")?;
        mvc.for_known(&self.sex, SELECTED_VALUE, "Sex")?;
        mvc.for_value(&self.birthday, "Birthday")?;
        mvc.action_click(&self.save, "Save", ActionArgs::none(), ToActionFlag::ViewActived);
        Ok(())
    }
}

/// Modal dialog writing a note into the shared bag.
pub struct DlgView {
    binder: Option<Rc<ViewBinder<Blank>>>,
    write: Rc<Button>,
    panel: Rc<Panel>,
}

impl Default for DlgView {
    fn default() -> Self {
        let write = Button::new("write", "Write note");
        let panel = Panel::new("Dialog", false, vec![write.clone() as Rc<dyn Widget>]);
        Self {
            binder: None,
            write,
            panel,
        }
    }
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

    fn register(&mut self, mvc: &ViewBinder<Blank>) -> MvcResult<()> {
        mvc.action_click(&self.write, "Write", ActionArgs::none(), ToActionFlag::ViewActived);
        Ok(())
    }

    fn native(&self) -> Option<Rc<dyn Any>> {
        surface(&self.panel)
    }
}
