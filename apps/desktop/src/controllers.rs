use mvc_core::{ActionArgs, ActionContext, ActionResult, ActionTable, BagKey, Controller, MvcResult};
use tracing::info;

use crate::models::{EmpModel, SexModel};

/// Options for the sex combo box of the edit panel.
pub const SEX_OPTIONS: BagKey<Vec<SexModel>> = BagKey::new("emp.sex_options");
/// Written by the dialog, read by whoever opened it.
pub const DIALOG_NOTE: BagKey<String> = BagKey::new("dlg.note");

#[derive(Default)]
pub struct HomeController;

impl Controller for HomeController {
    const NAME: &'static str = "HomeController";

    fn actions(table: &mut ActionTable<Self>) {
        table
            .action0("LoadEmps", Self::load_emps)
            .action0("About", Self::about);
    }
}

impl HomeController {
    fn load_emps(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        cx.redirect_to_action("Index", "EmpController", ActionArgs::none())
    }

    fn about(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        cx.redirect_index::<DlgController>(ActionArgs::none())
    }
}

#[derive(Default)]
pub struct EmpController {
    staff: Vec<EmpModel>,
}

impl Controller for EmpController {
    const NAME: &'static str = "EmpController";

    fn actions(table: &mut ActionTable<Self>) {
        table
            .action0("Refresh", Self::refresh)
            .action0("SaveNewModel", Self::save_new_model)
            .action0("SaveEditModel", Self::save_edit_model)
            .action0("DeleteModel", Self::delete_model)
            .action0("Save", Self::save)
            .action0("Dlg", Self::dlg);
    }

    fn index(&mut self, cx: &mut ActionContext<'_>, _args: ActionArgs) -> MvcResult<ActionResult> {
        if self.staff.is_empty() {
            self.staff = (1..=5).map(|id| EmpModel::named(id, "x")).collect();
        }
        Ok(cx.view_models(self.staff.clone()))
    }
}

impl EmpController {
    fn refresh(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        self.staff = (1..=5).map(|id| EmpModel::named(id, "y")).collect();
        Ok(cx.view_models(self.staff.clone()))
    }

    fn save_new_model(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        let id = self.staff.iter().map(|emp| emp.id).max().unwrap_or(0) + 1;
        self.edit(
            cx,
            EmpModel {
                id,
                ..EmpModel::default()
            },
        )
    }

    fn save_edit_model(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        let mut emp = EmpModel::default();
        cx.update_model(&mut emp)?;
        self.edit(cx, emp)
    }

    fn delete_model(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        let mut emp = EmpModel::default();
        cx.update_model(&mut emp)?;
        self.staff.retain(|existing| existing.id != emp.id);
        info!(id = emp.id, "employee deleted");
        Ok(cx.view_models(self.staff.clone()))
    }

    fn save(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        let mut emp = EmpModel::default();
        cx.update_model(&mut emp)?;
        match self.staff.iter_mut().find(|existing| existing.id == emp.id) {
            Some(existing) => *existing = emp.clone(),
            None => self.staff.push(emp.clone()),
        }
        info!(id = emp.id, name = %emp.name, "employee saved");
        Ok(cx.view_models(self.staff.clone()))
    }

    fn dlg(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        cx.redirect_to_action("Index", "Dlg", ActionArgs::none())
    }

    fn edit(&self, cx: &mut ActionContext<'_>, emp: EmpModel) -> MvcResult<ActionResult> {
        cx.bag_mut().insert(&SEX_OPTIONS, SexModel::data());
        cx.partial_view_named_model("Edit", emp)
    }
}

#[derive(Default)]
pub struct DlgController;

impl Controller for DlgController {
    const NAME: &'static str = "DlgController";

    fn actions(table: &mut ActionTable<Self>) {
        table.action0("Write", Self::write);
    }
}

impl DlgController {
    fn write(&mut self, cx: &mut ActionContext<'_>) -> MvcResult<ActionResult> {
        cx.bag_mut().insert(&DIALOG_NOTE, "xx".to_string());
        Ok(cx.empty())
    }
}
