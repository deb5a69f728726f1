use shared::{Field, Model, ModelValue, MvcError, MvcResult, ToActionFlag, Value};
use tracing::debug;

use crate::{
    args::ActionArgs,
    binder::{BinderState, ViewBinder},
    dispatch::DispatchOutcome,
};

pub const SAVE_NEW_MODEL: &str = "SaveNewModel";
pub const SAVE_EDIT_MODEL: &str = "SaveEditModel";
pub const DELETE_MODEL: &str = "DeleteModel";

/// Identifies the grid row an update copies from.
#[derive(Debug, Clone, PartialEq)]
pub enum GridKey {
    /// The bound model instance itself.
    Instance(ModelValue),
    /// A key column and the value to look up in it.
    Column { name: String, value: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCommand {
    New,
    Edit,
    Delete,
}

impl GridCommand {
    pub fn default_action(self) -> &'static str {
        match self {
            GridCommand::New => SAVE_NEW_MODEL,
            GridCommand::Edit => SAVE_EDIT_MODEL,
            GridCommand::Delete => DELETE_MODEL,
        }
    }
}

/// Grid actions for one row; each records the row's key before dispatching.
pub struct GridActions<'a, M: Model> {
    binder: &'a ViewBinder<M>,
    key: GridKey,
}

impl<'a, M: Model> GridActions<'a, M> {
    pub fn key(&self) -> &GridKey {
        &self.key
    }

    /// Dispatches the new-row action; no key is recorded.
    pub fn action_new(self) -> MvcResult<DispatchOutcome> {
        self.binder.set_grid_key(None);
        self.binder.action(SAVE_NEW_MODEL, ActionArgs::none())
    }

    pub fn action_edit(self) -> MvcResult<DispatchOutcome> {
        self.action_named(SAVE_EDIT_MODEL, ActionArgs::none(), ToActionFlag::ViewActived)
    }

    pub fn action_delete(self) -> MvcResult<DispatchOutcome> {
        self.action_named(DELETE_MODEL, ActionArgs::none(), ToActionFlag::ViewActived)
    }

    pub fn action_named(
        self,
        action: &str,
        args: ActionArgs,
        flag: ToActionFlag,
    ) -> MvcResult<DispatchOutcome> {
        self.binder.set_grid_key(Some(self.key));
        self.binder.action_with(action, args, flag)
    }
}

fn row_not_found(key: &str, value: impl ToString) -> MvcError {
    MvcError::ModelRowNotFound {
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl<M: Model> ViewBinder<M> {
    /// Grid actions for `row` of the bound model sequence or table.
    pub fn grid(&self, row: usize) -> MvcResult<GridActions<'_, M>> {
        let key = self.row_key(row)?;
        Ok(GridActions { binder: self, key })
    }

    pub fn grid_key(&self) -> Option<GridKey> {
        self.state.borrow().grid_key.clone()
    }

    pub fn set_grid_key(&self, key: Option<GridKey>) {
        self.state.borrow_mut().grid_key = key;
    }

    fn row_key(&self, row: usize) -> MvcResult<GridKey> {
        let state = self.state.borrow();
        if let Some(models) = &state.models {
            let model = models.get(row).ok_or_else(|| row_not_found("row", row))?;
            return Ok(GridKey::Instance(ModelValue::new(model.clone())));
        }
        if let Some(table) = &state.table {
            let column = table
                .key_column()
                .ok_or_else(|| MvcError::argument("table", "the bound table has no columns"))?;
            let value = table
                .value(row, &column.name)
                .cloned()
                .ok_or_else(|| row_not_found("row", row))?;
            return Ok(GridKey::Column {
                name: column.name.clone(),
                value,
            });
        }
        Err(row_not_found("row", row))
    }

    pub(crate) fn grid_command(
        &self,
        command: GridCommand,
        row: Option<usize>,
    ) -> MvcResult<DispatchOutcome> {
        debug!(view = self.view_name(), ?command, ?row, "grid command");
        match (command, row) {
            (GridCommand::New, _) => {
                self.set_grid_key(None);
                self.action(command.default_action(), ActionArgs::none())
            }
            (_, None) => Err(MvcError::argument("row", "no grid row is selected")),
            (GridCommand::Edit, Some(row)) => self.grid(row)?.action_edit(),
            (GridCommand::Delete, Some(row)) => self.grid(row)?.action_delete(),
        }
    }

    /// Copies the row named by the recorded grid key onto `target`. No key
    /// means nothing was selected and nothing is copied.
    pub(crate) fn update_from_grid(&self, state: &BinderState<M>, target: &mut M) -> MvcResult<()> {
        match &state.grid_key {
            None => Ok(()),
            Some(GridKey::Instance(instance)) => copy_instance(&self.fields, instance, target),
            Some(GridKey::Column { name, value }) => {
                if let Some(table) = &state.table {
                    let row = table
                        .find_row(name, value)
                        .ok_or_else(|| row_not_found(name, value))?;
                    return table.copy_row_into(row, target);
                }
                if let Some(models) = &state.models {
                    let field = self
                        .fields
                        .iter()
                        .find(|field| field.name().eq_ignore_ascii_case(name))
                        .ok_or_else(|| MvcError::UnknownModelField {
                            model: M::NAME.to_string(),
                            field: name.clone(),
                        })?;
                    let found = models
                        .iter()
                        .find(|model| key_matches(&field.get(model), value))
                        .ok_or_else(|| row_not_found(name, value))?;
                    return copy_instance(&self.fields, &ModelValue::new(found.clone()), target);
                }
                Err(row_not_found(name, value))
            }
        }
    }
}

fn key_matches(cell: &Value, key: &Value) -> bool {
    if cell == key {
        return true;
    }
    match cell.value_type() {
        Some(ty) => key.convert_to(ty).is_ok_and(|key| &key == cell),
        None => false,
    }
}

/// Copies every same-named property of `instance` onto `target`; nulls only
/// reach nullable fields. Keeps going past a failed field and reports the
/// first one.
fn copy_instance<M: Model>(fields: &[Field<M>], instance: &ModelValue, target: &mut M) -> MvcResult<()> {
    let mut first_failure = None;
    for (name, value) in instance.values() {
        let Some(field) = fields.iter().find(|field| field.name().eq_ignore_ascii_case(name)) else {
            continue;
        };
        if value.is_null() && !field.is_nullable() {
            continue;
        }
        if let Err(source) = field.assign(target, value) {
            first_failure.get_or_insert(MvcError::ModelUpdate {
                field: field.name().to_string(),
                source,
            });
        }
    }
    first_failure.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_across_compatible_types() {
        assert!(key_matches(&Value::Int(3), &Value::from("3")));
        assert!(!key_matches(&Value::Int(3), &Value::from("4")));
        assert!(!key_matches(&Value::Null, &Value::Int(0)));
    }

    #[test]
    fn commands_default_to_conventional_action_names() {
        assert_eq!(GridCommand::Edit.default_action(), "SaveEditModel");
        assert_eq!(GridCommand::New.default_action(), "SaveNewModel");
        assert_eq!(GridCommand::Delete.default_action(), "DeleteModel");
    }
}
