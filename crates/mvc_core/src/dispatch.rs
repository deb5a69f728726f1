use shared::{ActionMode, CreationMode, MvcError, MvcResult};
use tracing::{debug, info};

use crate::{
    app::App,
    args::ActionArgs,
    bag::{DataBag, ModeBag},
    controller::ControllerRef,
    lifecycle,
    result::ResultKind,
};

/// How the view produced by a dispatch should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchRequest {
    pub creation: CreationMode,
    pub always_create: bool,
}

impl DispatchRequest {
    pub fn new(creation: CreationMode, always_create: bool) -> Self {
        Self {
            creation,
            always_create,
        }
    }

    /// The request that opens the application's first window.
    pub fn first_window() -> Self {
        Self::new(CreationMode::FirstWindow, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Dialog code, or `-1` when the action did not end in a dialog.
    pub dialog_result: i32,
    pub kind: ResultKind,
}

impl DispatchOutcome {
    pub fn action_mode(&self) -> Option<ActionMode> {
        ActionMode::from_code(self.dialog_result)
    }
}

/// Runs `action` on `controller` and applies the result to the view layer.
///
/// `bag` is handed to the controller for the duration of the action and
/// receives the controller's bag (or the dialog's, for a dialog) afterwards.
/// The controller is not borrowed while the lifecycle manager runs, so a
/// blocking dialog may dispatch back into it.
pub fn dispatch(
    app: &App,
    controller: &ControllerRef,
    action: &str,
    args: ActionArgs,
    request: DispatchRequest,
    bag: &mut DataBag,
) -> MvcResult<DispatchOutcome> {
    if action.trim().is_empty() {
        return Err(MvcError::argument("action", "action name is empty"));
    }
    debug!(
        controller = controller.name(),
        action,
        creation = ?request.creation,
        always_create = request.always_create,
        args = args.len(),
        "dispatching action"
    );

    let (result, mut mode) = {
        let mut cell = controller.borrow_mut()?;
        *cell.mode_mut() = ModeBag::new(request.creation, request.always_create);
        cell.replace_bag(std::mem::take(bag));
        let result = cell.invoke(app, action, args);
        *bag = cell.bag().clone();
        (result?, cell.mode())
    };
    let kind = result.kind();

    lifecycle::apply(app, controller, result, &mut mode, bag)?;

    if let Ok(mut cell) = controller.borrow_mut() {
        cell.mode_mut().dialog_result = mode.dialog_result;
        cell.replace_bag(bag.clone());
    }
    info!(
        controller = controller.name(),
        action,
        result = ?kind,
        dialog_result = mode.dialog_result,
        "action completed"
    );
    Ok(DispatchOutcome {
        dialog_result: mode.dialog_result,
        kind,
    })
}
