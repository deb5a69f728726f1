use shared::MvcResult;
use tracing::debug;

use crate::{
    app::App,
    args::ActionArgs,
    bag::{DataBag, ModeBag},
    controller::ControllerRef,
    dispatch::{self, DispatchRequest},
    result::{ActionResult, RedirectResult},
};

/// Dispatches `action` on `target` with the caller's creation settings and a
/// copy of its data bag. The target's dialog code and bag flow back into the
/// caller's `mode` and `bag`.
pub(crate) fn run(
    app: &App,
    mode: &mut ModeBag,
    bag: &mut DataBag,
    target: &ControllerRef,
    action: &str,
    args: ActionArgs,
) -> MvcResult<ActionResult> {
    debug!(controller = target.name(), action, creation = ?mode.creation, "redirecting");
    let request = DispatchRequest::new(mode.creation, mode.always_create);
    let mut forwarded = bag.clone();
    let outcome = dispatch::dispatch(app, target, action, args, request, &mut forwarded)?;

    mode.dialog_result = outcome.dialog_result;
    bag.merge(&forwarded);
    Ok(ActionResult::Redirect(RedirectResult {
        controller: target.name().to_string(),
        action: action.to_string(),
        dialog_result: outcome.dialog_result,
        bag: forwarded,
    }))
}
