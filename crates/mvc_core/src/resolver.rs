use shared::{MvcError, MvcResult, Value};
use tracing::{debug, warn};

use crate::{action::ActionSignature, config::FallbackPolicy};

/// Picks the one action of `candidates` that `action` with `args` should run,
/// returning its index.
///
/// Exact-name matches of the right arity win; otherwise the name is matched
/// ignoring case, subject to `policy`. Several same-arity matches are narrowed
/// to the one whose parameter types equal the argument types exactly; two
/// overloads with identical parameter types never resolve.
pub fn resolve<S: ActionSignature>(
    controller: &str,
    candidates: &[S],
    action: &str,
    args: &[Value],
    policy: FallbackPolicy,
) -> MvcResult<usize> {
    let arity = args.len();
    let mut matches: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name() == action && c.params().len() == arity)
        .map(|(index, _)| index)
        .collect();

    if matches.is_empty() {
        let relaxed: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name().eq_ignore_ascii_case(action) && c.params().len() == arity)
            .map(|(index, _)| index)
            .collect();
        if let Some(first) = relaxed.first().map(|&index| candidates[index].name()) {
            match policy {
                FallbackPolicy::Allow => {
                    debug!(controller, requested = action, matched = first, "action matched ignoring case");
                    matches = relaxed;
                }
                FallbackPolicy::Warn => {
                    warn!(controller, requested = action, matched = first, "action matched ignoring case");
                    matches = relaxed;
                }
                FallbackPolicy::Deny => {
                    warn!(controller, requested = action, matched = first, "case-insensitive action match rejected");
                }
            }
        }
    }

    match matches.as_slice() {
        [] => Err(MvcError::ActionNotFound {
            controller: controller.to_string(),
            action: action.to_string(),
            arity,
        }),
        [only] => Ok(*only),
        several => {
            let ambiguous = || MvcError::ActionAmbiguous {
                controller: controller.to_string(),
                action: action.to_string(),
            };
            let Some(arg_types) = args.iter().map(Value::value_type).collect::<Option<Vec<_>>>() else {
                return Err(ambiguous());
            };
            let mut exact = several
                .iter()
                .copied()
                .filter(|&index| candidates[index].params() == arg_types.as_slice());
            match (exact.next(), exact.next()) {
                (Some(index), None) => Ok(index),
                _ => Err(ambiguous()),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
