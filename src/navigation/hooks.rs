//! Enter/leave hooks.

use std::time::Instant;

use crate::data::{DataResult, Redirect};
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::routing::{Hook, Location, Params, Query, RouteMatch};

/// What a hook decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Let the transition continue.
    Proceed,
    /// Roll the transition back to the committed state.
    Abort,
    /// Start over at another location, with replace.
    Redirect(Redirect),
}

impl HookOutcome {
    pub fn redirect(to: impl Into<String>) -> Self {
        HookOutcome::Redirect(Redirect::new(to))
    }
}

/// Arguments handed to a hook.
#[derive(Debug, Clone)]
pub struct HookArgs {
    pub route_id: String,
    /// The hooked route's own params (from the chain it belongs to).
    pub params: Params,
    /// Query of the target location.
    pub query: Query,
    /// The transition's target.
    pub location: Location,
    pub signal: CancelSignal,
}

/// Run one hook, timing it.
pub(crate) async fn invoke(
    hook: &Hook,
    route: &RouteMatch,
    location: &Location,
    query: &Query,
    signal: &CancelSignal,
) -> DataResult<HookOutcome> {
    let args = HookArgs {
        route_id: route.route_id.clone(),
        params: route.params.clone(),
        query: query.clone(),
        location: location.clone(),
        signal: signal.clone(),
    };

    let started = Instant::now();
    let result = hook(args).await;
    let label = match &result {
        Ok(HookOutcome::Proceed) => "ok",
        Ok(HookOutcome::Abort) => "abort",
        Ok(HookOutcome::Redirect(_)) | Err(crate::data::DataError::Redirect(_)) => "redirect",
        Err(_) => "error",
    };
    metrics::record_data_run("hook", label, started.elapsed());
    result
}

/// Nearest boundary above a leaving route that is still on screen after the
/// transition. Returns the boundary's route id.
pub(crate) fn surviving_boundary(previous: &[RouteMatch], from: usize, candidate: &[RouteMatch]) -> Option<String> {
    let upper = from.min(previous.len().checked_sub(1)?);
    (0..=upper)
        .rev()
        .map(|i| &previous[i])
        .find(|m| m.route.error_boundary && candidate.iter().any(|c| c.same_as(m)))
        .map(|m| m.route_id.clone())
}
