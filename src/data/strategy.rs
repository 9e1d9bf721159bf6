//! Loader/action orchestration for one transition.
//!
//! # Responsibilities
//! - Run a submission's action first, to completion
//! - Decide which routes load: every entering route, plus shared routes
//!   whose revalidation decision says so
//! - Run the chosen loaders concurrently and collect data and failures
//! - Abandon the batch on the first redirect
//!
//! # Design Decisions
//! - Loaders never depend on each other; completion order is irrelevant
//! - A redirect raises the transition's cancel flag and drops the siblings
//! - Failures never stop sibling loaders

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::data::boundary::Failures;
use crate::data::revalidation::RevalidationInput;
use crate::data::types::{ActionArgs, DataError, FailureKind, LoaderArgs, Redirect, RouteFailure, Submission};
use crate::lifecycle::CancelHandle;
use crate::navigation::diff::TransitionDiff;
use crate::observability::metrics;
use crate::routing::{Location, Params, Query, RouteMatch};

/// Everything the strategy needs to resolve one transition.
pub struct DataRequest<'a> {
    /// Matches of the committed state.
    pub previous_matches: &'a [RouteMatch],
    pub previous_query: &'a Query,
    /// Candidate matches.
    pub matches: &'a [RouteMatch],
    pub diff: &'a TransitionDiff,
    pub location: &'a Location,
    pub query: &'a Query,
    pub submission: Option<Submission>,
    /// Already-resolved data for entering routes, consumed here.
    pub hydrated: HashMap<String, Value>,
    pub cancel: &'a CancelHandle,
}

/// Outcome of [`resolve`].
#[derive(Debug)]
pub enum Resolution {
    Resolved(ResolvedData),
    Redirect(Redirect),
}

/// Data produced by a transition, ready to merge into committed state.
#[derive(Debug, Default)]
pub struct ResolvedData {
    pub loader_data: HashMap<String, Value>,
    /// Routes whose loader ran, successfully or not.
    pub attempted: HashSet<String>,
    /// `(route_id, result)` of a successful action.
    pub action: Option<(String, Value)>,
    pub failures: Failures,
}

/// Resolve data for a candidate chain.
pub async fn resolve(mut request: DataRequest<'_>) -> Resolution {
    let mut resolved = ResolvedData::default();
    let mut action_result = None;

    if let Some(submission) = request.submission.take() {
        match run_action(&request, submission).await {
            ActionStep::Skipped => {}
            ActionStep::Succeeded { index, value } => {
                let target = &request.matches[index];
                // Without a loader the action's output is the route's data
                if target.route.loader.is_none() {
                    resolved.loader_data.insert(target.route_id.clone(), value.clone());
                }
                resolved.action = Some((target.route_id.clone(), value.clone()));
                action_result = Some(value);
            }
            ActionStep::Failed { index, failure } => {
                resolved.failures.record(request.matches, index, failure);
            }
            ActionStep::Redirect(redirect) => {
                request.cancel.cancel();
                return Resolution::Redirect(redirect);
            }
        }
    }

    let indices = plan_loads(&mut request, action_result.as_ref(), &mut resolved);

    let batch = LoaderBatch {
        matches: request.matches,
        indices,
        location: request.location,
        query: request.query,
        action_result,
        cancel: request.cancel,
    };

    match run_loaders(batch).await {
        Ok(output) => {
            resolved.loader_data.extend(output.data);
            resolved.attempted.extend(output.attempted);
            resolved.failures.merge(output.failures);
            Resolution::Resolved(resolved)
        }
        Err(redirect) => Resolution::Redirect(redirect),
    }
}

enum ActionStep {
    Skipped,
    Succeeded { index: usize, value: Value },
    Failed { index: usize, failure: RouteFailure },
    Redirect(Redirect),
}

async fn run_action(request: &DataRequest<'_>, submission: Submission) -> ActionStep {
    let Some(index) = request.matches.len().checked_sub(1) else {
        return ActionStep::Skipped;
    };
    let target = &request.matches[index];

    let Some(action) = target.route.action.clone() else {
        tracing::warn!(route_id = %target.route_id, method = %submission.method, "Submission to a route without an action");
        return ActionStep::Failed {
            index,
            failure: RouteFailure::new(
                FailureKind::Action,
                &target.route_id,
                format!("route `{}` does not handle {} submissions", target.route_id, submission.method),
                Some(405),
            ),
        };
    };

    let args = ActionArgs {
        route_id: target.route_id.clone(),
        params: target.params.clone(),
        location: request.location.clone(),
        query: request.query.clone(),
        submission,
        signal: request.cancel.signal(),
    };

    let started = Instant::now();
    let result = action(args).await;
    let elapsed = started.elapsed();

    match result {
        Ok(value) => {
            metrics::record_data_run("action", "ok", elapsed);
            ActionStep::Succeeded { index, value }
        }
        Err(DataError::Redirect(redirect)) => {
            metrics::record_data_run("action", "redirect", elapsed);
            tracing::info!(route_id = %target.route_id, to = %redirect.to, "Action redirected");
            ActionStep::Redirect(redirect)
        }
        Err(DataError::Failed { message, status }) => {
            metrics::record_data_run("action", "error", elapsed);
            ActionStep::Failed {
                index,
                failure: RouteFailure::new(FailureKind::Action, &target.route_id, message, status),
            }
        }
    }
}

/// Pick the match indices whose loaders must run.
fn plan_loads(request: &mut DataRequest<'_>, action_result: Option<&Value>, resolved: &mut ResolvedData) -> Vec<usize> {
    let empty = Params::new();
    let current_location_params = request.previous_matches.last().map(|m| &m.params).unwrap_or(&empty);
    let next_location_params = request.matches.last().map(|m| &m.params).unwrap_or(&empty);

    let mut indices = Vec::new();
    for (i, next) in request.matches.iter().enumerate() {
        if next.route.loader.is_none() {
            continue;
        }

        if request.diff.is_entering(i) {
            if let Some(value) = request.hydrated.remove(&next.route_id) {
                tracing::debug!(route_id = %next.route_id, "Using hydrated data");
                resolved.loader_data.insert(next.route_id.clone(), value);
            } else {
                indices.push(i);
            }
            continue;
        }

        let Some(current) = request.previous_matches.iter().find(|m| m.same_as(next)) else {
            indices.push(i);
            continue;
        };

        let input = RevalidationInput {
            current,
            next,
            current_location_params,
            next_location_params,
            current_query: request.previous_query,
            next_query: request.query,
            action_result,
        };
        if input.decide() {
            tracing::debug!(route_id = %next.route_id, "Revalidating shared route");
            indices.push(i);
        }
    }
    indices
}

/// A set of loaders to run together.
pub struct LoaderBatch<'a> {
    pub matches: &'a [RouteMatch],
    pub indices: Vec<usize>,
    pub location: &'a Location,
    pub query: &'a Query,
    pub action_result: Option<Value>,
    pub cancel: &'a CancelHandle,
}

/// What a loader batch produced.
#[derive(Debug, Default)]
pub struct LoaderOutput {
    pub data: HashMap<String, Value>,
    pub attempted: HashSet<String>,
    pub failures: Failures,
}

/// Run loaders concurrently. The first redirect wins and drops the rest.
pub async fn run_loaders(batch: LoaderBatch<'_>) -> Result<LoaderOutput, Redirect> {
    let signal = batch.cancel.signal();
    let mut output = LoaderOutput::default();
    let mut in_flight = FuturesUnordered::new();

    for &i in &batch.indices {
        let m = &batch.matches[i];
        let Some(loader) = m.route.loader.clone() else {
            continue;
        };
        let args = LoaderArgs {
            route_id: m.route_id.clone(),
            params: m.params.clone(),
            location: batch.location.clone(),
            query: batch.query.clone(),
            action_result: batch.action_result.clone(),
            signal: signal.clone(),
        };
        output.attempted.insert(m.route_id.clone());
        in_flight.push(async move {
            let started = Instant::now();
            let result = loader(args).await;
            (i, result, started.elapsed())
        });
    }

    while let Some((i, result, elapsed)) = in_flight.next().await {
        let route_id = &batch.matches[i].route_id;
        match result {
            Ok(value) => {
                metrics::record_data_run("loader", "ok", elapsed);
                output.data.insert(route_id.clone(), value);
            }
            Err(DataError::Redirect(redirect)) => {
                metrics::record_data_run("loader", "redirect", elapsed);
                tracing::info!(route_id = %route_id, to = %redirect.to, pending = in_flight.len(), "Loader redirected; dropping sibling loaders");
                batch.cancel.cancel();
                return Err(redirect);
            }
            Err(DataError::Failed { message, status }) => {
                metrics::record_data_run("loader", "error", elapsed);
                tracing::debug!(route_id = %route_id, error = %message, "Loader failed");
                output
                    .failures
                    .record(batch.matches, i, RouteFailure::new(FailureKind::Loader, route_id, message, status));
            }
        }
    }

    Ok(output)
}
