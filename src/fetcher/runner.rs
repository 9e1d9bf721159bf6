//! Fetcher submissions and loads.

use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

use crate::data::{
    run_loaders, ActionArgs, DataError, FailureKind, LoaderBatch, RouteFailure, Submission,
};
use crate::data::revalidation::RevalidationInput;
use crate::fetcher::registry::FetcherState;
use crate::navigation::{NavigationOutcome, NavigationRequest, Router, RouterError};
use crate::observability::metrics;
use crate::routing::{Location, LocationMatch, RouteMatch};

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("no route matches `{0}`")]
    NoMatch(String),

    #[error("route `{0}` has no action")]
    NoAction(String),

    #[error("route `{0}` has no loader")]
    NoLoader(String),

    #[error(transparent)]
    Router(#[from] RouterError),
}

pub type FetcherResult<T> = Result<T, FetcherError>;

/// How a fetcher call ended.
#[derive(Debug, Clone)]
pub enum FetcherOutcome {
    /// The action or loader succeeded. After a submission, `revalidated`
    /// lists the routes reloaded and `merged` says whether their data
    /// reached the committed state.
    Completed {
        data: Value,
        revalidated: Vec<String>,
        merged: bool,
    },
    Failed(RouteFailure),
    /// A redirect was followed as a navigation.
    Redirected(NavigationOutcome),
    /// Newer work on the same key took over.
    Superseded,
}

impl Router {
    /// Run the action of the route matching `href` under fetcher `key`,
    /// then revalidate the committed state. The location never changes.
    pub async fn submit_fetcher(&self, key: &str, href: &str, submission: Submission) -> FetcherResult<FetcherOutcome> {
        let location = Location::parse(href);
        let target = self.fetcher_target(href)?;
        let Some(action) = target.route.action.clone() else {
            return Err(FetcherError::NoAction(target.route_id));
        };

        metrics::record_fetcher("submit");
        let (generation, cancel) = self.fetchers().begin(key, FetcherState::Submitting);
        tracing::debug!(key = %key, route_id = %target.route_id, generation, "Fetcher submitting");

        let args = ActionArgs {
            route_id: target.route_id.clone(),
            params: target.params.clone(),
            query: location.query(),
            location,
            submission,
            signal: cancel.signal(),
        };
        let started = Instant::now();
        let result = action(args).await;
        metrics::record_data_run("fetcher_action", if result.is_ok() { "ok" } else { "error" }, started.elapsed());

        if !self.fetchers().is_current(key, generation) {
            return Ok(FetcherOutcome::Superseded);
        }

        let value = match result {
            Ok(value) => value,
            Err(DataError::Redirect(redirect)) => {
                self.fetchers().finish(key, generation, Ok(Value::Null));
                let outcome = self.navigate(NavigationRequest::redirect(&redirect.to)).await?;
                return Ok(FetcherOutcome::Redirected(outcome));
            }
            Err(DataError::Failed { message, status }) => {
                let failure = RouteFailure::new(FailureKind::Action, &target.route_id, message, status);
                self.fetchers().finish(key, generation, Err(failure.clone()));
                return Ok(FetcherOutcome::Failed(failure));
            }
        };

        self.fetchers().transition(key, generation, FetcherState::Loading);

        // Revalidate against the committed state, not a new one
        let committed = self.state();
        let location_params = committed.params();
        let indices: Vec<usize> = committed
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.route.loader.is_some())
            .filter(|(_, m)| {
                RevalidationInput {
                    current: m,
                    next: m,
                    current_location_params: &location_params,
                    next_location_params: &location_params,
                    current_query: &committed.query,
                    next_query: &committed.query,
                    action_result: Some(&value),
                }
                .decide()
            })
            .map(|(i, _)| i)
            .collect();

        let batch = LoaderBatch {
            matches: &committed.matches,
            indices,
            location: &committed.location,
            query: &committed.query,
            action_result: Some(value.clone()),
            cancel: &cancel,
        };
        let output = match run_loaders(batch).await {
            Ok(output) => output,
            Err(redirect) => {
                if !self.fetchers().finish(key, generation, Ok(value)) {
                    return Ok(FetcherOutcome::Superseded);
                }
                let outcome = self.navigate(NavigationRequest::redirect(&redirect.to)).await?;
                return Ok(FetcherOutcome::Redirected(outcome));
            }
        };

        if !self.fetchers().finish(key, generation, Ok(value.clone())) {
            return Ok(FetcherOutcome::Superseded);
        }

        let mut revalidated: Vec<String> = output.attempted.into_iter().collect();
        revalidated.sort();
        let merged = self.merge_revalidation(committed.generation, output.data, output.failures);
        if !merged {
            tracing::debug!(key = %key, "Navigation committed during fetcher revalidation; dropping revalidated data");
        }

        Ok(FetcherOutcome::Completed {
            data: value,
            revalidated,
            merged,
        })
    }

    /// Run the loader of the route matching `href` under fetcher `key`.
    pub async fn load_fetcher(&self, key: &str, href: &str) -> FetcherResult<FetcherOutcome> {
        let location = Location::parse(href);
        let LocationMatch { matches, query } = self
            .match_path(href)
            .ok_or_else(|| FetcherError::NoMatch(href.to_string()))?;
        let Some(leaf) = matches.len().checked_sub(1) else {
            return Err(FetcherError::NoMatch(href.to_string()));
        };
        if matches[leaf].route.loader.is_none() {
            return Err(FetcherError::NoLoader(matches[leaf].route_id.clone()));
        }

        metrics::record_fetcher("load");
        let (generation, cancel) = self.fetchers().begin(key, FetcherState::Loading);

        let batch = LoaderBatch {
            matches: &matches,
            indices: vec![leaf],
            location: &location,
            query: &query,
            action_result: None,
            cancel: &cancel,
        };
        let result = run_loaders(batch).await;

        if !self.fetchers().is_current(key, generation) {
            return Ok(FetcherOutcome::Superseded);
        }

        match result {
            Ok(mut output) => {
                let route_id = &matches[leaf].route_id;
                if let Some(data) = output.data.remove(route_id) {
                    self.fetchers().finish(key, generation, Ok(data.clone()));
                    return Ok(FetcherOutcome::Completed {
                        data,
                        revalidated: Vec::new(),
                        merged: false,
                    });
                }
                let failure = output
                    .failures
                    .by_boundary
                    .into_values()
                    .next()
                    .or(output.failures.fatal)
                    .unwrap_or_else(|| RouteFailure::new(FailureKind::Loader, route_id, "loader produced no data", None));
                self.fetchers().finish(key, generation, Err(failure.clone()));
                Ok(FetcherOutcome::Failed(failure))
            }
            Err(redirect) => {
                self.fetchers().finish(key, generation, Ok(Value::Null));
                let outcome = self.navigate(NavigationRequest::redirect(&redirect.to)).await?;
                Ok(FetcherOutcome::Redirected(outcome))
            }
        }
    }

    fn fetcher_target(&self, href: &str) -> FetcherResult<RouteMatch> {
        self.match_path(href)
            .and_then(|m| m.matches.into_iter().last())
            .ok_or_else(|| FetcherError::NoMatch(href.to_string()))
    }
}
