//! The router: owns the route tree and the committed state, and runs
//! transitions between states.

use arc_swap::ArcSwap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::RouterConfig;
use crate::data::{
    resolve, DataError, DataRequest, FailureKind, Failures, Redirect, Resolution, RouteFailure,
};
use crate::fetcher::FetcherRegistry;
use crate::lifecycle::{CancelHandle, CancelSignal, GenerationCounter};
use crate::navigation::diff::diff_matches;
use crate::navigation::events::{SettleKind, TransitionEvent, TransitionEvents};
use crate::navigation::history::{HistoryAction, NavigationRequest};
use crate::navigation::hooks::{self, HookOutcome};
use crate::navigation::state::{MatchedState, NavigationPhase};
use crate::observability::metrics;
use crate::pattern::{generate_path, PatternError};
use crate::routing::location::join_paths;
use crate::routing::{match_routes, Hook, Location, LocationMatch, Params, Query, RouteMatch, RouteNode, RouteTree, TreeError};

/// Errors surfaced by the router API.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("navigation exceeded {limit} redirects (last target `{to}`)")]
    TooManyRedirects { to: String, limit: usize },

    #[error("unknown route `{0}`")]
    UnknownRoute(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

pub type RouterResult<T> = Result<T, RouterError>;

/// What a call to [`Router::navigate`] achieved.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// A new state was committed; `action` tells the history what to record.
    Committed {
        state: Arc<MatchedState>,
        action: HistoryAction,
    },
    /// A hook aborted. For a pop, `restore` is the entry to go back to.
    Aborted { restore: Option<Location> },
    /// Already at that location; nothing ran.
    Unchanged,
    /// A newer navigation took over before this one committed.
    Superseded,
}

impl NavigationOutcome {
    pub fn committed_state(&self) -> Option<&Arc<MatchedState>> {
        match self {
            NavigationOutcome::Committed { state, .. } => Some(state),
            _ => None,
        }
    }
}

struct ActiveTransition {
    generation: u64,
    cancel: CancelHandle,
}

enum Step {
    Done(NavigationOutcome),
    Redirect { redirect: Redirect, generation: u64 },
}

/// Where a hook leaves the transition.
enum HookVerdict {
    Proceed,
    Failed(RouteFailure),
    Stop(Step),
}

/// Per-transition context shared by the hook and settle helpers.
struct Transition<'a> {
    generation: u64,
    location: &'a Location,
    query: &'a Query,
    action: HistoryAction,
    previous: &'a MatchedState,
    signal: CancelSignal,
}

/// A client-side router.
///
/// Exactly one transition may commit per generation. Starting a transition
/// cancels the one in flight; the older one keeps running user code to
/// completion but its result is dropped at the next resumption point.
pub struct Router {
    tree: ArcSwap<RouteTree>,
    tree_version: AtomicU64,
    committed: ArcSwap<MatchedState>,
    generations: GenerationCounter,
    active: Mutex<Option<ActiveTransition>>,
    phase: AtomicU8,
    events: TransitionEvents,
    hydration: Mutex<Option<HashMap<String, Value>>>,
    fetchers: FetcherRegistry,
    config: RouterConfig,
}

impl Router {
    pub fn new(routes: Vec<RouteNode>, config: RouterConfig) -> RouterResult<Self> {
        let tree = RouteTree::build(routes, config.match_options(), config.pattern_cache_capacity)?;

        Ok(Self {
            tree: ArcSwap::from_pointee(tree),
            tree_version: AtomicU64::new(0),
            committed: ArcSwap::from_pointee(MatchedState::empty(Location::initial())),
            generations: GenerationCounter::new(),
            active: Mutex::new(None),
            phase: AtomicU8::new(NavigationPhase::Idle as u8),
            events: TransitionEvents::new(config.event_capacity),
            hydration: Mutex::new(None),
            fetchers: FetcherRegistry::new(),
            config,
        })
    }

    /// Data to use instead of running loaders on the first transition.
    pub fn with_hydration(self, data: HashMap<String, Value>) -> Self {
        *self.hydration.lock().unwrap_or_else(PoisonError::into_inner) = Some(data);
        self
    }

    /// Run the first transition to `href`.
    pub async fn initialize(&self, href: &str) -> RouterResult<NavigationOutcome> {
        self.navigate(NavigationRequest::replace(href)).await
    }

    /// Navigate, following redirects up to `max_redirects`.
    pub async fn navigate(&self, request: NavigationRequest) -> RouterResult<NavigationOutcome> {
        let origin = request.action;
        let mut request = request;
        let mut redirects = 0;

        loop {
            match self.transition(request).await {
                Step::Done(outcome) => return Ok(outcome),
                Step::Redirect { redirect, generation } => {
                    redirects += 1;
                    if redirects > self.config.max_redirects {
                        tracing::error!(to = %redirect.to, limit = self.config.max_redirects, "Redirect limit exceeded");
                        metrics::record_transition("redirect_limit");
                        self.release(generation);
                        return Err(RouterError::TooManyRedirects {
                            to: redirect.to,
                            limit: self.config.max_redirects,
                        });
                    }
                    request = NavigationRequest::follow(&redirect.to, origin);
                }
            }
        }
    }

    /// Snapshot of the committed state.
    pub fn state(&self) -> Arc<MatchedState> {
        self.committed.load_full()
    }

    pub fn phase(&self) -> NavigationPhase {
        NavigationPhase::from(self.phase.load(Ordering::SeqCst))
    }

    /// Transition start/settle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.events.subscribe()
    }

    pub fn tree(&self) -> Arc<RouteTree> {
        self.tree.load_full()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn fetchers(&self) -> &FetcherRegistry {
        &self.fetchers
    }

    /// Match an href against the current tree without navigating.
    pub fn match_path(&self, href: &str) -> Option<LocationMatch> {
        match_routes(&self.tree.load(), &Location::parse(href))
    }

    /// Build the href of a route from params, basename included.
    pub fn href(&self, route_id: &str, params: &Params) -> RouterResult<String> {
        let tree = self.tree.load();
        let entry = tree
            .index()
            .get(route_id)
            .ok_or_else(|| RouterError::UnknownRoute(route_id.to_string()))?;
        let path = generate_path(&entry.pattern, params)?;
        Ok(join_paths(&tree.options().basename, &path))
    }

    /// Swap in a new route table. The next navigation matches against it.
    pub fn replace_routes(&self, routes: Vec<RouteNode>) -> RouterResult<()> {
        let tree = RouteTree::build(routes, self.config.match_options(), self.config.pattern_cache_capacity)?;
        self.install_tree(tree);
        Ok(())
    }

    /// Append `children` under `parent`, or at the top level for `None`.
    pub fn patch_routes(&self, parent: Option<&str>, children: Vec<RouteNode>) -> RouterResult<()> {
        let tree = self.tree.load().patched(parent, children)?;
        self.install_tree(tree);
        Ok(())
    }

    fn install_tree(&self, tree: RouteTree) {
        let routes = tree.index().len();
        self.tree.store(Arc::new(tree));
        let version = self.tree_version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(routes, version, "Route tree replaced");
    }

    async fn transition(&self, request: NavigationRequest) -> Step {
        let NavigationRequest {
            location,
            action,
            submission,
        } = request;
        let previous = self.committed.load_full();
        let tree_version = self.tree_version.load(Ordering::SeqCst);

        let settled_here = submission.is_none()
            && previous.initialized
            && previous.tree_version == tree_version
            && self.lock_active().is_none()
            && location.same_target(&previous.location);
        if settled_here && location.hash == previous.location.hash {
            tracing::debug!(pathname = %location.pathname, "Navigation to current location ignored");
            metrics::record_transition("unchanged");
            return Step::Done(NavigationOutcome::Unchanged);
        }

        let (generation, cancel) = self.begin(&location, action);
        let query = location.query();

        if settled_here {
            // Only the hash moved
            let state = MatchedState {
                generation,
                location,
                ..(*previous).clone()
            };
            return self.commit(generation, state, action);
        }

        let tree = self.tree.load_full();
        let Some(candidate) = match_routes(&tree, &location) else {
            return self.commit_no_match(generation, location, action, &previous, tree_version);
        };
        let matches = candidate.matches;
        let diff = diff_matches(&previous.matches, &matches);

        let transition = Transition {
            generation,
            location: &location,
            query: &query,
            action,
            previous: &previous,
            signal: cancel.signal(),
        };
        let mut failures = Failures::default();

        for &i in &diff.leaving {
            let route = &previous.matches[i];
            let Some(hook) = route.route.will_leave.clone() else {
                continue;
            };
            match self.run_hook(&transition, &hook, route).await {
                HookVerdict::Proceed => {}
                HookVerdict::Failed(failure) => match hooks::surviving_boundary(&previous.matches, i, &matches) {
                    Some(boundary) => failures.record_on(boundary, failure),
                    None => failures.record_fatal(failure),
                },
                HookVerdict::Stop(step) => return step,
            }
        }

        for &i in &diff.entering {
            let route = &matches[i];
            let Some(hook) = route.route.will_enter.clone() else {
                continue;
            };
            match self.run_hook(&transition, &hook, route).await {
                HookVerdict::Proceed => {}
                HookVerdict::Failed(failure) => failures.record(&matches, i, failure),
                HookVerdict::Stop(step) => return step,
            }
        }

        let hydrated = if previous.initialized {
            HashMap::new()
        } else {
            self.take_hydration()
        };

        let resolution = resolve(DataRequest {
            previous_matches: &previous.matches,
            previous_query: &previous.query,
            matches: &matches,
            diff: &diff,
            location: &location,
            query: &query,
            submission,
            hydrated,
            cancel: &cancel,
        })
        .await;

        if !self.generations.is_current(generation) {
            return self.superseded(generation, &location);
        }
        let mut resolved = match resolution {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Redirect(redirect) => return self.redirected(generation, &location, redirect),
        };
        if !self.enter_phase(generation, NavigationPhase::Committing) {
            return self.superseded(generation, &location);
        }

        // Hook failures happened first, so they win their boundary
        failures.merge(std::mem::take(&mut resolved.failures));

        let mut loader_data = HashMap::new();
        for (i, m) in matches.iter().enumerate() {
            if let Some(value) = resolved.loader_data.remove(&m.route_id) {
                loader_data.insert(m.route_id.clone(), value);
            } else if diff.is_shared(i) && !resolved.attempted.contains(&m.route_id) {
                if let Some(value) = previous.loader_data.get(&m.route_id) {
                    loader_data.insert(m.route_id.clone(), value.clone());
                }
            }
        }

        let state = MatchedState {
            generation,
            tree_version,
            query: candidate.query,
            location,
            matches,
            loader_data,
            action_data: resolved.action.into_iter().collect(),
            errors: failures.by_boundary,
            fatal_error: failures.fatal,
            no_match: false,
            initialized: true,
        };
        self.commit(generation, state, action)
    }

    async fn run_hook(&self, transition: &Transition<'_>, hook: &Hook, route: &RouteMatch) -> HookVerdict {
        let result = hooks::invoke(hook, route, transition.location, transition.query, &transition.signal).await;
        if !self.generations.is_current(transition.generation) {
            return HookVerdict::Stop(self.superseded(transition.generation, transition.location));
        }

        match result {
            Ok(HookOutcome::Proceed) => HookVerdict::Proceed,
            Ok(HookOutcome::Abort) => {
                tracing::info!(generation = transition.generation, route_id = %route.route_id, "Transition aborted by hook");
                HookVerdict::Stop(Step::Done(self.abort(transition)))
            }
            Ok(HookOutcome::Redirect(redirect)) | Err(DataError::Redirect(redirect)) => {
                HookVerdict::Stop(self.redirected(transition.generation, transition.location, redirect))
            }
            Err(DataError::Failed { message, status }) => {
                tracing::warn!(route_id = %route.route_id, error = %message, "Hook failed");
                HookVerdict::Failed(RouteFailure::new(FailureKind::Hook, &route.route_id, message, status))
            }
        }
    }

    fn commit_no_match(
        &self,
        generation: u64,
        location: Location,
        action: HistoryAction,
        previous: &MatchedState,
        tree_version: u64,
    ) -> Step {
        let boundary = if previous.initialized {
            previous.matches.iter().rposition(|m| m.route.error_boundary)
        } else {
            None
        };

        let mut state = MatchedState {
            generation,
            tree_version,
            no_match: true,
            initialized: true,
            ..MatchedState::empty(location)
        };

        match boundary {
            Some(b) => {
                let matches = previous.matches[..=b].to_vec();
                let boundary_id = matches[b].route_id.clone();
                tracing::warn!(pathname = %state.location.pathname, boundary = %boundary_id, "No route matched; showing nearest error boundary");
                state.loader_data = matches
                    .iter()
                    .filter_map(|m| previous.loader_data.get(&m.route_id).map(|v| (m.route_id.clone(), v.clone())))
                    .collect();
                state
                    .errors
                    .insert(boundary_id.clone(), RouteFailure::not_found(boundary_id, &state.location.pathname));
                state.matches = matches;
            }
            None => {
                tracing::warn!(pathname = %state.location.pathname, "No route matched");
            }
        }

        self.commit(generation, state, action)
    }

    fn begin(&self, location: &Location, action: HistoryAction) -> (u64, CancelHandle) {
        let cancel = CancelHandle::new();
        let generation = {
            let mut active = self.lock_active();
            let generation = self.generations.advance();
            if let Some(previous) = active.replace(ActiveTransition {
                generation,
                cancel: cancel.clone(),
            }) {
                previous.cancel.cancel();
                tracing::debug!(superseded = previous.generation, by = generation, "Cancelling in-flight transition");
            }
            self.set_phase(NavigationPhase::Pending);
            generation
        };

        tracing::info!(generation, pathname = %location.pathname, action = ?action, "Transition started");
        self.events.emit(TransitionEvent::Started {
            generation,
            location: location.clone(),
            action,
        });
        (generation, cancel)
    }

    fn commit(&self, generation: u64, state: MatchedState, action: HistoryAction) -> Step {
        let state = Arc::new(state);
        {
            let mut active = self.lock_active();
            if !self.generations.is_current(generation) {
                drop(active);
                return self.superseded(generation, &state.location);
            }
            self.committed.store(state.clone());
            *active = None;
            self.set_phase(NavigationPhase::Idle);
        }

        metrics::record_transition("committed");
        tracing::info!(
            generation,
            pathname = %state.location.pathname,
            routes = state.matches.len(),
            errors = state.errors.len(),
            fatal = state.fatal_error.is_some(),
            "Transition committed"
        );
        self.events.emit(TransitionEvent::Settled {
            generation,
            location: state.location.clone(),
            outcome: SettleKind::Committed,
        });
        Step::Done(NavigationOutcome::Committed { state, action })
    }

    fn abort(&self, transition: &Transition<'_>) -> NavigationOutcome {
        self.release(transition.generation);
        metrics::record_transition("aborted");
        self.events.emit(TransitionEvent::Settled {
            generation: transition.generation,
            location: transition.location.clone(),
            outcome: SettleKind::Aborted,
        });

        let restore = (transition.action == HistoryAction::Pop).then(|| transition.previous.location.clone());
        NavigationOutcome::Aborted { restore }
    }

    fn redirected(&self, generation: u64, location: &Location, redirect: Redirect) -> Step {
        if !self.generations.is_current(generation) {
            return self.superseded(generation, location);
        }
        metrics::record_transition("redirected");
        tracing::info!(generation, from = %location.pathname, to = %redirect.to, status = redirect.status, "Transition redirected");
        self.events.emit(TransitionEvent::Settled {
            generation,
            location: location.clone(),
            outcome: SettleKind::Redirected { to: redirect.to.clone() },
        });
        Step::Redirect { redirect, generation }
    }

    fn superseded(&self, generation: u64, location: &Location) -> Step {
        metrics::record_transition("superseded");
        tracing::debug!(generation, pathname = %location.pathname, "Discarding superseded transition");
        self.events.emit(TransitionEvent::Settled {
            generation,
            location: location.clone(),
            outcome: SettleKind::Superseded,
        });
        Step::Done(NavigationOutcome::Superseded)
    }

    /// Clear the in-flight slot if `generation` still owns it.
    fn release(&self, generation: u64) {
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|a| a.generation == generation) {
            *active = None;
            self.set_phase(NavigationPhase::Idle);
        }
    }

    /// Merge data revalidated outside a navigation into the committed state,
    /// provided no transition has committed since `generation`.
    pub(crate) fn merge_revalidation(&self, generation: u64, data: HashMap<String, Value>, failures: Failures) -> bool {
        let _active = self.lock_active();
        let current = self.committed.load_full();
        if current.generation != generation {
            return false;
        }

        let mut next = (*current).clone();
        // Errors are keyed by boundary; drop only the loader failures of reloaded routes
        next.errors
            .retain(|_, failure| failure.kind != FailureKind::Loader || !data.contains_key(&failure.route_id));
        next.loader_data.extend(data);
        next.errors.extend(failures.by_boundary);
        if next.fatal_error.is_none() {
            next.fatal_error = failures.fatal;
        }
        self.committed.store(Arc::new(next));
        true
    }

    fn take_hydration(&self) -> HashMap<String, Value> {
        self.hydration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_default()
    }

    /// Move to `phase` only while `generation` still owns the in-flight slot.
    fn enter_phase(&self, generation: u64, phase: NavigationPhase) -> bool {
        let _active = self.lock_active();
        if !self.generations.is_current(generation) {
            return false;
        }
        self.set_phase(phase);
        true
    }

    fn set_phase(&self, phase: NavigationPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveTransition>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Submission;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counting_loader(counter: Arc<AtomicUsize>, value: Value) -> RouteNode {
        RouteNode::new("counted").with_loader(move |_| {
            let counter = counter.clone();
            let value = value.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
        })
    }

    fn router(routes: Vec<RouteNode>) -> Router {
        Router::new(routes, RouterConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_first_navigation_without_match_is_not_fatal() {
        let router = router(vec![RouteNode::new("home").with_path("/")]);
        let outcome = router.initialize("/missing").await.unwrap();

        let state = outcome.committed_state().unwrap();
        assert!(state.no_match);
        assert!(state.matches.is_empty());
        assert!(!state.has_errors());
        assert_eq!(router.phase(), NavigationPhase::Idle);
    }

    #[tokio::test]
    async fn test_no_match_falls_back_to_previous_boundary() {
        let router = router(vec![RouteNode::new("root")
            .with_path("/")
            .with_error_boundary()
            .with_loader(|_| async { Ok(json!("root")) })
            .with_child(RouteNode::new("about").with_path("about"))]);

        router.initialize("/about").await.unwrap();
        let outcome = router.navigate(NavigationRequest::push("/nowhere")).await.unwrap();

        let state = outcome.committed_state().unwrap();
        assert_eq!(state.route_ids(), vec!["root"]);
        assert_eq!(state.error("root").and_then(|f| f.status), Some(404));
        assert_eq!(state.data("root"), Some(&json!("root")));
        assert_eq!(state.location.pathname, "/nowhere");
    }

    #[tokio::test]
    async fn test_hash_change_skips_loaders() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = router(vec![counting_loader(calls.clone(), json!(1)).with_path("/")]);

        router.initialize("/").await.unwrap();
        let outcome = router.navigate(NavigationRequest::push("/#section")).await.unwrap();

        let state = outcome.committed_state().unwrap();
        assert_eq!(state.location.hash, "#section");
        assert_eq!(state.data("counted"), Some(&json!(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let again = router.navigate(NavigationRequest::push("/#section")).await.unwrap();
        assert!(matches!(again, NavigationOutcome::Unchanged));
    }

    #[tokio::test]
    async fn test_hydration_used_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = router(vec![counting_loader(calls.clone(), json!("fresh"))
            .with_path("/")
            .with_should_revalidate(|_| true)])
        .with_hydration(HashMap::from([("counted".to_string(), json!("hydrated"))]));

        let first = router.initialize("/").await.unwrap();
        assert_eq!(first.committed_state().unwrap().data("counted"), Some(&json!("hydrated")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let second = router.navigate(NavigationRequest::push("/?page=2")).await.unwrap();
        assert_eq!(second.committed_state().unwrap().data("counted"), Some(&json!("fresh")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submission_to_route_without_action() {
        let router = router(vec![RouteNode::new("root")
            .with_path("/")
            .with_error_boundary()
            .with_loader(|_| async { Ok(json!("ok")) })]);

        let outcome = router
            .navigate(NavigationRequest::push("/").with_submission(Submission::post(json!({}))))
            .await
            .unwrap();

        let state = outcome.committed_state().unwrap();
        assert_eq!(state.error("root").and_then(|f| f.status), Some(405));
        assert_eq!(state.data("root"), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_bounded() {
        let config = RouterConfig {
            max_redirects: 3,
            ..RouterConfig::default()
        };
        let router = Router::new(
            vec![RouteNode::new("loop")
                .with_path("/loop")
                .with_loader(|_| async { Err(DataError::redirect("/loop?again")) })],
            config,
        )
        .unwrap();

        let err = router.initialize("/loop").await.unwrap_err();
        assert!(matches!(err, RouterError::TooManyRedirects { limit: 3, .. }));
        assert_eq!(router.phase(), NavigationPhase::Idle);
        assert!(!router.state().initialized);
    }

    #[tokio::test]
    async fn test_href_and_patch() {
        let router = router(vec![RouteNode::new("root").with_path("/")]);
        router
            .patch_routes(Some("root"), vec![RouteNode::new("post").with_path("posts/:id")])
            .unwrap();

        let params = Params::from([("id".to_string(), "a b".to_string())]);
        assert_eq!(router.href("post", &params).unwrap(), "/posts/a%20b");
        assert!(matches!(router.href("nope", &params), Err(RouterError::UnknownRoute(_))));
        assert!(router.match_path("/posts/7").is_some());
        assert!(matches!(
            router.patch_routes(Some("ghost"), vec![]),
            Err(RouterError::Tree(TreeError::UnknownParent(_)))
        ));
    }

    #[tokio::test]
    async fn test_revalidation_merge_keeps_descendant_failures() {
        let router = router(vec![RouteNode::new("root")
            .with_path("/")
            .with_error_boundary()
            .with_loader(|_| async { Ok(json!("root")) })
            .with_child(
                RouteNode::new("flaky")
                    .with_path("flaky")
                    .with_loader(|_| async { Err(DataError::failed("down")) }),
            )]);
        let generation = router.initialize("/flaky").await.unwrap().committed_state().unwrap().generation;
        assert_eq!(router.state().error("root").map(|f| f.route_id.as_str()), Some("flaky"));

        let reloaded_root = HashMap::from([("root".to_string(), json!("fresh"))]);
        assert!(router.merge_revalidation(generation, reloaded_root, Failures::default()));
        let state = router.state();
        assert_eq!(state.data("root"), Some(&json!("fresh")));
        assert_eq!(state.error("root").map(|f| f.route_id.as_str()), Some("flaky"));

        let reloaded_child = HashMap::from([("flaky".to_string(), json!("back"))]);
        assert!(router.merge_revalidation(generation, reloaded_child, Failures::default()));
        assert!(router.state().error("root").is_none());
        assert_eq!(router.state().data("flaky"), Some(&json!("back")));
    }

    #[tokio::test]
    async fn test_replacing_routes_allows_renavigation() {
        let router = router(vec![RouteNode::new("a").with_path("/")]);
        router.initialize("/").await.unwrap();
        router.replace_routes(vec![RouteNode::new("b").with_path("/")]).unwrap();

        let outcome = router.navigate(NavigationRequest::replace("/")).await.unwrap();
        assert_eq!(outcome.committed_state().unwrap().route_ids(), vec!["b"]);
    }
}
