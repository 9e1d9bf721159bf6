//! Shared fixtures for integration tests.

#![allow(dead_code)]

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{json, Value};
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use routeflow::config::RouterConfig;
use routeflow::data::{DataError, DataResult, LoaderArgs};
use routeflow::navigation::{HookArgs, HookOutcome};
use routeflow::{Router, RouteNode};

/// Ordered record of what ran.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// A latch a loader can wait on; opening it before the wait is not lost.
#[derive(Clone, Default)]
pub struct Gate {
    opened: Arc<Notify>,
    entered: Arc<Notify>,
}

impl Gate {
    pub fn open(&self) {
        self.opened.notify_one();
    }

    /// Wait until something is blocked on the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub async fn pass(&self) {
        self.entered.notify_one();
        self.opened.notified().await;
    }
}

pub fn router(routes: Vec<RouteNode>) -> Arc<Router> {
    Arc::new(Router::new(routes, RouterConfig::default()).unwrap())
}

/// Loader that logs `load:<route>:<params>` and returns the route id and params.
pub fn logging_loader(log: CallLog) -> impl Fn(LoaderArgs) -> BoxFuture<'static, DataResult<Value>> + Send + Sync {
    move |args: LoaderArgs| {
        let log = log.clone();
        async move {
            log.push(format!("load:{}:{}", args.route_id, params_string(&args)));
            Ok(json!({ "route": args.route_id, "params": args.params }))
        }
        .boxed()
    }
}

/// Loader that fails with `message`.
pub fn failing_loader(message: &'static str) -> impl Fn(LoaderArgs) -> BoxFuture<'static, DataResult<Value>> + Send + Sync {
    move |_: LoaderArgs| async move { Err(DataError::with_status(500, message)) }.boxed()
}

/// Hook that logs `<label>:<route>` and proceeds.
pub fn logging_hook(log: CallLog, label: &'static str) -> impl Fn(HookArgs) -> BoxFuture<'static, DataResult<HookOutcome>> + Send + Sync {
    move |args: HookArgs| {
        let log = log.clone();
        async move {
            log.push(format!("{}:{}", label, args.route_id));
            Ok(HookOutcome::Proceed)
        }
        .boxed()
    }
}

fn params_string(args: &LoaderArgs) -> String {
    args.params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// `{/ , children: [{posts, children: [{index}, {:id}]}]}`, every route
/// logging its loads.
pub fn posts_tree(log: &CallLog) -> Vec<RouteNode> {
    vec![RouteNode::new("root")
        .with_path("/")
        .with_error_boundary()
        .with_loader(logging_loader(log.clone()))
        .with_child(
            RouteNode::new("posts")
                .with_path("posts")
                .with_loader(logging_loader(log.clone()))
                .with_children([
                    RouteNode::new_index("posts-index").with_loader(logging_loader(log.clone())),
                    RouteNode::new("post").with_path(":id").with_loader(logging_loader(log.clone())),
                ]),
        )]
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}
