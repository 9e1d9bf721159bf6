//! routeflow: an interactive navigator over a TOML route table.
//!
//! # Architecture Overview
//!
//! ```text
//!     stdin commands             ┌──────────────────────────────────────────┐
//!     ──────────────────────────▶│  MemoryHistory ◀──── NavigationOutcome   │
//!     push / replace / back      │        │                     ▲           │
//!     submit / fetch / state     │        ▼                     │           │
//!                                │  ┌──────────┐   ┌────────────────────┐   │
//!                                │  │  Router  │──▶│ hooks → loaders →  │   │
//!                                │  │          │   │ commit MatchedState│   │
//!                                │  └──────────┘   └────────────────────┘   │
//!     routeflow.toml             │        ▲                                 │
//!     ──── notify ──────────────▶│  ConfigWatcher → replace_routes          │
//!                                └──────────────────────────────────────────┘
//! ```
//!
//! Every configured route gets an echo loader (route id, params, query) and
//! an echo action (the submitted payload), so the output shows exactly what
//! each transition resolved.

use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use routeflow::config::{load_config, AppConfig, ConfigWatcher, RouteConfig};
use routeflow::data::{ActionArgs, LoaderArgs};
use routeflow::fetcher::FetcherOutcome;
use routeflow::observability::logging::init_logging;
use routeflow::{History, MatchedState, MemoryHistory, NavigationOutcome, NavigationRequest, Router, RouteNode, Submission};

#[derive(Parser)]
#[command(name = "routeflow")]
#[command(about = "Navigate a route table interactively", long_about = None)]
struct Args {
    /// Route table and router settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the route table when the config file changes
    #[arg(short, long)]
    watch: bool,

    /// Location to start at
    #[arg(short, long, default_value = "/")]
    start: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => demo_config(),
    };
    init_logging(&config.observability);

    tracing::info!(routes = config.routes.len(), basename = %config.router.basename, "routeflow v0.1.0 starting");

    let router = Router::new(echo_routes(&config.routes), config.router.clone())?;
    let history = MemoryHistory::default();

    let (_watcher, mut updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let outcome = router.initialize(&args.start).await?;
    history.apply(&outcome);
    print_outcome(&outcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !run_command(&router, &history, line.trim()).await? {
                    break;
                }
            }
            Some(update) = updates.recv() => {
                match router.replace_routes(echo_routes(&update.routes)) {
                    Ok(()) => {
                        let href = history.location().href();
                        let outcome = router.navigate(NavigationRequest::replace(&href)).await?;
                        history.apply(&outcome);
                        print_outcome(&outcome);
                    }
                    Err(e) => tracing::error!(error = %e, "Reloaded route table rejected"),
                }
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Returns false when the session should end.
async fn run_command(router: &Router, history: &MemoryHistory, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();
    let first = parts.next();
    let rest = parts.next();

    match (command, first) {
        ("", _) => {}
        ("quit" | "exit", _) => return Ok(false),
        ("push", Some(href)) => navigate(router, history, NavigationRequest::push(href)).await?,
        ("replace", Some(href)) => navigate(router, history, NavigationRequest::replace(href)).await?,
        ("back" | "forward", _) => {
            let delta = if command == "back" { -1 } else { 1 };
            match history.go(delta) {
                Some(location) => navigate(router, history, NavigationRequest::pop(location)).await?,
                None => println!("no history entry in that direction"),
            }
        }
        ("submit", Some(href)) => {
            let payload = parse_payload(rest)?;
            let request = NavigationRequest::push(href).with_submission(Submission::post(payload));
            navigate(router, history, request).await?;
        }
        ("fetch", Some(key)) => {
            let outcome = match rest {
                Some(href) => router.load_fetcher(key, href).await?,
                None => {
                    println!("usage: fetch <key> <href>");
                    return Ok(true);
                }
            };
            print_fetcher(&outcome);
        }
        ("post", Some(key)) => {
            let (href, payload) = match rest.map(|r| r.split_once(' ').unwrap_or((r, ""))) {
                Some((href, payload)) => (href, parse_payload(Some(payload))?),
                None => {
                    println!("usage: post <key> <href> [json]");
                    return Ok(true);
                }
            };
            let outcome = router.submit_fetcher(key, href, Submission::post(payload)).await?;
            print_fetcher(&outcome);
        }
        ("state", _) => print_state(&router.state()),
        _ => println!("commands: push|replace <href>, back, forward, submit <href> [json], fetch <key> <href>, post <key> <href> [json], state, quit"),
    }
    Ok(true)
}

async fn navigate(router: &Router, history: &MemoryHistory, request: NavigationRequest) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = router.navigate(request).await?;
    history.apply(&outcome);
    print_outcome(&outcome);
    Ok(())
}

fn parse_payload(raw: Option<&str>) -> Result<Value, serde_json::Error> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => serde_json::from_str(raw),
        None => Ok(Value::Null),
    }
}

fn print_outcome(outcome: &NavigationOutcome) {
    match outcome {
        NavigationOutcome::Committed { state, .. } => print_state(state),
        NavigationOutcome::Aborted { restore } => {
            println!("aborted{}", restore.as_ref().map(|l| format!(", restoring {}", l.href())).unwrap_or_default());
        }
        NavigationOutcome::Unchanged => println!("unchanged"),
        NavigationOutcome::Superseded => println!("superseded"),
    }
}

fn print_state(state: &MatchedState) {
    let summary = json!({
        "location": state.location.href(),
        "routes": state.route_ids(),
        "params": state.params(),
        "loader_data": state.loader_data,
        "action_data": state.action_data,
        "errors": state.errors,
        "fatal_error": state.fatal_error,
        "no_match": state.no_match,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "Failed to render state"),
    }
}

fn print_fetcher(outcome: &FetcherOutcome) {
    match outcome {
        FetcherOutcome::Completed { data, revalidated, merged } => {
            println!("{}", json!({ "data": data, "revalidated": revalidated, "merged": merged }));
        }
        FetcherOutcome::Failed(failure) => println!("fetcher failed: {}", failure),
        FetcherOutcome::Redirected(outcome) => print_outcome(outcome),
        FetcherOutcome::Superseded => println!("superseded"),
    }
}

fn echo_routes(routes: &[RouteConfig]) -> Vec<RouteNode> {
    routes.iter().map(echo_route).collect()
}

fn echo_route(config: &RouteConfig) -> RouteNode {
    let leaf = RouteConfig {
        children: Vec::new(),
        ..config.clone()
    };
    leaf.to_node()
        .with_loader(|args: LoaderArgs| async move {
            Ok(json!({ "route": args.route_id, "params": args.params, "query": args.query }))
        })
        .with_action(|args: ActionArgs| async move {
            Ok(json!({ "route": args.route_id, "received": args.submission.payload }))
        })
        .with_children(config.children.iter().map(echo_route))
}

fn demo_config() -> AppConfig {
    let route = |id: &str, path: Option<&str>| RouteConfig {
        id: id.to_string(),
        path: path.map(str::to_string),
        ..Default::default()
    };

    let mut posts = route("posts", Some("posts"));
    posts.children = vec![
        RouteConfig {
            index: true,
            ..route("posts-index", None)
        },
        route("post", Some(":id")),
    ];
    let mut root = route("root", Some("/"));
    root.error_boundary = true;
    root.children = vec![posts, route("files", Some("files/*"))];

    AppConfig {
        routes: vec![root],
        ..Default::default()
    }
}
