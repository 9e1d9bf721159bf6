//! Matching and ranking through the public API.

use std::collections::BTreeMap;

use routeflow::pattern::generate_path;
use routeflow::routing::{match_routes, Location, MatchOptions, RouteNode, RouteTree};

fn build(routes: Vec<RouteNode>) -> RouteTree {
    RouteTree::build(routes, MatchOptions::default(), 1_000).unwrap()
}

fn ids(tree: &RouteTree, href: &str) -> Option<Vec<String>> {
    match_routes(tree, &Location::parse(href)).map(|m| m.route_ids().into_iter().map(str::to_string).collect())
}

fn posts_tree() -> RouteTree {
    build(vec![RouteNode::new("root").with_path("/").with_child(
        RouteNode::new("posts")
            .with_path("posts")
            .with_children([RouteNode::new_index("posts-index"), RouteNode::new("post").with_path(":id")]),
    )])
}

#[test]
fn test_posts_scenario() {
    let tree = posts_tree();

    let found = match_routes(&tree, &Location::parse("/posts/42")).unwrap();
    assert_eq!(found.route_ids(), vec!["root", "posts", "post"]);
    assert_eq!(found.params().get("id").map(String::as_str), Some("42"));
    assert_eq!(found.matches[1].pathname, "/posts");
    assert_eq!(found.matches[2].pathname_base, "/posts");

    let index = match_routes(&tree, &Location::parse("/posts")).unwrap();
    assert_eq!(index.route_ids(), vec!["root", "posts", "posts-index"]);
    assert!(index.params().is_empty());

    assert!(match_routes(&tree, &Location::parse("/unknown")).is_none());
}

#[test]
fn test_static_patterns_match_only_themselves() {
    let tree = build(vec![
        RouteNode::new("team").with_path("/about/team"),
        RouteNode::new("about").with_path("/about"),
    ]);

    assert_eq!(ids(&tree, "/about/team"), Some(vec!["team".to_string()]));
    assert_eq!(ids(&tree, "/about/team/"), Some(vec!["team".to_string()]));
    assert_eq!(ids(&tree, "/about"), Some(vec!["about".to_string()]));
    assert_eq!(ids(&tree, "/about/teams"), None);
    assert_eq!(ids(&tree, "/about/team/x"), None);
    assert_eq!(ids(&tree, "/about%2Fteam"), None);
}

#[test]
fn test_more_literals_rank_first_regardless_of_declaration_order() {
    let tree = build(vec![RouteNode::new("posts").with_path("/posts").with_children([
        RouteNode::new("post").with_path(":id"),
        RouteNode::new("new-post").with_path("new"),
        RouteNode::new("edit").with_path(":id/edit"),
        RouteNode::new("catch-all").with_path("*"),
    ])]);

    assert_eq!(ids(&tree, "/posts/new").unwrap().last().map(String::as_str), Some("new-post"));
    assert_eq!(ids(&tree, "/posts/7").unwrap().last().map(String::as_str), Some("post"));
    assert_eq!(ids(&tree, "/posts/7/edit").unwrap().last().map(String::as_str), Some("edit"));
    assert_eq!(ids(&tree, "/posts/7/history").unwrap().last().map(String::as_str), Some("catch-all"));

    let patterns: Vec<&str> = tree.chains().iter().map(|c| c.pattern.as_str()).collect();
    let new_rank = patterns.iter().position(|p| *p == "/posts/new").unwrap();
    let dynamic_rank = patterns.iter().position(|p| *p == "/posts/:id").unwrap();
    assert!(new_rank < dynamic_rank);
}

#[test]
fn test_generated_paths_round_trip() {
    let tree = build(vec![RouteNode::new("file").with_path("/repos/:owner/:repo/blob/*")]);
    let values = [("owner", "Ada Lovelace"), ("repo", "v1.0?beta#2"), ("*", "src/main rs/é.txt")];
    let params: BTreeMap<String, String> = values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

    let href = generate_path("/repos/:owner/:repo/blob/*", &params).unwrap();
    let found = match_routes(&tree, &Location::parse(&href)).unwrap();
    assert_eq!(found.params(), params);
}

#[test]
fn test_basename_mounting() {
    let options = MatchOptions {
        basename: "/app".to_string(),
        ..MatchOptions::default()
    };
    let tree = RouteTree::build(
        vec![RouteNode::new("root").with_path("/").with_child(RouteNode::new("settings").with_path("settings"))],
        options,
        16,
    )
    .unwrap();

    let found = match_routes(&tree, &Location::parse("/app/settings")).unwrap();
    assert_eq!(found.route_ids(), vec!["root", "settings"]);
    assert_eq!(found.matches[1].pathname, "/app/settings");
    assert!(match_routes(&tree, &Location::parse("/application/settings")).is_none());
    assert!(match_routes(&tree, &Location::parse("/settings")).is_none());
}

#[test]
fn test_strict_trailing_slash_is_opt_in() {
    let strict = RouteTree::build(
        vec![RouteNode::new("a").with_path("/a")],
        MatchOptions {
            strict: true,
            ..MatchOptions::default()
        },
        16,
    )
    .unwrap();
    assert!(match_routes(&strict, &Location::parse("/a")).is_some());
    assert!(match_routes(&strict, &Location::parse("/a/")).is_none());

    let loose = build(vec![RouteNode::new("a").with_path("/a")]);
    assert!(match_routes(&loose, &Location::parse("/a/")).is_some());
}

#[test]
fn test_query_and_hash_do_not_affect_matching() {
    let tree = posts_tree();
    let found = match_routes(&tree, &Location::parse("/posts/3?sort=new&tag=a&tag=b#comments")).unwrap();
    assert_eq!(found.route_ids(), vec!["root", "posts", "post"]);
    assert_eq!(found.query.get_all("tag"), vec!["a", "b"]);
}
