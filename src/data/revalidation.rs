//! Revalidation decisions for routes that stay on screen.

use serde_json::Value;

use crate::data::types::RevalidationArgs;
use crate::routing::{Params, Query, RouteMatch};

/// The router's decision when a route declares no policy: revalidate on
/// any change of the location's params or query, or after a successful
/// action.
pub fn default_should_revalidate(
    current_location_params: &Params,
    next_location_params: &Params,
    current_query: &Query,
    next_query: &Query,
    action_succeeded: bool,
) -> bool {
    action_succeeded || current_location_params != next_location_params || current_query != next_query
}

/// Apply the route's policy, or the default when it has none.
pub fn should_revalidate(route: &RouteMatch, args: &RevalidationArgs) -> bool {
    match &route.route.should_revalidate {
        Some(policy) => policy(args),
        None => args.default_should_revalidate,
    }
}

/// Everything needed to decide revalidation for one route.
pub struct RevalidationInput<'a> {
    pub current: &'a RouteMatch,
    pub next: &'a RouteMatch,
    pub current_location_params: &'a Params,
    pub next_location_params: &'a Params,
    pub current_query: &'a Query,
    pub next_query: &'a Query,
    pub action_result: Option<&'a Value>,
}

impl RevalidationInput<'_> {
    pub fn decide(&self) -> bool {
        let default = default_should_revalidate(
            self.current_location_params,
            self.next_location_params,
            self.current_query,
            self.next_query,
            self.action_result.is_some(),
        );
        let args = RevalidationArgs {
            route_id: self.next.route_id.clone(),
            current_params: self.current.params.clone(),
            next_params: self.next.params.clone(),
            current_query: self.current_query.clone(),
            next_query: self.next_query.clone(),
            action_result: self.action_result.cloned(),
            default_should_revalidate: default,
        };
        should_revalidate(self.next, &args)
    }
}
