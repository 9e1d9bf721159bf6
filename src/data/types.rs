//! Data-layer types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::lifecycle::CancelSignal;
use crate::routing::{Location, Params, Query};

/// Instruction to continue at another location (always with replace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Target href.
    pub to: String,
    /// Informational status (301, 302, 303, 307, 308).
    pub status: u16,
}

impl Redirect {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            status: 302,
        }
    }
}

/// What loaders, actions and hooks return instead of a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The function failed.
    #[error("{message}")]
    Failed {
        message: String,
        status: Option<u16>,
    },

    /// The function asked to go somewhere else.
    #[error("redirect to {}", .0.to)]
    Redirect(Redirect),
}

impl DataError {
    pub fn failed(message: impl Into<String>) -> Self {
        DataError::Failed {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        DataError::Failed {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        DataError::Redirect(Redirect::new(to))
    }
}

/// Result type for user-supplied data functions.
pub type DataResult<T> = Result<T, DataError>;

/// Where a recorded failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Loader,
    Action,
    Hook,
    NotFound,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Loader => "loader",
            FailureKind::Action => "action",
            FailureKind::Hook => "hook",
            FailureKind::NotFound => "not found",
        };
        f.write_str(name)
    }
}

/// A failure recorded in committed state against an error boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind} error in route `{route_id}`: {message}")]
pub struct RouteFailure {
    pub kind: FailureKind,
    /// The route whose function failed (not the boundary that caught it).
    pub route_id: String,
    pub message: String,
    pub status: Option<u16>,
}

impl RouteFailure {
    pub fn new(kind: FailureKind, route_id: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind,
            route_id: route_id.into(),
            message: message.into(),
            status,
        }
    }

    pub fn not_found(route_id: impl Into<String>, pathname: &str) -> Self {
        Self::new(
            FailureKind::NotFound,
            route_id,
            format!("no route matches `{}`", pathname),
            Some(404),
        )
    }
}

/// A mutation request that triggers an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Form method, e.g. `POST`.
    pub method: String,
    /// Opaque payload handed to the action.
    pub payload: Value,
}

impl Submission {
    pub fn post(payload: Value) -> Self {
        Self {
            method: "POST".to_string(),
            payload,
        }
    }
}

/// Arguments handed to a loader.
#[derive(Debug, Clone)]
pub struct LoaderArgs {
    pub route_id: String,
    pub params: Params,
    pub location: Location,
    pub query: Query,
    /// Result of this transition's successful action, if any.
    pub action_result: Option<Value>,
    pub signal: CancelSignal,
}

/// Arguments handed to an action.
#[derive(Debug, Clone)]
pub struct ActionArgs {
    pub route_id: String,
    pub params: Params,
    pub location: Location,
    pub query: Query,
    pub submission: Submission,
    pub signal: CancelSignal,
}

/// Inputs to a route's revalidation policy.
#[derive(Debug, Clone)]
pub struct RevalidationArgs {
    pub route_id: String,
    /// The route's params in the committed state.
    pub current_params: Params,
    /// The route's params in the candidate state.
    pub next_params: Params,
    pub current_query: Query,
    pub next_query: Query,
    /// Successful action result that prompted this decision.
    pub action_result: Option<Value>,
    /// What the router would decide without a policy.
    pub default_should_revalidate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        assert_eq!(DataError::failed("boom").to_string(), "boom");
        assert_eq!(DataError::redirect("/login").to_string(), "redirect to /login");

        let failure = RouteFailure::new(FailureKind::Loader, "posts", "boom", Some(500));
        assert_eq!(failure.to_string(), "loader error in route `posts`: boom");
    }

    #[test]
    fn test_failure_serializes() {
        let failure = RouteFailure::not_found("root", "/missing");
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["kind"], json!("not_found"));
        assert_eq!(value["status"], json!(404));
    }
}
