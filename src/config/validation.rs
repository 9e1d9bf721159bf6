//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Route table integrity (unique ids, index routes are leaves)
//! - Value ranges (capacities > 0, known log levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::{AppConfig, RouteConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("router.basename `{0}` must start with `/`")]
    InvalidBasename(String),

    #[error("router.{0} must be greater than zero")]
    ZeroCapacity(&'static str),

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("route at {0} has an empty id")]
    EmptyRouteId(String),

    #[error("duplicate route id `{0}`")]
    DuplicateRouteId(String),

    #[error("index route `{0}` cannot have children")]
    IndexWithChildren(String),

    #[error("index route `{0}` cannot declare a path")]
    IndexWithPath(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.router.basename.starts_with('/') {
        errors.push(ValidationError::InvalidBasename(config.router.basename.clone()));
    }
    if config.router.pattern_cache_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity("pattern_cache_capacity"));
    }
    if config.router.event_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity("event_capacity"));
    }
    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        validate_route(route, &format!("routes[{}]", i), &mut seen, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, at: &str, seen: &mut HashSet<String>, errors: &mut Vec<ValidationError>) {
    if route.id.is_empty() {
        errors.push(ValidationError::EmptyRouteId(at.to_string()));
    } else if !seen.insert(route.id.clone()) {
        errors.push(ValidationError::DuplicateRouteId(route.id.clone()));
    }

    if route.index {
        if !route.children.is_empty() {
            errors.push(ValidationError::IndexWithChildren(route.id.clone()));
        }
        if route.path.is_some() {
            errors.push(ValidationError::IndexWithPath(route.id.clone()));
        }
    }

    for (i, child) in route.children.iter().enumerate() {
        validate_route(child, &format!("{}.children[{}]", at, i), seen, errors);
    }
}
