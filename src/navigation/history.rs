//! The history collaborator boundary.
//!
//! The router never owns a history stack. It receives navigation requests
//! tagged with how the location changed, and reports back what the history
//! should record. `MemoryHistory` is an in-process implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

use crate::data::Submission;
use crate::navigation::router::NavigationOutcome;
use crate::routing::Location;

/// How a location was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    Push,
    Replace,
    Pop,
}

/// A request to move the router somewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub location: Location,
    pub action: HistoryAction,
    pub submission: Option<Submission>,
}

impl NavigationRequest {
    pub fn push(href: &str) -> Self {
        Self::new(Location::parse(href), HistoryAction::Push)
    }

    pub fn replace(href: &str) -> Self {
        Self::new(Location::parse(href), HistoryAction::Replace)
    }

    /// The user moved through history; `location` keeps its original key.
    pub fn pop(location: Location) -> Self {
        Self::new(location, HistoryAction::Pop)
    }

    /// Continue at a redirect target. Redirects always replace.
    pub fn redirect(href: &str) -> Self {
        Self::replace(href)
    }

    /// Continue a navigation that was started with `origin` at a redirect
    /// target. The redirecting location was never recorded, so a push still
    /// pushes exactly once; a replace or pop replaces the current entry.
    pub fn follow(href: &str, origin: HistoryAction) -> Self {
        match origin {
            HistoryAction::Push => Self::push(href),
            HistoryAction::Replace | HistoryAction::Pop => Self::redirect(href),
        }
    }

    pub fn with_submission(mut self, submission: Submission) -> Self {
        self.submission = Some(submission);
        self
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.location.state = Some(state);
        self
    }

    fn new(location: Location, action: HistoryAction) -> Self {
        Self {
            location,
            action,
            submission: None,
        }
    }
}

/// A history stack the router's outcomes can be applied to.
pub trait History: Send + Sync {
    /// The entry currently shown.
    fn location(&self) -> Location;

    fn push(&self, location: Location);

    fn replace(&self, location: Location);

    /// Move `delta` entries; `None` if out of range.
    fn go(&self, delta: isize) -> Option<Location>;

    /// Return to the entry with `location.key` after a rolled-back pop.
    fn restore(&self, location: &Location);

    /// Record what a navigation produced.
    fn apply(&self, outcome: &NavigationOutcome) {
        match outcome {
            NavigationOutcome::Committed { state, action } => match action {
                HistoryAction::Push => self.push(state.location.clone()),
                HistoryAction::Replace => self.replace(state.location.clone()),
                HistoryAction::Pop => {}
            },
            NavigationOutcome::Aborted { restore: Some(location) } => self.restore(location),
            NavigationOutcome::Aborted { restore: None }
            | NavigationOutcome::Unchanged
            | NavigationOutcome::Superseded => {}
        }
    }
}

#[derive(Debug)]
struct Stack {
    entries: Vec<Location>,
    index: usize,
}

/// History kept in memory.
#[derive(Debug)]
pub struct MemoryHistory {
    stack: Mutex<Stack>,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            stack: Mutex::new(Stack {
                entries: vec![initial],
                index: 0,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.lock().index
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<Location> {
        self.lock().entries.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Stack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Location::initial())
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let stack = self.lock();
        stack.entries[stack.index].clone()
    }

    fn push(&self, location: Location) {
        let mut stack = self.lock();
        let next = stack.index + 1;
        stack.entries.truncate(next);
        stack.entries.push(location);
        stack.index = next;
    }

    fn replace(&self, location: Location) {
        let mut stack = self.lock();
        let index = stack.index;
        stack.entries[index] = location;
    }

    fn go(&self, delta: isize) -> Option<Location> {
        let mut stack = self.lock();
        let target = stack.index.checked_add_signed(delta)?;
        let location = stack.entries.get(target)?.clone();
        stack.index = target;
        Some(location)
    }

    fn restore(&self, location: &Location) {
        let mut stack = self.lock();
        if let Some(i) = stack.entries.iter().position(|l| l.key == location.key) {
            stack.index = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::default();
        history.push(Location::parse("/a"));
        history.push(Location::parse("/b"));
        assert_eq!(history.go(-1).map(|l| l.pathname), Some("/a".to_string()));

        history.push(Location::parse("/c"));
        let paths: Vec<String> = history.entries().into_iter().map(|l| l.pathname).collect();
        assert_eq!(paths, vec!["/", "/a", "/c"]);
        assert_eq!(history.index(), 2);
        assert!(history.go(1).is_none());
        assert!(history.go(-5).is_none());
    }

    #[test]
    fn test_replace_and_restore() {
        let history = MemoryHistory::default();
        history.push(Location::parse("/a"));
        let a = history.location();
        history.replace(Location::parse("/b"));
        assert_eq!(history.location().pathname, "/b");
        assert_eq!(history.len(), 2);

        history.push(a.clone());
        history.go(-2);
        history.restore(&a);
        assert_eq!(history.location().key, a.key);
    }

    #[test]
    fn test_request_builders() {
        let request = NavigationRequest::push("/posts?x=1").with_submission(Submission::post(Value::Null));
        assert_eq!(request.action, HistoryAction::Push);
        assert_eq!(request.location.search, "?x=1");
        assert!(request.submission.is_some());
        assert_eq!(NavigationRequest::redirect("/login").action, HistoryAction::Replace);
        assert_eq!(NavigationRequest::follow("/login", HistoryAction::Push).action, HistoryAction::Push);
        assert_eq!(NavigationRequest::follow("/login", HistoryAction::Pop).action, HistoryAction::Replace);
    }
}
