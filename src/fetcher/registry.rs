//! Fetcher bookkeeping, keyed independently from navigation.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use crate::data::RouteFailure;
use crate::lifecycle::{CancelHandle, GenerationCounter};

/// What a fetcher is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetcherState {
    Idle,
    /// Its action is running.
    Submitting,
    /// A loader is running: a `load` or the revalidation after an action.
    Loading,
}

/// One keyed fetcher.
#[derive(Debug, Clone, Serialize)]
pub struct Fetcher {
    pub key: String,
    pub state: FetcherState,
    /// Last successful action or loader result.
    pub data: Option<Value>,
    pub error: Option<RouteFailure>,
    /// Generation of the latest submission or load on this key.
    pub generation: u64,
    #[serde(skip)]
    cancel: CancelHandle,
}

impl Fetcher {
    fn idle(key: &str) -> Self {
        Self {
            key: key.to_string(),
            state: FetcherState::Idle,
            data: None,
            error: None,
            generation: 0,
            cancel: CancelHandle::new(),
        }
    }
}

/// All fetchers of a router.
///
/// Work on one key is last-writer-wins: starting new work cancels the
/// previous work on that key and only the latest generation may finish it.
/// Different keys never interfere.
#[derive(Debug, Default)]
pub struct FetcherRegistry {
    fetchers: DashMap<String, Fetcher>,
    generations: GenerationCounter,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start new work on `key`, superseding whatever was in flight there.
    pub fn begin(&self, key: &str, state: FetcherState) -> (u64, CancelHandle) {
        let generation = self.generations.advance();
        let cancel = CancelHandle::new();

        let mut fetcher = self.fetchers.entry(key.to_string()).or_insert_with(|| Fetcher::idle(key));
        if fetcher.state != FetcherState::Idle {
            tracing::debug!(key = %key, superseded = fetcher.generation, "Fetcher superseded");
        }
        fetcher.cancel.cancel();
        fetcher.cancel = cancel.clone();
        fetcher.generation = generation;
        fetcher.state = state;

        (generation, cancel)
    }

    pub fn is_current(&self, key: &str, generation: u64) -> bool {
        self.fetchers.get(key).is_some_and(|f| f.generation == generation)
    }

    /// Move current work to another state. Returns false if superseded.
    pub fn transition(&self, key: &str, generation: u64, state: FetcherState) -> bool {
        match self.fetchers.get_mut(key) {
            Some(mut fetcher) if fetcher.generation == generation => {
                fetcher.state = state;
                true
            }
            _ => false,
        }
    }

    /// Record the result of current work. Returns false if superseded.
    pub fn finish(&self, key: &str, generation: u64, result: Result<Value, RouteFailure>) -> bool {
        match self.fetchers.get_mut(key) {
            Some(mut fetcher) if fetcher.generation == generation => {
                fetcher.state = FetcherState::Idle;
                match result {
                    Ok(value) => {
                        fetcher.data = Some(value);
                        fetcher.error = None;
                    }
                    Err(failure) => fetcher.error = Some(failure),
                }
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<Fetcher> {
        self.fetchers.get(key).map(|f| f.clone())
    }

    /// Forget a fetcher, cancelling its work.
    pub fn remove(&self, key: &str) -> Option<Fetcher> {
        let (_, fetcher) = self.fetchers.remove(key)?;
        fetcher.cancel.cancel();
        Some(fetcher)
    }

    pub fn keys(&self) -> Vec<String> {
        self.fetchers.iter().map(|f| f.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_key_last_writer_wins() {
        let registry = FetcherRegistry::new();
        let (first, first_cancel) = registry.begin("like", FetcherState::Submitting);
        let (second, second_cancel) = registry.begin("like", FetcherState::Submitting);

        assert!(first_cancel.is_cancelled());
        assert!(!second_cancel.is_cancelled());
        assert!(!registry.finish("like", first, Ok(json!("stale"))));
        assert!(registry.finish("like", second, Ok(json!("fresh"))));

        let fetcher = registry.get("like").unwrap();
        assert_eq!(fetcher.state, FetcherState::Idle);
        assert_eq!(fetcher.data, Some(json!("fresh")));
    }

    #[test]
    fn test_keys_are_independent() {
        let registry = FetcherRegistry::new();
        let (a, a_cancel) = registry.begin("a", FetcherState::Loading);
        let (b, _) = registry.begin("b", FetcherState::Submitting);

        assert!(!a_cancel.is_cancelled());
        assert!(registry.is_current("a", a));
        assert!(registry.transition("b", b, FetcherState::Loading));
        assert_eq!(registry.get("b").map(|f| f.state), Some(FetcherState::Loading));
        assert_eq!(registry.len(), 2);

        let removed = registry.remove("a").unwrap();
        assert_eq!(removed.key, "a");
        assert!(a_cancel.is_cancelled());
        assert!(!registry.is_current("a", a));
    }
}
