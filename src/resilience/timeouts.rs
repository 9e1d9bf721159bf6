//! Loader deadlines.
//!
//! # Responsibilities
//! - Wrap a loader so it resolves within a fixed deadline
//! - Turn an elapsed deadline into an ordinary loader failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timed-out loaders fail with status 504
//! - The router itself never imposes deadlines; routes opt in

use futures_util::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::data::DataError;
use crate::routing::Loader;

/// Status recorded for a loader that missed its deadline.
pub const TIMEOUT_STATUS: u16 = 504;

/// Wrap `loader` so it fails with a 504 after `deadline`.
///
/// The inner future is dropped on timeout; a redirect or failure produced
/// in time passes through unchanged.
pub fn with_timeout(loader: Loader, deadline: Duration) -> Loader {
    Arc::new(move |args| {
        let route_id = args.route_id.clone();
        let inner = loader(args);
        async move {
            match tokio::time::timeout(deadline, inner).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(route_id = %route_id, deadline_ms = deadline.as_millis() as u64, "Loader timed out");
                    Err(DataError::with_status(
                        TIMEOUT_STATUS,
                        format!("loader for `{}` timed out after {:?}", route_id, deadline),
                    ))
                }
            }
        }
        .boxed()
    })
}
