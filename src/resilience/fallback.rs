//! Ordered fallback across candidates.
//!
//! # Responsibilities
//! - Try candidates strictly in order, one attempt each
//! - Stop at the first non-empty success
//! - Keep every failure, in attempt order, when none succeeds

use std::future::Future;

/// Run `attempt` against each candidate in turn until one yields `Ok(Some(_))`.
///
/// `Ok(None)` counts as a failure; `on_empty` turns it into an error entry so the
/// returned list always has one entry per candidate tried. Attempts are awaited
/// sequentially and never repeated.
pub async fn first_success<C, R, E, F, Fut, G>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
    mut on_empty: G,
) -> Result<R, Vec<E>>
where
    C: Clone,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>>,
    G: FnMut(&C) -> E,
{
    let mut failures = Vec::new();

    for candidate in candidates {
        match attempt(candidate.clone()).await {
            Ok(Some(result)) => return Ok(result),
            Ok(None) => failures.push(on_empty(&candidate)),
            Err(e) => failures.push(e),
        }
    }

    Err(failures)
}
