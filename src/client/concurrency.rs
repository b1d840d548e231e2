//! Chunked bounded-concurrency mapping
//!
//! The pagination and export loops both fan out over a list with a small
//! fixed concurrency cap: items are split into fixed-size chunks, all
//! requests within a chunk race each other, and the chunk is awaited in full
//! before the next one starts. A per-item failure never abandons its chunk;
//! every item produces its own `Result` and input order is preserved.

use crate::error::Result;
use futures::future::join_all;
use std::future::Future;

/// Map `f` over `items` with at most `limit` futures in flight at once
///
/// Results come back in input order, one per item. A `limit` of zero is
/// treated as one.
pub async fn map_chunked<T, R, F, Fut>(items: Vec<T>, limit: usize, f: F) -> Vec<Result<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    map_chunked_with(items, limit, f, |_| {}).await
}

/// Like [`map_chunked`], invoking `on_chunk` with the chunk's results after
/// each chunk completes
///
/// The export loop uses the callback to recompute overall progress between
/// chunks.
pub async fn map_chunked_with<T, R, F, Fut, P>(
    items: Vec<T>,
    limit: usize,
    f: F,
    mut on_chunk: P,
) -> Vec<Result<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
    P: FnMut(&[Result<R>]),
{
    let limit = limit.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut iter = items.into_iter();

    loop {
        let chunk: Vec<T> = iter.by_ref().take(limit).collect();
        if chunk.is_empty() {
            break;
        }

        let outcomes = join_all(chunk.into_iter().map(&f)).await;
        on_chunk(&outcomes);
        results.extend(outcomes);
    }

    results
}
