use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

use crate::core::error::Error;

/// Runs `f` over `items` with at most `limit` calls outstanding at once.
///
/// Results come back in the order of `items`. The first error is returned and
/// the calls still outstanding are dropped.
pub(crate) async fn fan_out<I, F, Fut, T>(items: I, limit: usize, f: F) -> Result<Vec<T>, Error>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .try_collect()
        .await
}
