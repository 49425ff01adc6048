use std::future::Future;
use std::sync::Arc;

use datawindow::{FieldTable, ItemsRequest, ItemsResult, QueryError};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

/// The fetch capability supplied by the host application.
///
/// A provider receives one [`ItemsRequest`] and resolves to the items of that window plus the
/// total item count. It may be slow and may fail; it should observe `request.cancel` and stop
/// early when cancelled, although the loader and gateway discard cancelled results either way.
///
/// Providers are compared by `Arc` identity: handing a loader a different `Arc` means "a
/// different data source" and invalidates what it has buffered.
pub type ItemsProvider<T, E> =
    Arc<dyn Fn(ItemsRequest) -> BoxFuture<'static, Result<ItemsResult<T>, E>> + Send + Sync>;

/// Wraps an async closure as an [`ItemsProvider`].
pub fn provider_fn<T, E, F, Fut>(f: F) -> ItemsProvider<T, E>
where
    F: Fn(ItemsRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ItemsResult<T>, E>> + Send + 'static,
{
    Arc::new(move |request| f(request).boxed())
}

/// A provider over an in-memory collection, sorted and windowed with `fields`.
///
/// `total_item_count` is always the full collection length, whatever the window.
pub fn memory_provider<T>(
    records: Arc<Vec<T>>,
    fields: Arc<FieldTable<T>>,
) -> ItemsProvider<T, QueryError>
where
    T: Clone + Send + Sync + 'static,
{
    provider_fn(move |request: ItemsRequest| {
        let records = Arc::clone(&records);
        let fields = Arc::clone(&fields);
        async move {
            fields
                .apply(records.iter(), &request)
                .map(|window| ItemsResult::new(window.cloned().collect(), records.len()))
        }
    })
}
