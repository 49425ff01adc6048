use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use datawindow::{CancellationToken, ItemsRequest, SortKey};

use crate::{ItemsProvider, LoaderOptions};

/// What a call to [`IncrementalLoader::load_more`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadOutcome {
    /// A page was appended. `complete` is set once every item has been retrieved.
    Loaded { appended: usize, complete: bool },
    /// Another fetch was already in flight; nothing was requested.
    AlreadyLoading,
    /// Every item was already retrieved; nothing was requested.
    Complete,
    /// The fetch was cancelled or superseded and its result was discarded.
    Cancelled,
}

struct ActiveFetch {
    id: u64,
    cancel: CancellationToken,
}

struct LoaderState<T, E> {
    items: Vec<T>,
    all_items_retrieved: bool,
    active: Option<ActiveFetch>,
    provider: ItemsProvider<T, E>,
    sort_keys: Vec<SortKey>,
    next_fetch_id: u64,
}

impl<T, E> LoaderState<T, E> {
    fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            dwdebug!(fetch = active.id, "loader: cancelling in-flight fetch");
            active.cancel.cancel();
        }
        self.items.clear();
        self.all_items_retrieved = false;
    }
}

/// A single-flight, append-only buffer of records for one UI surface.
///
/// The loader is driven from outside: call [`IncrementalLoader::load_more`] whenever the
/// surface wants more (e.g. a sentinel near the end of the list became visible). Each call asks
/// the provider for the window starting at the current buffer length and appends the result.
///
/// Guarantees:
/// - At most one fetch is in flight. Overlapping calls return [`LoadOutcome::AlreadyLoading`].
/// - A reset ([`IncrementalLoader::refresh`], a provider swap, a sort change) cancels the
///   in-flight fetch first, and every fetch carries its own sequence number, so a stale or
///   cancelled result is never appended.
/// - Provider errors are returned unchanged and leave the buffer as it was.
///
/// All methods take `&self`; the state lock is never held across an `.await`.
pub struct IncrementalLoader<T, E> {
    state: Mutex<LoaderState<T, E>>,
    options: LoaderOptions,
}

impl<T, E> IncrementalLoader<T, E> {
    pub fn new(provider: ItemsProvider<T, E>, options: LoaderOptions) -> Self {
        dwdebug!(page_size = ?options.page_size, "IncrementalLoader::new");
        Self {
            state: Mutex::new(LoaderState {
                items: Vec::new(),
                all_items_retrieved: false,
                active: None,
                provider,
                sort_keys: Vec::new(),
                next_fetch_id: 0,
            }),
            options,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches and appends the next window.
    pub async fn load_more(&self) -> Result<LoadOutcome, E> {
        let (id, request, provider) = {
            let mut state = self.lock();
            if state.active.is_some() {
                dwtrace!("loader: fetch already in flight");
                return Ok(LoadOutcome::AlreadyLoading);
            }
            if state.all_items_retrieved {
                return Ok(LoadOutcome::Complete);
            }

            let id = state.next_fetch_id;
            state.next_fetch_id = state.next_fetch_id.wrapping_add(1);
            let cancel = CancellationToken::new();
            let request = ItemsRequest::new(state.items.len(), self.options.page_size)
                .with_sort_keys(state.sort_keys.clone())
                .with_cancel(cancel.clone());
            state.active = Some(ActiveFetch { id, cancel });
            (id, request, Arc::clone(&state.provider))
        };
        dwtrace!(
            fetch = id,
            start_index = request.start_index,
            count = ?request.count,
            "loader: fetch start"
        );

        let _guard = InFlightGuard {
            state: &self.state,
            id,
        };
        let cancel = request.cancel.clone();
        let fetch = provider(request);
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = fetch => Some(result),
        };

        let mut state = self.lock();
        let current = state.active.as_ref().is_some_and(|active| active.id == id);
        let result = match result {
            Some(result) if current && !cancel.is_cancelled() => result,
            _ => {
                dwtrace!(fetch = id, "loader: discarding cancelled fetch");
                return Ok(LoadOutcome::Cancelled);
            }
        };
        state.active = None;
        let page = result?;

        let appended = page.items.len();
        state.items.extend(page.items);
        let loaded = state.items.len();
        let mut complete = loaded >= page.total_item_count;
        if !complete && appended == 0 {
            dwwarn!(
                loaded,
                total_item_count = page.total_item_count,
                "loader: provider returned an empty page before the reported total"
            );
            complete = true;
        }
        state.all_items_retrieved = complete;
        drop(state);
        dwtrace!(fetch = id, appended, loaded, complete, "loader: fetch applied");

        if !complete {
            if let Some(on_more_available) = &self.options.on_more_available {
                on_more_available();
            }
        }
        Ok(LoadOutcome::Loaded { appended, complete })
    }

    /// Cancels any in-flight fetch, drops the buffer, then loads the first window.
    pub async fn refresh(&self) -> Result<LoadOutcome, E> {
        dwdebug!("loader: refresh");
        self.lock().reset();
        self.load_more().await
    }

    /// Cancels the in-flight fetch, if any, without touching the buffer.
    ///
    /// Returns `true` when a fetch was cancelled.
    pub fn cancel_pending(&self) -> bool {
        let mut state = self.lock();
        match state.active.take() {
            Some(active) => {
                dwdebug!(fetch = active.id, "loader: cancel pending fetch");
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Binds a provider. A provider with a different identity than the current one resets the
    /// buffer (as [`IncrementalLoader::refresh`] does, without loading).
    ///
    /// Returns `true` when the provider changed.
    pub fn set_provider(&self, provider: ItemsProvider<T, E>) -> bool {
        let mut state = self.lock();
        if Arc::ptr_eq(&state.provider, &provider) {
            return false;
        }
        dwdebug!("loader: provider changed");
        state.reset();
        state.provider = provider;
        true
    }

    /// Sets the sort keys sent with each request. Changing them resets the buffer, since a
    /// buffer cannot mix orderings.
    ///
    /// Returns `true` when the keys changed.
    pub fn set_sort_keys(&self, sort_keys: Vec<SortKey>) -> bool {
        let mut state = self.lock();
        if state.sort_keys == sort_keys {
            return false;
        }
        dwdebug!(keys = sort_keys.len(), "loader: sort keys changed");
        state.reset();
        state.sort_keys = sort_keys;
        true
    }

    pub fn sort_keys(&self) -> Vec<SortKey> {
        self.lock().sort_keys.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn all_items_retrieved(&self) -> bool {
        self.lock().all_items_retrieved
    }

    pub fn is_loading(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Runs `f` over the buffered items.
    ///
    /// `f` runs under the state lock and must not call back into the loader.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.lock().items)
    }

    pub fn loaded_items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().items.clone()
    }
}

impl<T, E> core::fmt::Debug for IncrementalLoader<T, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.lock();
        f.debug_struct("IncrementalLoader")
            .field("len", &state.items.len())
            .field("all_items_retrieved", &state.all_items_retrieved)
            .field("active_fetch", &state.active.as_ref().map(|a| a.id))
            .field("sort_keys", &state.sort_keys)
            .field("options", &self.options)
            .finish()
    }
}

/// Clears the in-flight marker when a fetch settles, including when the `load_more` future is
/// dropped mid-flight. Only clears the fetch it was created for.
struct InFlightGuard<'a, T, E> {
    state: &'a Mutex<LoaderState<T, E>>,
    id: u64,
}

impl<T, E> Drop for InFlightGuard<'_, T, E> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.active.as_ref().is_some_and(|active| active.id == self.id) {
            if let Some(active) = state.active.take() {
                active.cancel.cancel();
            }
        }
    }
}
